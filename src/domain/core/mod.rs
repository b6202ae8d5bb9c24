// ============================================================================
// Domain Core - Generic Aggregate Abstractions
// ============================================================================
//
// Shared by every aggregate in src/domain/. Nothing in here knows about
// orders, customers or products.
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::Aggregate;
pub use event::DomainEvent;
