// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// One subdirectory per aggregate, each with:
// - Value objects
// - Commands
// - Errors
// - Aggregate implementation
// - Command handler
//
// Orders additionally carry events and the pricing engine. Persistence is
// reached only through the traits in crate::store.
//
// ============================================================================

pub mod core;
pub mod errors;
pub mod customer;
pub mod product;
pub mod order;

pub use errors::DomainError;
