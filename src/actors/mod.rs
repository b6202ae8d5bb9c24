// ============================================================================
// Actors Module
// ============================================================================
//
// Structure:
// - core/           - Shared types (HealthStatus, ComponentHealth)
// - infrastructure/ - Concrete infrastructure actors (HealthMonitor)
//
// Note: Domain logic (Order, Customer, Product) uses CommandHandlers, NOT
//       actors. Actors are reserved for infrastructure concerns only.
//
// ============================================================================

// Private module declarations
mod core;
mod infrastructure;

pub use self::infrastructure::{GetSystemHealth, HealthMonitorActor, ProbeStore};
