// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// - Health monitoring (periodic store probe)
//
// ============================================================================

// Private module declarations
mod health_monitor;

// Re-export for public API
pub use health_monitor::{GetSystemHealth, HealthMonitorActor, ProbeStore};
