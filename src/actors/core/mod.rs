// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// Types shared by infrastructure actors.
//
// ============================================================================

pub mod health;

// Re-export core types
pub use health::*;
