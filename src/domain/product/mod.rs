// ============================================================================
// Product Domain - Catalog entries referenced by order items
// ============================================================================
//
// - Commands (NewProduct, ProductChanges)
// - Errors (ProductError enum)
// - Aggregate (Product with field validation)
// - Command Handler (ProductCommandHandler)
//
// Stock is only ever changed here through explicit edits; the decrement
// caused by confirmed orders lives in the store (see store::OrderStore).
//
// ============================================================================

pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
