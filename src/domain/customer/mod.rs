// ============================================================================
// Customer Domain - Catalog records that own orders
// ============================================================================
//
// - Value objects (Email, PhoneNumber)
// - Commands (NewCustomer, CustomerChanges)
// - Errors (CustomerError enum)
// - Aggregate (Customer with field validation)
// - Command Handler (CustomerCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
