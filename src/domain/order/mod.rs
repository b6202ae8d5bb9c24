// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// - Value objects (OrderStatus, TransitionPolicy, OrderLine)
// - Pricing engine (totals, volume promotion, free shipping)
// - Events (OrderCreated, OrderRevised, ...)
// - Commands (CreateOrder, OrderCommand) and unresolved requests
// - Errors (OrderError enum)
// - Aggregate (OrderAggregate)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod pricing;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
