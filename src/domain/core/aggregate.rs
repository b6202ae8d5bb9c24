use uuid::Uuid;
use super::event::DomainEvent;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// 1. Commands are validated before any event is emitted
// 2. Events are the only way state changes
// 3. Derived fields are recomputed inside apply_event, never by callers
//
// ============================================================================

/// Generic Aggregate trait
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
/// - `Error`: The error type for business rule violations
pub trait Aggregate: Sized + Send + Sync {
    type Event: DomainEvent;
    type Command;
    type Error;

    /// Create new aggregate from its opening event
    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error>;

    /// Apply subsequent events to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Get aggregate ID
    fn aggregate_id(&self) -> Uuid;

    /// Handle a command and apply what it emits.
    ///
    /// Returns the applied events so the caller can persist them.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command)?;
        for event in &events {
            self.apply_event(event)?;
        }
        Ok(events)
    }
}
