// ============================================================================
// Domain Event Trait
// ============================================================================

/// A fact emitted by an aggregate while handling a command.
///
/// Events are applied to the in-memory aggregate and then handed to the
/// store, which translates each one into the matching row writes.
pub trait DomainEvent: Clone + Send + Sync {
    /// Stable name used in logs and metric labels
    fn event_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum TestEvent {
        Opened,
        Closed,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Opened => "TestOpened",
                TestEvent::Closed => "TestClosed",
            }
        }
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(TestEvent::Opened.event_type(), "TestOpened");
        assert_eq!(TestEvent::Closed.event_type(), "TestClosed");
    }
}
