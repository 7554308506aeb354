// ============================================================================
// Aggregate Pattern - Command/Event State Machines
// ============================================================================
//
// Key Principles:
// 1. Commands express intent and are validated against current state
// 2. Validation emits events; it never mutates
// 3. Events are facts and are applied to produce the next state
// 4. Side effects (network, notifications) are driven by the emitted events
//
// This is the GENERIC trait; it knows nothing about orders.
//
// ============================================================================

/// Generic Aggregate trait - all command-driven state machines implement this
///
/// Type Parameters:
/// - `Event`: The fact type emitted by this aggregate
/// - `Command`: The intent type accepted by this aggregate
/// - `Error`: The error type for rule violations
pub trait Aggregate: Sized {
    type Event;
    type Command;
    type Error;

    /// Apply an event to update state
    fn apply_event(&mut self, event: &Self::Event);

    /// Handle command and emit events (business rules only, no mutation)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Handle a command and apply every resulting event, returning the events
    /// so callers can react to them.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command)?;
        for event in &events {
            self.apply_event(event);
        }
        Ok(events)
    }
}
