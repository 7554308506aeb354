// ============================================================================
// Order Domain - Order Card Business Logic
// ============================================================================
//
// This module contains ALL order-card-specific rules:
// - Value objects (Order, OrderItem, DeliveryStatus, OrderUpdate)
// - Commands (SelectItem, ConfirmSelection, CompleteUpdate, ...)
// - Events (CompletionToggled, UpdateReverted, ...)
// - Errors (OrderCardError enum)
// - Aggregate (OrderCard, the optimistic toggle state machine)
//
// Nothing here performs I/O; the actor layer drives the network call.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
