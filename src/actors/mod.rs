// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based plumbing around the order card.
//
// Structure:
// - order_card_actor - owns an `OrderCard`, runs the update request as an
//                      actor future, notifies the parent view
//
// Note: Toggle rules live in `domain::order`; the actor only turns the
//       emitted events into side effects.
//
// ============================================================================

mod order_card_actor;

pub use order_card_actor::{
    CancelSelection, ConfirmSelection, DismissAlert, GetOrder, GetView, OrderCardActor,
    OrderUpdated, SelectItem, SetOrder, ToggleExpanded,
};
