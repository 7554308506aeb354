use uuid::Uuid;

use super::value_objects::{ItemId, Order};

// ============================================================================
// Order Card Events - Facts emitted by the toggle workflow
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum OrderCardEvent {
    OrderReplaced(OrderReplaced),
    ExpansionToggled(ExpansionToggled),
    ItemSelected(ItemSelected),
    SelectionCancelled(SelectionCancelled),
    CompletionToggled(CompletionToggled),
    UpdatePersisted(UpdatePersisted),
    UpdateReverted(UpdateReverted),
    AlertDismissed,
}

impl OrderCardEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderCardEvent::OrderReplaced(_) => "OrderReplaced",
            OrderCardEvent::ExpansionToggled(_) => "ExpansionToggled",
            OrderCardEvent::ItemSelected(_) => "ItemSelected",
            OrderCardEvent::SelectionCancelled(_) => "SelectionCancelled",
            OrderCardEvent::CompletionToggled(_) => "CompletionToggled",
            OrderCardEvent::UpdatePersisted(_) => "UpdatePersisted",
            OrderCardEvent::UpdateReverted(_) => "UpdateReverted",
            OrderCardEvent::AlertDismissed => "AlertDismissed",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Parent supplied a new order value
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReplaced {
    pub order: Order,
    /// In-flight request dropped because the card now shows a different order
    pub discarded_request: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionToggled {
    pub expanded: bool,
}

/// Confirmation dialog opened for an item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSelected {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCancelled {
    pub item_id: ItemId,
}

/// Optimistic write applied; an update request must now be sent
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionToggled {
    pub request_id: Uuid,
    pub item_id: ItemId,
    pub completed: bool,
    pub all_completed: bool,
    /// Earlier request whose change this one now carries
    pub superseded_request: Option<Uuid>,
}

/// Backend accepted the change
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePersisted {
    pub request_id: Uuid,
}

/// Backend refused the change or could not be reached
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReverted {
    pub request_id: Uuid,
    pub reason: RevertReason,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertReason {
    /// Backend answered with `success: false`
    Rejected,
    /// Request never produced a usable answer
    Transport,
}

impl RevertReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevertReason::Rejected => "rejected",
            RevertReason::Transport => "transport",
        }
    }
}
