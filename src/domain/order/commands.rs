use uuid::Uuid;
use super::value_objects::{ItemId, Order};

// ============================================================================
// Order Card Commands - Represent user and network intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCardCommand {
    /// Parent view supplied a (possibly new) order
    ReplaceOrder {
        order: Order,
    },
    ToggleExpanded,
    /// Checkbox clicked; opens the confirmation dialog
    SelectItem {
        item_id: ItemId,
    },
    CancelSelection,
    ConfirmSelection {
        request_id: Uuid,
    },
    /// Result of the update request identified by `request_id`
    CompleteUpdate {
        request_id: Uuid,
        outcome: UpdateOutcome,
    },
    DismissAlert,
}

/// How the backend answered an update request
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Accepted,
    Rejected { message: Option<String> },
    Failed { error: String },
}
