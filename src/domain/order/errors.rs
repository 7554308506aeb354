use super::value_objects::ItemId;

// ============================================================================
// Order Card Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderCardError {
    #[error("Item not found in order: {0}")]
    ItemNotFound(ItemId),

    #[error("No item selected for confirmation")]
    NoSelection,
}
