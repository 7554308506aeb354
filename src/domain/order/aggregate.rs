use std::collections::BTreeMap;
use uuid::Uuid;

use crate::workflow::Aggregate;
use super::commands::{OrderCardCommand, UpdateOutcome};
use super::errors::OrderCardError;
use super::events::*;
use super::value_objects::{DeliveryStatus, ItemId, Order, OrderUpdate};

/// Shown when the backend rejects an update without a message
pub const REJECTED_FALLBACK_MESSAGE: &str = "Failed to update order.";

/// Shown when the update request itself fails
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred while updating the order.";

// ============================================================================
// Order Card - Optimistic Completion Toggle
// ============================================================================
//
// The parent-supplied order (`source`) is the only source of truth. An
// in-flight toggle lives beside it as a `PendingChange`: per-item completion
// overrides merged over `source` when the card is read. Success folds the
// overlay into `source`. Rollback restores the order as it stood before the
// failed write, which still includes toggles sent by superseded requests.
//
// ============================================================================

/// Where the toggle workflow currently is
#[derive(Debug, Clone, PartialEq)]
pub enum TogglePhase {
    Idle,
    PendingConfirmation { item_id: ItemId },
    InFlight { request_id: Uuid },
}

/// Optimistic completion overrides awaiting backend confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub request_id: Uuid,
    pub overrides: BTreeMap<ItemId, bool>,
    /// Overrides already sent by requests this one superseded
    pub superseded: BTreeMap<ItemId, bool>,
}

impl PendingChange {
    /// Merge the overrides into `order`.
    ///
    /// Delivery status becomes `Completed` when the merged items are all
    /// complete; otherwise the order's own status is kept.
    pub fn apply_to(&self, order: &Order) -> Order {
        merge_overrides(order, &self.overrides)
    }

    /// The order as displayed just before this request's own write
    pub fn revert_target(&self, order: &Order) -> Order {
        merge_overrides(order, &self.superseded)
    }
}

fn merge_overrides(order: &Order, overrides: &BTreeMap<ItemId, bool>) -> Order {
    let mut merged = order.clone();
    if overrides.is_empty() {
        return merged;
    }
    for item in merged.items.iter_mut() {
        if let Some(&completed) = overrides.get(&item.id) {
            item.completed = completed;
        }
    }
    if merged.all_items_completed() {
        merged.delivery_status = DeliveryStatus::Completed;
    }
    merged
}

#[derive(Debug, Clone)]
pub struct OrderCard {
    source: Order,
    pending: Option<PendingChange>,
    selection: Option<ItemId>,
    expanded: bool,
    alert: Option<String>,
}

impl OrderCard {
    pub fn new(order: Order) -> Self {
        Self {
            source: order,
            pending: None,
            selection: None,
            expanded: false,
            alert: None,
        }
    }

    /// The order as it should be displayed: `source` with any in-flight
    /// change merged in.
    pub fn order(&self) -> Order {
        match &self.pending {
            Some(change) => change.apply_to(&self.source),
            None => self.source.clone(),
        }
    }

    /// The last order known to be persisted (or supplied by the parent)
    pub fn source(&self) -> &Order {
        &self.source
    }

    pub fn pending(&self) -> Option<&PendingChange> {
        self.pending.as_ref()
    }

    pub fn selection(&self) -> Option<&ItemId> {
        self.selection.as_ref()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// An open dialog takes precedence over an outstanding request
    pub fn phase(&self) -> TogglePhase {
        if let Some(item_id) = &self.selection {
            return TogglePhase::PendingConfirmation { item_id: item_id.clone() };
        }
        match &self.pending {
            Some(change) => TogglePhase::InFlight { request_id: change.request_id },
            None => TogglePhase::Idle,
        }
    }

    /// Payload for the in-flight change: every item, plus the completed
    /// status only when all items are now complete.
    pub fn update_payload(&self) -> Option<OrderUpdate> {
        self.pending.as_ref()?;
        let merged = self.order();
        let all_completed = merged.all_items_completed();
        Some(OrderUpdate {
            items: merged.items,
            delivery_status: all_completed.then_some(DeliveryStatus::Completed),
        })
    }

    fn confirm_selection(&self, request_id: Uuid) -> Result<Vec<OrderCardEvent>, OrderCardError> {
        let item_id = self.selection.clone().ok_or(OrderCardError::NoSelection)?;
        let current = self.order();
        let item = current
            .item(&item_id)
            .ok_or_else(|| OrderCardError::ItemNotFound(item_id.clone()))?;

        let completed = !item.completed;
        let all_completed = current
            .items
            .iter()
            .all(|other| if other.id == item_id { completed } else { other.completed });

        Ok(vec![OrderCardEvent::CompletionToggled(CompletionToggled {
            request_id,
            item_id,
            completed,
            all_completed,
            superseded_request: self.pending.as_ref().map(|p| p.request_id),
        })])
    }

    fn complete_update(&self, request_id: Uuid, outcome: &UpdateOutcome) -> Vec<OrderCardEvent> {
        match &self.pending {
            Some(change) if change.request_id == request_id => {}
            // Superseded or already settled
            _ => return vec![],
        }

        let event = match outcome {
            UpdateOutcome::Accepted => OrderCardEvent::UpdatePersisted(UpdatePersisted { request_id }),
            UpdateOutcome::Rejected { message } => OrderCardEvent::UpdateReverted(UpdateReverted {
                request_id,
                reason: RevertReason::Rejected,
                message: message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| REJECTED_FALLBACK_MESSAGE.to_string()),
            }),
            UpdateOutcome::Failed { .. } => OrderCardEvent::UpdateReverted(UpdateReverted {
                request_id,
                reason: RevertReason::Transport,
                message: TRANSPORT_FAILURE_MESSAGE.to_string(),
            }),
        };
        vec![event]
    }

    fn replace_order(&self, order: &Order) -> Vec<OrderCardEvent> {
        // The parent echoing our own optimistic value back is not a new fact
        if order == &self.source || (self.pending.is_some() && order == &self.order()) {
            return vec![];
        }

        let discarded_request = if order.id != self.source.id {
            self.pending.as_ref().map(|p| p.request_id)
        } else {
            None
        };

        vec![OrderCardEvent::OrderReplaced(OrderReplaced {
            order: order.clone(),
            discarded_request,
        })]
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderCard {
    type Event = OrderCardEvent;
    type Command = OrderCardCommand;
    type Error = OrderCardError;

    fn apply_event(&mut self, event: &Self::Event) {
        match event {
            OrderCardEvent::OrderReplaced(e) => {
                if e.order.id != self.source.id {
                    self.pending = None;
                    self.selection = None;
                }
                self.source = e.order.clone();
                if let Some(selected) = &self.selection {
                    if self.source.item(selected).is_none() {
                        self.selection = None;
                    }
                }
            }
            OrderCardEvent::ExpansionToggled(e) => {
                self.expanded = e.expanded;
            }
            OrderCardEvent::ItemSelected(e) => {
                self.selection = Some(e.item_id.clone());
            }
            OrderCardEvent::SelectionCancelled(_) => {
                self.selection = None;
            }
            OrderCardEvent::CompletionToggled(e) => {
                let superseded = self
                    .pending
                    .take()
                    .map(|p| p.overrides)
                    .unwrap_or_default();
                let mut overrides = superseded.clone();
                overrides.insert(e.item_id.clone(), e.completed);
                self.pending = Some(PendingChange {
                    request_id: e.request_id,
                    overrides,
                    superseded,
                });
                self.selection = None;
            }
            OrderCardEvent::UpdatePersisted(_) => {
                self.source = self.order();
                self.pending = None;
            }
            OrderCardEvent::UpdateReverted(e) => {
                // Superseded writes already left; keep them rather than undo
                // what the backend may have applied
                if let Some(change) = self.pending.take() {
                    self.source = change.revert_target(&self.source);
                }
                self.alert = Some(e.message.clone());
            }
            OrderCardEvent::AlertDismissed => {
                self.alert = None;
            }
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCardCommand::ReplaceOrder { order } => Ok(self.replace_order(order)),

            OrderCardCommand::ToggleExpanded => {
                Ok(vec![OrderCardEvent::ExpansionToggled(ExpansionToggled {
                    expanded: !self.expanded,
                })])
            }

            OrderCardCommand::SelectItem { item_id } => {
                if self.source.item(item_id).is_none() {
                    return Err(OrderCardError::ItemNotFound(item_id.clone()));
                }
                Ok(vec![OrderCardEvent::ItemSelected(ItemSelected {
                    item_id: item_id.clone(),
                })])
            }

            OrderCardCommand::CancelSelection => Ok(self
                .selection
                .clone()
                .map(|item_id| OrderCardEvent::SelectionCancelled(SelectionCancelled { item_id }))
                .into_iter()
                .collect()),

            OrderCardCommand::ConfirmSelection { request_id } => self.confirm_selection(*request_id),

            OrderCardCommand::CompleteUpdate { request_id, outcome } => {
                Ok(self.complete_update(*request_id, outcome))
            }

            OrderCardCommand::DismissAlert => Ok(self
                .alert
                .as_ref()
                .map(|_| OrderCardEvent::AlertDismissed)
                .into_iter()
                .collect()),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
