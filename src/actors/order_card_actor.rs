use actix::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::domain::order::{
    ItemId, Order, OrderCard, OrderCardCommand, OrderCardError, OrderCardEvent, UpdateOutcome,
};
use crate::messaging::{outcome_of, OrderApi};
use crate::metrics::Metrics;
use crate::view::OrderCardView;
use crate::workflow::Aggregate;

// ============================================================================
// Actor Messages
// ============================================================================

/// Sent to the parent whenever the displayed order changes optimistically or
/// is reverted
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct OrderUpdated {
    pub order: Order,
}

/// Parent supplies a new order value
#[derive(Message)]
#[rtype(result = "()")]
pub struct SetOrder(pub Order);

#[derive(Message)]
#[rtype(result = "()")]
pub struct ToggleExpanded;

/// Checkbox clicked
#[derive(Message)]
#[rtype(result = "Result<(), OrderCardError>")]
pub struct SelectItem {
    pub item_id: ItemId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct CancelSelection;

/// Confirm button; replies with the id of the spawned update request
#[derive(Message)]
#[rtype(result = "Result<Uuid, OrderCardError>")]
pub struct ConfirmSelection;

#[derive(Message)]
#[rtype(result = "()")]
pub struct DismissAlert;

#[derive(Message)]
#[rtype(result = "OrderCardView")]
pub struct GetView;

/// The order as currently displayed
#[derive(Message)]
#[rtype(result = "Order")]
pub struct GetOrder;

// ============================================================================
// Order Card Actor - Drives the optimistic toggle workflow
// ============================================================================
//
// Owns one `OrderCard`. Every message becomes a command; the emitted events
// decide the side effects:
// - CompletionToggled: notify parent, cancel any superseded request, spawn
//   the update request
// - UpdateReverted: notify parent with the reverted order
// - OrderReplaced with a discarded request: cancel that request
//
// The update request runs as an actor future, so the mailbox keeps flowing
// while it is outstanding.
//
// ============================================================================

pub struct OrderCardActor {
    card: OrderCard,
    api: Arc<dyn OrderApi>,
    parent: Option<Recipient<OrderUpdated>>,
    metrics: Arc<Metrics>,
    in_flight: Option<(Uuid, SpawnHandle)>,
}

impl OrderCardActor {
    pub fn new(order: Order, api: Arc<dyn OrderApi>, metrics: Arc<Metrics>) -> Self {
        Self {
            card: OrderCard::new(order),
            api,
            parent: None,
            metrics,
            in_flight: None,
        }
    }

    pub fn with_parent(mut self, parent: Recipient<OrderUpdated>) -> Self {
        self.parent = Some(parent);
        self
    }

    fn execute(
        &mut self,
        command: OrderCardCommand,
        ctx: &mut Context<Self>,
    ) -> Result<Vec<OrderCardEvent>, OrderCardError> {
        let events = self.card.execute(&command)?;
        for event in &events {
            tracing::debug!(
                order_id = %self.card.source().id,
                event_type = event.event_type(),
                "Order card event"
            );
            self.react(event, ctx);
        }
        Ok(events)
    }

    fn react(&mut self, event: &OrderCardEvent, ctx: &mut Context<Self>) {
        match event {
            OrderCardEvent::CompletionToggled(e) => {
                self.metrics.toggles_confirmed.inc();
                if let Some(superseded) = e.superseded_request {
                    if self.cancel_request(superseded, ctx) {
                        self.metrics.updates_superseded.inc();
                    }
                }
                tracing::info!(
                    order_id = %self.card.source().id,
                    item_id = %e.item_id,
                    completed = e.completed,
                    all_completed = e.all_completed,
                    request_id = %e.request_id,
                    "Applied optimistic completion toggle"
                );
                self.notify_parent();
                self.send_update(e.request_id, ctx);
            }
            OrderCardEvent::UpdatePersisted(e) => {
                self.metrics.updates_persisted.inc();
                tracing::info!(
                    order_id = %self.card.source().id,
                    request_id = %e.request_id,
                    "✅ Order update persisted"
                );
            }
            OrderCardEvent::UpdateReverted(e) => {
                self.metrics.record_revert(e.reason.as_str());
                tracing::error!(
                    order_id = %self.card.source().id,
                    request_id = %e.request_id,
                    reason = e.reason.as_str(),
                    message = %e.message,
                    "Failed to update order, reverted optimistic change"
                );
                self.notify_parent();
            }
            OrderCardEvent::OrderReplaced(e) => {
                if let Some(discarded) = e.discarded_request {
                    if self.cancel_request(discarded, ctx) {
                        self.metrics.updates_discarded.inc();
                    }
                }
            }
            OrderCardEvent::SelectionCancelled(_) => {
                self.metrics.toggles_cancelled.inc();
            }
            OrderCardEvent::ExpansionToggled(_)
            | OrderCardEvent::ItemSelected(_)
            | OrderCardEvent::AlertDismissed => {}
        }
    }

    fn notify_parent(&self) {
        if let Some(parent) = &self.parent {
            parent.do_send(OrderUpdated {
                order: self.card.order(),
            });
        }
    }

    /// Returns whether the request was still outstanding
    fn cancel_request(&mut self, request_id: Uuid, ctx: &mut Context<Self>) -> bool {
        match self.in_flight.take() {
            Some((id, handle)) if id == request_id => {
                ctx.cancel_future(handle);
                tracing::info!(request_id = %id, "Cancelled outstanding order update");
                true
            }
            other => {
                self.in_flight = other;
                false
            }
        }
    }

    fn send_update(&mut self, request_id: Uuid, ctx: &mut Context<Self>) {
        let Some(update) = self.card.update_payload() else {
            return;
        };
        let order_id = self.card.source().id.clone();
        let api = self.api.clone();
        let started = Instant::now();

        let request = async move { api.update_order(&order_id, &update).await };

        let handle = ctx.spawn(request.into_actor(self).map(move |result, act, ctx| {
            act.metrics
                .update_duration
                .observe(started.elapsed().as_secs_f64());
            if let Err(e) = &result {
                tracing::error!(request_id = %request_id, error = %e, "Order update request failed");
            }
            act.settle(request_id, outcome_of(result), ctx);
        }));

        self.in_flight = Some((request_id, handle));
    }

    fn settle(&mut self, request_id: Uuid, outcome: UpdateOutcome, ctx: &mut Context<Self>) {
        if matches!(&self.in_flight, Some((id, _)) if *id == request_id) {
            self.in_flight = None;
        }

        match self.execute(OrderCardCommand::CompleteUpdate { request_id, outcome }, ctx) {
            Ok(events) if events.is_empty() => {
                tracing::debug!(request_id = %request_id, "Ignoring result of superseded update");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(request_id = %request_id, error = %e, "Could not settle update"),
        }
    }

    fn run(&mut self, command: OrderCardCommand, ctx: &mut Context<Self>) {
        if let Err(e) = self.execute(command, ctx) {
            tracing::warn!(error = %e, "Order card command rejected");
        }
    }
}

impl Actor for OrderCardActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            order_id = %self.card.source().id,
            item_count = self.card.source().items.len(),
            "OrderCardActor started"
        );
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some((request_id, _)) = self.in_flight.take() {
            tracing::warn!(request_id = %request_id, "OrderCardActor stopped with update in flight");
        }
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<SetOrder> for OrderCardActor {
    type Result = ();

    fn handle(&mut self, msg: SetOrder, ctx: &mut Self::Context) -> Self::Result {
        self.run(OrderCardCommand::ReplaceOrder { order: msg.0 }, ctx);
    }
}

impl Handler<ToggleExpanded> for OrderCardActor {
    type Result = ();

    fn handle(&mut self, _: ToggleExpanded, ctx: &mut Self::Context) -> Self::Result {
        self.run(OrderCardCommand::ToggleExpanded, ctx);
    }
}

impl Handler<SelectItem> for OrderCardActor {
    type Result = Result<(), OrderCardError>;

    fn handle(&mut self, msg: SelectItem, ctx: &mut Self::Context) -> Self::Result {
        self.execute(OrderCardCommand::SelectItem { item_id: msg.item_id }, ctx)?;
        Ok(())
    }
}

impl Handler<CancelSelection> for OrderCardActor {
    type Result = ();

    fn handle(&mut self, _: CancelSelection, ctx: &mut Self::Context) -> Self::Result {
        self.run(OrderCardCommand::CancelSelection, ctx);
    }
}

impl Handler<ConfirmSelection> for OrderCardActor {
    type Result = Result<Uuid, OrderCardError>;

    fn handle(&mut self, _: ConfirmSelection, ctx: &mut Self::Context) -> Self::Result {
        let request_id = Uuid::new_v4();
        self.execute(OrderCardCommand::ConfirmSelection { request_id }, ctx)?;
        Ok(request_id)
    }
}

impl Handler<DismissAlert> for OrderCardActor {
    type Result = ();

    fn handle(&mut self, _: DismissAlert, ctx: &mut Self::Context) -> Self::Result {
        self.run(OrderCardCommand::DismissAlert, ctx);
    }
}

impl Handler<GetView> for OrderCardActor {
    type Result = MessageResult<GetView>;

    fn handle(&mut self, _: GetView, _: &mut Self::Context) -> Self::Result {
        MessageResult(OrderCardView::render(&self.card))
    }
}

impl Handler<GetOrder> for OrderCardActor {
    type Result = MessageResult<GetOrder>;

    fn handle(&mut self, _: GetOrder, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.card.order())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{
        DeliveryMethod, DeliveryStatus, OrderId, OrderItem, OrderUpdate, TogglePhase,
        REJECTED_FALLBACK_MESSAGE, TRANSPORT_FAILURE_MESSAGE,
    };
    use crate::messaging::{ApiError, UpdateResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone)]
    enum Reply {
        Accept,
        Reject(Option<String>),
        Fail,
    }

    struct MockOrderApi {
        reply: Reply,
        delay: Duration,
        calls: Mutex<Vec<(OrderId, OrderUpdate)>>,
    }

    impl MockOrderApi {
        fn new(reply: Reply) -> Arc<Self> {
            Self::delayed(reply, Duration::ZERO)
        }

        fn delayed(reply: Reply, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(OrderId, OrderUpdate)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderApi for MockOrderApi {
        async fn update_order(
            &self,
            order_id: &OrderId,
            update: &OrderUpdate,
        ) -> Result<UpdateResponse, ApiError> {
            self.calls.lock().unwrap().push((order_id.clone(), update.clone()));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Reply::Accept => Ok(UpdateResponse { success: true, message: None }),
                Reply::Reject(message) => Ok(UpdateResponse {
                    success: false,
                    message: message.clone(),
                }),
                Reply::Fail => Err(ApiError::Status(503)),
            }
        }
    }

    /// Stands in for the parent list view
    struct ParentRecorder {
        received: Arc<Mutex<Vec<Order>>>,
    }

    impl Actor for ParentRecorder {
        type Context = Context<Self>;
    }

    impl Handler<OrderUpdated> for ParentRecorder {
        type Result = ();

        fn handle(&mut self, msg: OrderUpdated, _: &mut Self::Context) {
            self.received.lock().unwrap().push(msg.order);
        }
    }

    fn item(id: &str, completed: bool) -> OrderItem {
        OrderItem {
            id: ItemId::new(id),
            title: format!("Mug {}", id),
            quantity: 1,
            price: 8.0,
            colour: "White".to_string(),
            size: "One size".to_string(),
            images: vec![],
            completed,
        }
    }

    fn create_test_order(flags: &[bool]) -> Order {
        Order {
            id: OrderId::new("order-42"),
            customer_name: "erin".to_string(),
            created_date: "2024-03-05T09:07:00Z".to_string(),
            completed_date: None,
            delivery_method: DeliveryMethod::new("home-delivery"),
            delivery_status: DeliveryStatus::Pending,
            tracking_number: None,
            address: "3 Quay St".to_string(),
            total_amount: 16.0,
            items: flags
                .iter()
                .enumerate()
                .map(|(i, done)| item(&format!("item-{}", i), *done))
                .collect(),
        }
    }

    struct Harness {
        card: Addr<OrderCardActor>,
        api: Arc<MockOrderApi>,
        received: Arc<Mutex<Vec<Order>>>,
        metrics: Arc<Metrics>,
    }

    fn start(order: Order, api: Arc<MockOrderApi>) -> Harness {
        let received = Arc::new(Mutex::new(Vec::new()));
        let parent = ParentRecorder { received: received.clone() }.start();
        let metrics = Arc::new(Metrics::new().unwrap());
        let card = OrderCardActor::new(order, api.clone(), metrics.clone())
            .with_parent(parent.recipient())
            .start();
        Harness { card, api, received, metrics }
    }

    async fn wait_until_idle(card: &Addr<OrderCardActor>) -> OrderCardView {
        for _ in 0..100 {
            let view = card.send(GetView).await.unwrap();
            if view.phase == TogglePhase::Idle {
                // let parent notifications drain
                tokio::time::sleep(Duration::from_millis(20)).await;
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("order card never settled");
    }

    async fn toggle(card: &Addr<OrderCardActor>, item: &str) -> Uuid {
        card.send(SelectItem { item_id: ItemId::new(item) }).await.unwrap().unwrap();
        card.send(ConfirmSelection).await.unwrap().unwrap()
    }

    #[actix::test]
    async fn test_successful_toggle_keeps_optimistic_order() {
        let h = start(create_test_order(&[false, false]), MockOrderApi::new(Reply::Accept));

        toggle(&h.card, "item-1").await;
        wait_until_idle(&h.card).await;

        let order = h.card.send(GetOrder).await.unwrap();
        assert!(!order.items[0].completed);
        assert!(order.items[1].completed);
        assert_eq!(order.delivery_status, DeliveryStatus::Pending);

        let calls = h.api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, OrderId::new("order-42"));
        assert_eq!(calls[0].1.delivery_status, None);

        // Only the optimistic notification; success adds none
        let received = h.received.lock().unwrap().clone();
        assert_eq!(received, vec![order]);
        assert_eq!(h.metrics.updates_persisted.get(), 1);
    }

    #[actix::test]
    async fn test_completing_last_item_sends_completed_status() {
        let h = start(create_test_order(&[true, false]), MockOrderApi::new(Reply::Accept));

        toggle(&h.card, "item-1").await;
        wait_until_idle(&h.card).await;

        let calls = h.api.calls();
        assert_eq!(calls[0].1.delivery_status, Some(DeliveryStatus::Completed));
        let order = h.card.send(GetOrder).await.unwrap();
        assert_eq!(order.delivery_status, DeliveryStatus::Completed);
    }

    #[actix::test]
    async fn test_rejected_update_reverts_and_notifies_parent() {
        let original = create_test_order(&[true, false]);
        let h = start(
            original.clone(),
            MockOrderApi::new(Reply::Reject(Some("x".to_string()))),
        );

        toggle(&h.card, "item-1").await;
        let view = wait_until_idle(&h.card).await;

        assert_eq!(h.card.send(GetOrder).await.unwrap(), original);
        assert_eq!(view.alert.as_deref(), Some("x"));

        let received = h.received.lock().unwrap().clone();
        assert_eq!(received.len(), 2);
        assert!(received[0].items[1].completed);
        assert_eq!(received[1], original);
        assert_eq!(h.metrics.updates_reverted.with_label_values(&["rejected"]).get(), 1);
    }

    #[actix::test]
    async fn test_rejection_without_message_uses_fallback() {
        let h = start(create_test_order(&[false]), MockOrderApi::new(Reply::Reject(None)));

        toggle(&h.card, "item-0").await;
        let view = wait_until_idle(&h.card).await;

        assert_eq!(view.alert.as_deref(), Some(REJECTED_FALLBACK_MESSAGE));

        h.card.send(DismissAlert).await.unwrap();
        let view = h.card.send(GetView).await.unwrap();
        assert_eq!(view.alert, None);
    }

    #[actix::test]
    async fn test_transport_failure_reverts_with_generic_message() {
        let original = create_test_order(&[false, true]);
        let h = start(original.clone(), MockOrderApi::new(Reply::Fail));

        toggle(&h.card, "item-0").await;
        let view = wait_until_idle(&h.card).await;

        assert_eq!(view.alert.as_deref(), Some(TRANSPORT_FAILURE_MESSAGE));
        assert_eq!(h.card.send(GetOrder).await.unwrap(), original);
        assert_eq!(h.metrics.updates_reverted.with_label_values(&["transport"]).get(), 1);
    }

    #[actix::test]
    async fn test_cancel_sends_nothing() {
        let original = create_test_order(&[false]);
        let h = start(original.clone(), MockOrderApi::new(Reply::Accept));

        h.card.send(SelectItem { item_id: ItemId::new("item-0") }).await.unwrap().unwrap();
        h.card.send(CancelSelection).await.unwrap();
        wait_until_idle(&h.card).await;

        assert!(h.api.calls().is_empty());
        assert!(h.received.lock().unwrap().is_empty());
        assert_eq!(h.card.send(GetOrder).await.unwrap(), original);
        assert_eq!(h.metrics.toggles_cancelled.get(), 1);
    }

    #[actix::test]
    async fn test_confirm_without_selection_is_rejected() {
        let h = start(create_test_order(&[false]), MockOrderApi::new(Reply::Accept));

        let result = h.card.send(ConfirmSelection).await.unwrap();
        assert_eq!(result, Err(OrderCardError::NoSelection));
        assert!(h.api.calls().is_empty());
    }

    #[actix::test]
    async fn test_second_confirm_supersedes_in_flight_request() {
        let h = start(
            create_test_order(&[false, false]),
            MockOrderApi::delayed(Reply::Accept, Duration::from_millis(100)),
        );

        let first = toggle(&h.card, "item-0").await;
        let second = toggle(&h.card, "item-1").await;
        assert_ne!(first, second);

        wait_until_idle(&h.card).await;

        let order = h.card.send(GetOrder).await.unwrap();
        assert!(order.items.iter().all(|i| i.completed));
        assert_eq!(order.delivery_status, DeliveryStatus::Completed);

        let last_call = h.api.calls().pop().unwrap();
        assert!(last_call.1.items.iter().all(|i| i.completed));
        assert_eq!(last_call.1.delivery_status, Some(DeliveryStatus::Completed));

        assert_eq!(h.metrics.updates_superseded.get(), 1);
        assert_eq!(h.metrics.updates_persisted.get(), 1);
        assert_eq!(h.metrics.toggles_confirmed.get(), 2);
    }

    #[actix::test]
    async fn test_rejected_superseding_update_keeps_earlier_toggle() {
        let h = start(
            create_test_order(&[false, false]),
            MockOrderApi::delayed(Reply::Reject(None), Duration::from_millis(100)),
        );

        toggle(&h.card, "item-0").await;
        let before_second = h.card.send(GetOrder).await.unwrap();
        toggle(&h.card, "item-1").await;
        let view = wait_until_idle(&h.card).await;

        let calls = h.api.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].1.items[0].completed);

        let order = h.card.send(GetOrder).await.unwrap();
        assert_eq!(order, before_second);
        assert!(order.items[0].completed);
        assert!(!order.items[1].completed);
        assert_eq!(view.alert.as_deref(), Some(REJECTED_FALLBACK_MESSAGE));

        let received = h.received.lock().unwrap().clone();
        assert_eq!(received.last(), Some(&before_second));
        assert_eq!(h.metrics.updates_superseded.get(), 1);
        assert_eq!(h.metrics.updates_reverted.with_label_values(&["rejected"]).get(), 1);
    }

    #[actix::test]
    async fn test_switching_orders_discards_in_flight_request() {
        let h = start(
            create_test_order(&[false]),
            MockOrderApi::delayed(Reply::Accept, Duration::from_millis(100)),
        );

        toggle(&h.card, "item-0").await;

        let mut other = create_test_order(&[false]);
        other.id = OrderId::new("order-43");
        h.card.send(SetOrder(other.clone())).await.unwrap();
        wait_until_idle(&h.card).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(h.card.send(GetOrder).await.unwrap(), other);
        assert_eq!(h.metrics.updates_discarded.get(), 1);
        assert_eq!(h.metrics.updates_superseded.get(), 0);
        assert_eq!(h.metrics.updates_persisted.get(), 0);
    }

    #[actix::test]
    async fn test_parent_refresh_during_flight_keeps_overlay() {
        let h = start(
            create_test_order(&[false, false]),
            MockOrderApi::delayed(Reply::Reject(None), Duration::from_millis(50)),
        );

        toggle(&h.card, "item-0").await;

        let mut refreshed = create_test_order(&[false, false]);
        refreshed.tracking_number = Some("TRK-77".to_string());
        h.card.send(SetOrder(refreshed.clone())).await.unwrap();

        let shown = h.card.send(GetOrder).await.unwrap();
        assert!(shown.items[0].completed);
        assert_eq!(shown.tracking(), Some("TRK-77"));

        wait_until_idle(&h.card).await;
        assert_eq!(h.card.send(GetOrder).await.unwrap(), refreshed);
    }
}
