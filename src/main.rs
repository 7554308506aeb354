use actix::prelude::*;
use anyhow::Context as _;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_card::actors::{
    ConfirmSelection, GetView, OrderCardActor, OrderUpdated, SelectItem, ToggleExpanded,
};
use order_card::config::ApiConfig;
use order_card::domain::order::{ItemId, Order, TogglePhase};
use order_card::messaging::HttpOrderApi;
use order_card::metrics::Metrics;

/// Stand-in for the dashboard's order list; logs what the card reports
struct OrderListLogger;

impl Actor for OrderListLogger {
    type Context = Context<Self>;
}

impl Handler<OrderUpdated> for OrderListLogger {
    type Result = ();

    fn handle(&mut self, msg: OrderUpdated, _: &mut Self::Context) {
        tracing::info!(
            order_id = %msg.order.id,
            delivery_status = %msg.order.delivery_status,
            status = %msg.order.status_label(),
            "Order list received card update"
        );
    }
}

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Before the filter, so RUST_LOG may come from .env
    dotenv::dotenv().ok();

    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_card=debug"))
        )
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: order_card <order.json> [item-id]")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let order: Order = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    let item_id = match args.next() {
        Some(id) => ItemId::new(id),
        None => order
            .items
            .first()
            .map(|item| item.id.clone())
            .context("order has no items to toggle")?,
    };

    let config = ApiConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "Using order service");

    let api = Arc::new(HttpOrderApi::new(&config)?);
    let metrics = Arc::new(Metrics::new()?);

    let parent = OrderListLogger.start();
    let card = OrderCardActor::new(order, api, metrics.clone())
        .with_parent(parent.recipient())
        .start();

    card.send(ToggleExpanded).await?;
    card.send(SelectItem { item_id }).await??;
    println!("{}", card.send(GetView).await?);

    let request_id = card.send(ConfirmSelection).await??;
    tracing::info!(request_id = %request_id, "Confirmed, waiting for order service");

    let view = loop {
        let view = card.send(GetView).await?;
        if view.phase == TogglePhase::Idle {
            break view;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    };
    println!("{}", view);

    print!("{}", metrics.render()?);

    Ok(())
}
