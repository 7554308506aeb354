use chrono::{Local, TimeZone};
use std::fmt::{self, Display};

use crate::domain::order::{ItemId, Order, OrderCard, OrderItem, TogglePhase};
use crate::utils::format_timestamp_in;

// ============================================================================
// Order Card View - what the card shows for its current state
// ============================================================================
//
// A pure projection of `OrderCard`; `Display` renders it as plain text.
//
// ============================================================================

pub const EXPAND_LABEL: &str = "View More / Edit ▼";
pub const COLLAPSE_LABEL: &str = "View Less ▲";

#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: ItemId,
    pub image: String,
    pub title: String,
    pub colour: String,
    pub size: String,
    pub quantity: u32,
    pub price: f64,
    pub delivery: String,
    pub completed: bool,
}

impl ItemView {
    fn new(item: &OrderItem, order: &Order) -> Self {
        Self {
            id: item.id.clone(),
            image: item.image().to_string(),
            title: item.title.clone(),
            colour: item.colour.clone(),
            size: item.size.clone(),
            quantity: item.quantity,
            price: item.price,
            delivery: order.delivery_method.display_name(),
            completed: item.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub customer: String,
    /// First item of the order, if any
    pub lead_item: Option<ItemView>,
    pub image: String,
    pub delivery: String,
    pub status_label: String,
    pub all_completed: bool,
    pub total_items: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsView {
    pub customer: String,
    pub items: Vec<ItemView>,
    pub ordered_on: String,
    /// Only for delivered orders
    pub completed_on: Option<String>,
    pub tracking_number: Option<String>,
    /// Omitted for self-collection
    pub shipping_address: Option<String>,
    pub total_items: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialogView {
    pub header: &'static str,
    pub customer: String,
    pub item: ItemView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderCardView {
    pub summary: SummaryView,
    pub toggle_label: &'static str,
    pub details: Option<DetailsView>,
    pub dialog: Option<ConfirmDialogView>,
    pub alert: Option<String>,
    pub phase: TogglePhase,
}

impl OrderCardView {
    /// Project `card` with timestamps in the host's local zone
    pub fn render(card: &OrderCard) -> Self {
        Self::render_in(card, &Local)
    }

    pub fn render_in<Tz>(card: &OrderCard, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let order = card.order();

        let dialog = card.selection().and_then(|item_id| {
            let item = order.item(item_id)?;
            Some(ConfirmDialogView {
                header: if item.completed { "Mark as incomplete" } else { "Confirm completion" },
                customer: order.customer_name.clone(),
                item: ItemView::new(item, &order),
            })
        });

        let details = card.is_expanded().then(|| details_view(&order, tz));

        Self {
            summary: summary_view(&order),
            toggle_label: if card.is_expanded() { COLLAPSE_LABEL } else { EXPAND_LABEL },
            details,
            dialog,
            alert: card.alert().map(str::to_string),
            phase: card.phase(),
        }
    }
}

fn summary_view(order: &Order) -> SummaryView {
    let lead_item = order.items.first().map(|item| ItemView::new(item, order));
    SummaryView {
        customer: order.customer_name.clone(),
        image: lead_item
            .as_ref()
            .map(|item| item.image.clone())
            .unwrap_or_else(|| crate::domain::order::DEFAULT_IMAGE.to_string()),
        lead_item,
        delivery: order.delivery_method.display_name(),
        status_label: order.status_label(),
        all_completed: order.completed_count() == order.items.len(),
        total_items: order.items.len(),
        total_amount: order.total_amount,
    }
}

fn details_view<Tz>(order: &Order, tz: &Tz) -> DetailsView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let completed_on = (order.delivery_status == crate::domain::order::DeliveryStatus::Delivered)
        .then(|| {
            let raw = order.completed_date.as_deref().unwrap_or(&order.created_date);
            format_timestamp_in(raw, tz)
        });

    DetailsView {
        customer: order.customer_name.clone(),
        items: order.items.iter().map(|item| ItemView::new(item, order)).collect(),
        ordered_on: format_timestamp_in(&order.created_date, tz),
        completed_on,
        tracking_number: order.tracking().map(str::to_string),
        shipping_address: (!order.delivery_method.is_self_collection())
            .then(|| order.address.clone()),
        total_items: order.items.len(),
        total_amount: order.total_amount,
    }
}

// ============================================================================
// Text Rendering
// ============================================================================

fn write_totals(f: &mut fmt::Formatter<'_>, total_items: usize, total_amount: f64) -> fmt::Result {
    writeln!(f, "Total {} item(s):", total_items)?;
    writeln!(f, "${} (incl. Delivery Fees)", total_amount)
}

impl Display for OrderCardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(f, "[{}]", s.image)?;
        writeln!(f, "Customer: {}", s.customer)?;
        if let Some(item) = &s.lead_item {
            writeln!(f, "Item: {}", item.title)?;
            writeln!(f, "Quantity: {} | Price: ${}", item.quantity, item.price)?;
        }
        writeln!(f, "Delivery: {}", s.delivery)?;
        if s.all_completed {
            writeln!(f, "Status: {}!", s.status_label)?;
        } else {
            writeln!(f, "Status: {}", s.status_label)?;
        }
        write_totals(f, s.total_items, s.total_amount)?;
        writeln!(f, "{}", self.toggle_label)?;

        if let Some(d) = &self.details {
            writeln!(f)?;
            writeln!(f, "Customer Name:")?;
            writeln!(f, "{}", d.customer)?;
            writeln!(f, "All Items in the Order:")?;
            for item in &d.items {
                let mark = if item.completed { "x" } else { " " };
                writeln!(f, "  [{}] {} ({})", mark, item.title, item.id)?;
                writeln!(f, "      [{}]", item.image)?;
                writeln!(
                    f,
                    "      Colour: {} | Size: {} | Quantity: {} | Price: ${}",
                    item.colour, item.size, item.quantity, item.price
                )?;
                writeln!(f, "      Delivery: {}", item.delivery)?;
            }
            writeln!(f, "Ordered on:")?;
            writeln!(f, "{}", d.ordered_on)?;
            if let Some(completed_on) = &d.completed_on {
                writeln!(f, "Order Completed:")?;
                writeln!(f, "{}", completed_on)?;
            }
            if let Some(tracking) = &d.tracking_number {
                writeln!(f, "Delivery Tracking Number:")?;
                writeln!(f, "{}", tracking)?;
            }
            if let Some(address) = &d.shipping_address {
                writeln!(f, "Shipping Address:")?;
                writeln!(f, "{}", address)?;
            }
            write_totals(f, d.total_items, d.total_amount)?;
        }

        if let Some(dialog) = &self.dialog {
            writeln!(f)?;
            writeln!(f, "== {} ==", dialog.header)?;
            writeln!(f, "Customer Name: {}", dialog.customer)?;
            writeln!(f, "Item Name: {}", dialog.item.title)?;
            writeln!(
                f,
                "Colour: {} | Size: {} | Quantity: {} | Price: ${}",
                dialog.item.colour, dialog.item.size, dialog.item.quantity, dialog.item.price
            )?;
            writeln!(f, "Delivery: {}", dialog.item.delivery)?;
            writeln!(f, "[Confirm] [Cancel]")?;
        }

        if let Some(alert) = &self.alert {
            writeln!(f)?;
            writeln!(f, "!! {}", alert)?;
        }

        Ok(())
    }
}
