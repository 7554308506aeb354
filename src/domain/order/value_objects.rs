use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Image shown when an item has no image references
pub const DEFAULT_IMAGE: &str = "/default-image.jpg";

/// Backend identifier of an order (`_id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of an item within its order (`_id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: ItemId,
    pub title: String,
    pub quantity: u32,
    pub price: f64,
    #[serde(default)]
    pub colour: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(rename = "item_completed", default)]
    pub completed: bool,
}

impl OrderItem {
    /// First image reference, or the placeholder
    pub fn image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .filter(|src| !src.is_empty())
            .unwrap_or(DEFAULT_IMAGE)
    }
}

/// Order-level delivery status.
///
/// Unknown backend values are preserved in `Other` so they survive a
/// round trip through the card untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeliveryStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Other(String),
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Processing => "processing",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Completed => "completed",
            DeliveryStatus::Cancelled => "cancelled",
            DeliveryStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for DeliveryStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => DeliveryStatus::Pending,
            "processing" => DeliveryStatus::Processing,
            "shipped" => DeliveryStatus::Shipped,
            "delivered" => DeliveryStatus::Delivered,
            "completed" => DeliveryStatus::Completed,
            "cancelled" => DeliveryStatus::Cancelled,
            _ => DeliveryStatus::Other(raw),
        }
    }
}

impl From<DeliveryStatus> for String {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the order reaches the customer, e.g. `home-delivery` or `self-collection`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryMethod(pub String);

impl DeliveryMethod {
    pub const SELF_COLLECTION: &'static str = "self-collection";

    pub fn new(method: impl Into<String>) -> Self {
        Self(method.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human form: the first `-` becomes a space
    pub fn display_name(&self) -> String {
        self.0.replacen('-', " ", 1)
    }

    pub fn is_self_collection(&self) -> bool {
        self.0 == Self::SELF_COLLECTION
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "username")]
    pub customer_name: String,
    pub created_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    pub delivery_status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub address: String,
    pub total_amount: f64,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn item(&self, item_id: &ItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// True when every item is complete (vacuously true for an empty order)
    pub fn all_items_completed(&self) -> bool {
        self.items.iter().all(|item| item.completed)
    }

    /// `Completed`, or `k/n Completed`
    pub fn status_label(&self) -> String {
        let total = self.items.len();
        let done = self.completed_count();
        if done == total {
            "Completed".to_string()
        } else {
            format!("{}/{} Completed", done, total)
        }
    }

    /// Tracking number, treating an empty string as absent
    pub fn tracking(&self) -> Option<&str> {
        self.tracking_number.as_deref().filter(|t| !t.is_empty())
    }
}

/// Partial order sent to the backend when completion flags change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
}

// ============================================================================
// Unit Tests
// ============================================================================
