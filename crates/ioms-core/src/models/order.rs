use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::customer::Customer;
use super::decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "PE")]
    Pending,
    #[serde(rename = "CO")]
    Completed,
    #[serde(rename = "CA")]
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        })
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown order status: {0} (expected pending, completed or cancelled)")]
pub struct UnknownStatus(pub String);

/// Accepts the wire codes (`PE`) as well as the display names
impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pe" | "pending" => Ok(OrderStatus::Pending),
            "co" | "completed" => Ok(OrderStatus::Completed),
            "ca" | "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub product_name: String,
    #[serde(deserialize_with = "decimal")]
    pub product_price: f64,
    pub quantity: u32,
    #[serde(rename = "Item_SubTotal", deserialize_with = "decimal")]
    pub subtotal: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(rename = "item", default)]
    pub items: Vec<OrderItem>,
    #[serde(deserialize_with = "decimal")]
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: String,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub total_quantity: u32,
}

impl Order {
    pub fn customer_name(&self) -> &str {
        self.customer.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
    }
}

/// Line of an order being created or edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemForm {
    /// Existing line item being edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub product: i64,
    pub quantity: u32,
}

/// Body for creating (`POST`) or partially updating (`PATCH`) an order.
/// Unset fields are left out of the request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(rename = "item", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemForm>>,
}
