use serde::{Deserialize, Serialize};

use super::order::OrderStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(rename = "OrderCount", default)]
    pub order_count: u32,
    #[serde(rename = "OrderDetail", default)]
    pub orders: Vec<CustomerOrder>,
}

/// Order summary embedded in a customer record
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerOrder {
    pub order_id: String,
    pub created_at: String,
    pub status: OrderStatus,
}

/// Body for creating (`POST`) or partially updating (`PATCH`) a customer.
/// Unset fields are left out of the request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl CustomerForm {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone_number.is_none()
    }
}
