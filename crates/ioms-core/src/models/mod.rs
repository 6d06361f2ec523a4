//! Data models for the inventory/order API.
//!
//! - `SignInCredentials`, `SignUpData`, `AuthResponse`: authentication payloads
//! - `Customer`, `Product`, `Order`: catalog and order records
//! - `CustomerForm`, `ProductForm`, `OrderForm`: create/update bodies
//! - Dashboard aggregates: `Count`, `Revenue`, `TopProduct`, `MonthlyRevenue`
//! - `Paginated<T>`: the API's page envelope

pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod order;
pub mod product;

pub use auth::{AccountUser, AuthResponse, SignInCredentials, SignUpData};
pub use customer::{Customer, CustomerForm, CustomerOrder};
pub use dashboard::{Count, DashboardSummary, MonthlyRevenue, Revenue, TopProduct};
pub use order::{Order, OrderForm, OrderItem, OrderItemForm, OrderStatus, UnknownStatus};
pub use product::{Product, ProductForm};

use serde::{Deserialize, Deserializer};

/// A page of results as returned by list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Decimal fields arrive as strings ("12.50") but aggregates may be plain numbers.
pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(n) => Ok(n),
        Decimal::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Price {
        #[serde(deserialize_with = "decimal")]
        price: f64,
    }

    #[test]
    fn test_decimal_accepts_string_and_number() {
        let p: Price = serde_json::from_str(r#"{"price": "12.50"}"#).unwrap();
        assert_eq!(p.price, 12.5);
        let p: Price = serde_json::from_str(r#"{"price": 3}"#).unwrap();
        assert_eq!(p.price, 3.0);
        assert!(serde_json::from_str::<Price>(r#"{"price": "abc"}"#).is_err());
    }

    #[test]
    fn test_paginated_missing_results() {
        let page: Paginated<Product> =
            serde_json::from_str(r#"{"count": 0, "next": null, "previous": null}"#).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
        assert!(!page.has_next());
    }
}
