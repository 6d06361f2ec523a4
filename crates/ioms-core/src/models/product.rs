use serde::{Deserialize, Serialize};

use super::decimal;

/// Product is low on stock below this many units
pub const LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "decimal")]
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub active: bool,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }
}

/// Body for creating (`POST`) or partially updating (`PATCH`) a product.
/// Unset fields are left out of the request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Decimal price, sent as a string like the API returns it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_threshold() {
        let json = r#"{"id": 1, "name": "Widget", "price": "12.50", "stock": 4, "active": true}"#;
        let mut product: Product = serde_json::from_str(json).unwrap();
        assert!(product.is_low_stock());
        product.stock = LOW_STOCK_THRESHOLD;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_product_form_price_is_a_string() {
        let form = ProductForm {
            price: Some("9.99".to_string()),
            stock: Some(0),
            ..ProductForm::default()
        };
        assert_eq!(serde_json::to_string(&form).unwrap(), r#"{"price":"9.99","stock":0}"#);
    }
}
