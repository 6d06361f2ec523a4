use serde::Deserialize;

use super::decimal;
use super::order::Order;
use super::product::Product;

/// Any response carrying a `count`, including paginated lists
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Count {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Revenue {
    #[serde(deserialize_with = "decimal")]
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopProduct {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "decimal")]
    pub price: f64,
    #[serde(default)]
    pub total_sold: Option<u64>,
}

/// One point of the monthly revenue chart
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyRevenue {
    pub label: String,
    #[serde(deserialize_with = "decimal")]
    pub value: f64,
}

/// Everything the home dashboard shows
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub orders_this_month: u64,
    pub revenue_this_month: f64,
    pub active_products: u64,
    pub top_products: Vec<TopProduct>,
    pub low_stock: Vec<Product>,
    pub recent_orders: Vec<Order>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_products() {
        let json = r#"[{"id": 1, "name": "Widget", "price": "9.99", "total_sold": 12},
                       {"id": 2, "name": "Gadget", "price": "4.00", "total_sold": null}]"#;
        let top: Vec<TopProduct> = serde_json::from_str(json).unwrap();
        assert_eq!(top[0].total_sold, Some(12));
        assert_eq!(top[1].total_sold, None);
        assert_eq!(top[1].price, 4.0);
    }

    #[test]
    fn test_parse_revenue_zero() {
        let revenue: Revenue = serde_json::from_str(r#"{"total_revenue": 0}"#).unwrap();
        assert_eq!(revenue.total_revenue, 0.0);
    }
}
