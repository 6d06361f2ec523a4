//! Create, update and delete commands for customers, products and orders.
//!
//! Each command enters its screen's route through the auth gate first, so a
//! missing or expired session redirects to sign-in before anything is sent.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use ioms_core::api::ApiClient;
use ioms_core::auth::AuthGate;
use ioms_core::models::{CustomerForm, OrderForm, OrderItemForm, OrderStatus, ProductForm};
use ioms_core::Route;

use crate::{enter, render};

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// Add a customer (name, email and phone are required)
    Create(CustomerFields),
    /// Change some fields of a customer
    Update {
        id: i64,
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Remove a customer
    Delete { id: i64 },
}

#[derive(Args)]
pub struct CustomerFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl From<CustomerFields> for CustomerForm {
    fn from(fields: CustomerFields) -> Self {
        CustomerForm {
            name: fields.name,
            email: fields.email,
            phone_number: fields.phone,
        }
    }
}

#[derive(Subcommand)]
pub enum ProductCommand {
    /// Add a product (name and price are required)
    Create(ProductFields),
    /// Change some fields of a product
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Remove a product
    Delete { id: i64 },
}

#[derive(Args)]
pub struct ProductFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, help = "Unit price, e.g. 12.50")]
    price: Option<String>,
    #[arg(long)]
    stock: Option<u32>,
    #[arg(long)]
    active: Option<bool>,
}

impl TryFrom<ProductFields> for ProductForm {
    type Error = anyhow::Error;

    fn try_from(fields: ProductFields) -> Result<Self> {
        if let Some(price) = &fields.price {
            match price.trim().parse::<f64>() {
                Ok(value) if value >= 0.0 => {}
                _ => bail!("Price must be a non-negative number, got {:?}", price),
            }
        }
        Ok(ProductForm {
            name: fields.name,
            description: fields.description,
            price: fields.price.map(|p| p.trim().to_string()),
            stock: fields.stock,
            active: fields.active,
        })
    }
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Place an order (customer and at least one item are required)
    Create(OrderFields),
    /// Change status, customer or items of an order
    Update {
        id: String,
        #[command(flatten)]
        fields: OrderFields,
    },
    /// Remove an order
    Delete { id: String },
}

#[derive(Args)]
pub struct OrderFields {
    #[arg(long, help = "Customer id")]
    customer: Option<i64>,
    #[arg(long, help = "pending, completed or cancelled")]
    status: Option<OrderStatus>,
    #[arg(long = "item", value_name = "PRODUCT:QTY", value_parser = parse_item)]
    items: Vec<OrderItemForm>,
}

impl From<OrderFields> for OrderForm {
    fn from(fields: OrderFields) -> Self {
        OrderForm {
            customer: fields.customer,
            status: fields.status,
            items: (!fields.items.is_empty()).then_some(fields.items),
        }
    }
}

/// Parse `PRODUCT:QTY`, e.g. `7:2`
fn parse_item(s: &str) -> Result<OrderItemForm, String> {
    let (product, quantity) = s
        .split_once(':')
        .ok_or_else(|| format!("expected PRODUCT:QTY, got {:?}", s))?;
    let product = product
        .trim()
        .parse()
        .map_err(|_| format!("invalid product id {:?}", product))?;
    let quantity = match quantity.trim().parse::<u32>() {
        Ok(q) if q > 0 => q,
        _ => return Err(format!("quantity must be at least 1, got {:?}", quantity)),
    };
    Ok(OrderItemForm {
        id: None,
        product,
        quantity,
    })
}

pub async fn customer(api: &ApiClient, gate: &mut AuthGate, command: CustomerCommand) -> Result<()> {
    match command {
        CustomerCommand::Create(fields) => {
            enter(gate, Route::CreateCustomer).await?;
            let form = CustomerForm::from(fields);
            if form.name.is_none() || form.email.is_none() || form.phone_number.is_none() {
                bail!("--name, --email and --phone are required");
            }
            let customer = api.create_customer(&form).await?;
            render::print_customer(&customer);
        }
        CustomerCommand::Update { id, fields } => {
            enter(gate, Route::EditCustomer(id)).await?;
            let form = CustomerForm::from(fields);
            if form.is_empty() {
                bail!("Nothing to update");
            }
            let customer = api.update_customer(id, &form).await?;
            render::print_customer(&customer);
        }
        CustomerCommand::Delete { id } => {
            enter(gate, Route::Customers).await?;
            api.delete_customer(id).await?;
            println!("Deleted customer #{}", id);
        }
    }
    println!("Continue at {}", Route::Customers);
    Ok(())
}

pub async fn product(api: &ApiClient, gate: &mut AuthGate, command: ProductCommand) -> Result<()> {
    match command {
        ProductCommand::Create(fields) => {
            enter(gate, Route::CreateProduct).await?;
            let form = ProductForm::try_from(fields)?;
            if form.name.is_none() || form.price.is_none() {
                bail!("--name and --price are required");
            }
            let form = ProductForm {
                active: form.active.or(Some(true)),
                stock: form.stock.or(Some(0)),
                ..form
            };
            let product = api.create_product(&form).await?;
            render::print_product(&product);
            println!("Continue at {}", Route::ProductDetail(product.id));
        }
        ProductCommand::Update { id, fields } => {
            enter(gate, Route::EditProduct(id)).await?;
            let form = ProductForm::try_from(fields)?;
            let product = api.update_product(id, &form).await?;
            render::print_product(&product);
            println!("Continue at {}", Route::ProductDetail(id));
        }
        ProductCommand::Delete { id } => {
            enter(gate, Route::Products).await?;
            api.delete_product(id).await?;
            println!("Deleted product #{}", id);
        }
    }
    Ok(())
}

pub async fn order(api: &ApiClient, gate: &mut AuthGate, command: OrderCommand) -> Result<()> {
    match command {
        OrderCommand::Create(fields) => {
            enter(gate, Route::CreateOrder).await?;
            let form = OrderForm::from(fields);
            if form.customer.is_none() {
                bail!("A customer must be selected (--customer)");
            }
            if form.items.is_none() {
                bail!("Order must contain at least one item (--item PRODUCT:QTY)");
            }
            let form = OrderForm {
                status: form.status.or(Some(OrderStatus::Pending)),
                ..form
            };
            let order = api.create_order(&form).await?;
            render::print_order(&order);
            let next = Route::order_detail(&order.order_id).unwrap_or(Route::Orders);
            println!("Continue at {}", next);
        }
        OrderCommand::Update { id, fields } => {
            enter(gate, Route::EditOrder(id.clone())).await?;
            let order = api.update_order(&id, &OrderForm::from(fields)).await?;
            render::print_order(&order);
            let next = Route::order_detail(&id).unwrap_or(Route::Orders);
            println!("Continue at {}", next);
        }
        OrderCommand::Delete { id } => {
            enter(gate, Route::Orders).await?;
            api.delete_order(&id).await?;
            println!("Deleted order {}", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(
            parse_item("7:2"),
            Ok(OrderItemForm { id: None, product: 7, quantity: 2 })
        );
        assert!(parse_item("7").is_err());
        assert!(parse_item("x:1").is_err());
        assert!(parse_item("7:0").is_err());
    }

    #[test]
    fn test_order_fields_without_items_leave_items_unset() {
        let fields = OrderFields {
            customer: None,
            status: Some(OrderStatus::Completed),
            items: Vec::new(),
        };
        let form = OrderForm::from(fields);
        assert!(form.items.is_none());
        assert_eq!(form.status, Some(OrderStatus::Completed));
    }

    #[test]
    fn test_product_price_must_be_numeric() {
        let fields = |price: &str| ProductFields {
            name: None,
            description: None,
            price: Some(price.to_string()),
            stock: None,
            active: None,
        };
        assert!(ProductForm::try_from(fields("abc")).is_err());
        assert!(ProductForm::try_from(fields("-1")).is_err());
        let form = ProductForm::try_from(fields(" 9.99 ")).unwrap();
        assert_eq!(form.price.as_deref(), Some("9.99"));
    }
}
