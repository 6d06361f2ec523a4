//! Plain-text rendering of the guarded views.

use ioms_core::models::{Customer, DashboardSummary, Order, Paginated, Product};

use crate::format::{format_date, format_money, short_id, truncate_string};

/// Width of name columns in list views
const NAME_WIDTH: usize = 28;

pub fn print_dashboard(summary: &DashboardSummary) {
    println!("Orders this month:  {}", summary.orders_this_month);
    println!("Revenue this month: {}", format_money(summary.revenue_this_month));
    println!("Active products:    {}", summary.active_products);

    println!("\nTop products");
    for product in &summary.top_products {
        println!(
            "  {:<width$} {:>10} sold {}",
            truncate_string(&product.name, NAME_WIDTH),
            format_money(product.price),
            product.total_sold.unwrap_or(0),
            width = NAME_WIDTH
        );
    }

    println!("\nLow stock");
    if summary.low_stock.is_empty() {
        println!("  (none)");
    }
    for product in &summary.low_stock {
        println!(
            "  {:<width$} {:>4} left",
            truncate_string(&product.name, NAME_WIDTH),
            product.stock,
            width = NAME_WIDTH
        );
    }

    println!("\nRecent orders");
    for order in &summary.recent_orders {
        print_order_row(order);
    }

    println!("\nMonthly revenue");
    for point in &summary.monthly_revenue {
        println!("  {:<10} {:>12}", point.label, format_money(point.value));
    }
}

pub fn print_customers(customers: &[Customer]) {
    for customer in customers {
        println!(
            "{:>5}  {:<width$} {:<30} {} orders",
            customer.id,
            truncate_string(&customer.name, NAME_WIDTH),
            customer.email,
            customer.order_count,
            width = NAME_WIDTH
        );
    }
}

pub fn print_customer(customer: &Customer) {
    println!("{} (#{})", customer.name, customer.id);
    println!("Email: {}", customer.email);
    println!("Phone: {}", customer.phone_number.as_deref().unwrap_or("-"));
    println!("Orders: {}", customer.order_count);
    for order in &customer.orders {
        println!(
            "  {}  {}  {}",
            short_id(&order.order_id),
            format_date(&order.created_at),
            order.status
        );
    }
}

pub fn print_products(page: &Paginated<Product>) {
    for product in &page.results {
        print_product_row(product);
    }
    println!("{} products{}", page.count, if page.has_next() { " (more pages)" } else { "" });
}

fn print_product_row(product: &Product) {
    println!(
        "{:>5}  {:<width$} {:>10} {:>5} {}",
        product.id,
        truncate_string(&product.name, NAME_WIDTH),
        format_money(product.price),
        product.stock,
        if product.active { "active" } else { "inactive" },
        width = NAME_WIDTH
    );
}

pub fn print_product(product: &Product) {
    println!("{} (#{})", product.name, product.id);
    println!("Price: {}", format_money(product.price));
    println!("Stock: {}{}", product.stock, if product.is_low_stock() { " (low)" } else { "" });
    println!("Active: {}", if product.active { "yes" } else { "no" });
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
}

pub fn print_orders(page: &Paginated<Order>) {
    for order in &page.results {
        print_order_row(order);
    }
    println!("{} orders{}", page.count, if page.has_next() { " (more pages)" } else { "" });
}

fn print_order_row(order: &Order) {
    println!(
        "  {}  {}  {:<width$} {:>10}  {}",
        short_id(&order.order_id),
        format_date(&order.created_at),
        truncate_string(order.customer_name(), NAME_WIDTH),
        format_money(order.total_price),
        order.status,
        width = NAME_WIDTH
    );
}

pub fn print_order(order: &Order) {
    println!("Order {}", order.order_id);
    println!("Customer: {}", order.customer_name());
    println!("Placed:   {}", format_date(&order.created_at));
    println!("Status:   {}", order.status);
    for item in &order.items {
        println!(
            "  {:>3} x {:<width$} {:>10}",
            item.quantity,
            truncate_string(&item.product_name, NAME_WIDTH),
            format_money(item.subtotal),
            width = NAME_WIDTH
        );
    }
    println!("Total:    {} ({} items)", format_money(order.total_price), order.total_quantity);
}
