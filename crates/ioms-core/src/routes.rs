//! Navigation targets of the dashboard.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown route: {0}")]
pub struct UnknownRoute(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    SignUp,
    Dashboard,
    Customers,
    CreateCustomer,
    CustomerDetail(i64),
    EditCustomer(i64),
    Orders,
    CreateOrder,
    /// Use [`Route::order_detail`] for ids from outside: `new` and `edit`
    /// are the paths of other order screens and do not round-trip.
    OrderDetail(String),
    EditOrder(String),
    Products,
    CreateProduct,
    ProductDetail(i64),
    EditProduct(i64),
}

impl Route {
    /// Parse a path such as `/customers/edit/4`. Query strings and trailing
    /// slashes are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Dashboard,
            ["signin"] => Route::SignIn,
            ["signup"] => Route::SignUp,

            ["customers"] => Route::Customers,
            ["customers", "create"] => Route::CreateCustomer,
            ["customers", "edit", id] => Route::EditCustomer(id.parse().ok()?),
            ["customers", id] => Route::CustomerDetail(id.parse().ok()?),

            ["orders"] => Route::Orders,
            ["orders", "new"] => Route::CreateOrder,
            ["orders", "edit", id] => Route::EditOrder(id.to_string()),
            ["orders", id] => Route::order_detail(id)?,

            ["products"] => Route::Products,
            ["products", "create"] => Route::CreateProduct,
            ["products", "edit", id] => Route::EditProduct(id.parse().ok()?),
            ["products", id] => Route::ProductDetail(id.parse().ok()?),

            _ => return None,
        };
        Some(route)
    }

    /// Detail route for an order id, or `None` for ids that would read back
    /// as a different screen.
    pub fn order_detail(id: &str) -> Option<Self> {
        let reserved = matches!(id, "" | "new" | "edit");
        if reserved || id.contains(['/', '?', '#']) {
            return None;
        }
        Some(Route::OrderDetail(id.to_string()))
    }

    pub fn path(&self) -> String {
        match self {
            Route::SignIn => "/signin".to_string(),
            Route::SignUp => "/signup".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Customers => "/customers".to_string(),
            Route::CreateCustomer => "/customers/create".to_string(),
            Route::CustomerDetail(id) => format!("/customers/{}", id),
            Route::EditCustomer(id) => format!("/customers/edit/{}", id),
            Route::Orders => "/orders".to_string(),
            Route::CreateOrder => "/orders/new".to_string(),
            Route::OrderDetail(id) => format!("/orders/{}", id),
            Route::EditOrder(id) => format!("/orders/edit/{}", id),
            Route::Products => "/products".to_string(),
            Route::CreateProduct => "/products/create".to_string(),
            Route::ProductDetail(id) => format!("/products/{}", id),
            Route::EditProduct(id) => format!("/products/edit/{}", id),
        }
    }

    /// Everything except the sign-in and sign-up screens needs a session.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::SignIn | Route::SignUp)
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s).ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
