//! API client for the inventory/order REST backend.
//!
//! This module provides the `ApiClient` struct for signing in and signing up,
//! the read endpoints behind the dashboard, and create/update/delete for
//! customers, products and orders.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::models::{
    AccountUser, AuthResponse, Count, Customer, CustomerForm, DashboardSummary, MonthlyRevenue,
    Order, OrderForm, Paginated, Product, ProductForm, Revenue, SignInCredentials, SignUpData,
    TopProduct,
};
use crate::models::product::LOW_STOCK_THRESHOLD;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when neither config nor environment name one
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the inventory/order backend.
/// Clone is cheap - reqwest::Client and SessionStore are both shared handles.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client that reads its bearer token from `session` on every request
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer header for the current token, or nothing when logged out
    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.token() {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Session token is not a valid header value")?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    /// `build` is called once per attempt so headers pick up the current token.
    async fn send<F>(&self, url: &str, build: F) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> Result<RequestBuilder, ApiError>,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()?.send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    fn headers_or_invalid(&self) -> Result<header::HeaderMap, ApiError> {
        self.auth_headers()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        let response = self
            .send(&url, || {
                Ok(self
                    .client
                    .get(&url)
                    .headers(self.headers_or_invalid()?)
                    .query(query))
            })
            .await
            .with_context(|| format!("GET {} failed", url))?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .send(&url, || {
                Ok(self
                    .client
                    .post(&url)
                    .headers(self.headers_or_invalid()?)
                    .json(body))
            })
            .await
            .with_context(|| format!("POST {} failed", url))?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .send(&url, || {
                Ok(self
                    .client
                    .patch(&url)
                    .headers(self.headers_or_invalid()?)
                    .json(body))
            })
            .await
            .with_context(|| format!("PATCH {} failed", url))?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// DELETE a resource. The response body, if any, is ignored.
    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        self.send(&url, || {
            Ok(self
                .client
                .delete(&url)
                .headers(self.headers_or_invalid()?))
        })
        .await
        .with_context(|| format!("DELETE {} failed", url))?;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange credentials for an access token. Does not touch the session.
    pub async fn sign_in(&self, credentials: &SignInCredentials) -> Result<AuthResponse> {
        debug!(email = %credentials.email, "Requesting access token");
        self.post("/api/token/", credentials).await
    }

    /// Register a new account
    pub async fn sign_up(&self, data: &SignUpData) -> Result<AccountUser> {
        self.post("/users/", data).await
    }

    // ===== Dashboard =====

    /// Number of orders placed in the current calendar month
    pub async fn orders_this_month(&self) -> Result<u64> {
        let month = Local::now().month().to_string();
        let count: Count = self.get("/orders/", &[("month", month)]).await?;
        Ok(count.count)
    }

    pub async fn revenue_this_month(&self) -> Result<f64> {
        let month = Local::now().month().to_string();
        let revenue: Revenue = self
            .get("/orders/month-revenue/", &[("month", month)])
            .await?;
        Ok(revenue.total_revenue)
    }

    pub async fn active_products(&self) -> Result<u64> {
        let count: Count = self
            .get("/products/", &[("active", "true".to_string())])
            .await?;
        Ok(count.count)
    }

    pub async fn top_products(&self) -> Result<Vec<TopProduct>> {
        self.get("/orders/top-selling/", &[]).await
    }

    pub async fn low_stock(&self) -> Result<Vec<Product>> {
        let page: Paginated<Product> = self
            .get("/products/", &[("stock__lt", LOW_STOCK_THRESHOLD.to_string())])
            .await?;
        Ok(page.results)
    }

    pub async fn recent_orders(&self) -> Result<Vec<Order>> {
        let page: Paginated<Order> = self
            .get("/orders/", &[("recent", "true".to_string())])
            .await?;
        Ok(page.results)
    }

    pub async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>> {
        self.get("/orders/monthly-revenue/", &[]).await
    }

    /// Fetch every dashboard panel concurrently
    pub async fn dashboard(&self) -> Result<DashboardSummary> {
        let (
            orders_this_month,
            revenue_this_month,
            active_products,
            top_products,
            low_stock,
            recent_orders,
            monthly_revenue,
        ) = tokio::try_join!(
            self.orders_this_month(),
            self.revenue_this_month(),
            self.active_products(),
            self.top_products(),
            self.low_stock(),
            self.recent_orders(),
            self.monthly_revenue(),
        )?;

        Ok(DashboardSummary {
            orders_this_month,
            revenue_this_month,
            active_products,
            top_products,
            low_stock,
            recent_orders,
            monthly_revenue,
        })
    }

    // ===== Customers =====

    pub async fn customers(&self, search: &str) -> Result<Vec<Customer>> {
        let page: Paginated<Customer> = self
            .get("/customers/", &[("search", search.to_string())])
            .await?;
        Ok(page.results)
    }

    pub async fn customer(&self, id: i64) -> Result<Customer> {
        self.get(&format!("/customers/{}/", id), &[]).await
    }

    pub async fn create_customer(&self, form: &CustomerForm) -> Result<Customer> {
        self.post("/customers/", form).await
    }

    pub async fn update_customer(&self, id: i64, form: &CustomerForm) -> Result<Customer> {
        self.patch(&format!("/customers/{}/", id), form).await
    }

    pub async fn delete_customer(&self, id: i64) -> Result<()> {
        self.delete(&format!("/customers/{}/", id)).await
    }

    // ===== Products =====

    pub async fn products(&self, page: u32) -> Result<Paginated<Product>> {
        self.get("/products/", &[("page", page.to_string())]).await
    }

    pub async fn product(&self, id: i64) -> Result<Product> {
        self.get(&format!("/products/{}/", id), &[]).await
    }

    pub async fn create_product(&self, form: &ProductForm) -> Result<Product> {
        self.post("/products/", form).await
    }

    pub async fn update_product(&self, id: i64, form: &ProductForm) -> Result<Product> {
        self.patch(&format!("/products/{}/", id), form).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.delete(&format!("/products/{}/", id)).await
    }

    // ===== Orders =====

    pub async fn orders(&self, page: u32) -> Result<Paginated<Order>> {
        self.get("/orders/", &[("page", page.to_string())]).await
    }

    pub async fn order(&self, id: &str) -> Result<Order> {
        self.get(&format!("/orders/{}/", id), &[]).await
    }

    pub async fn create_order(&self, form: &OrderForm) -> Result<Order> {
        self.post("/orders/", form).await
    }

    pub async fn update_order(&self, id: &str, form: &OrderForm) -> Result<Order> {
        self.patch(&format!("/orders/{}/", id), form).await
    }

    pub async fn delete_order(&self, id: &str) -> Result<()> {
        self.delete(&format!("/orders/{}/", id)).await
    }
}
