//! Silk Road marketplace API client.
//!
//! # Architecture
//!
//! - Thin REST client over `reqwest`, one instance shared by clone (`Arc` inner)
//! - The service is the source of truth for catalog and orders; products are
//!   cached in-memory via `moka` (5 minute TTL)
//! - A bearer token from persisted storage is attached to every request; a 401
//!   clears the stored token and fires a forced-logout hook so the UI layer
//!   can react (clearing the cart is a UI policy choice, not done here)
//! - Implements the cart engine's [`RemoteSync`] boundary: checkout submits
//!   the cart snapshot to `POST /orders`
//!
//! # Example
//!
//! ```rust,ignore
//! use silk_road_client::{ApiClient, ApiConfig};
//!
//! let client = ApiClient::new(&ApiConfig::from_env()?);
//! let page = client.list_products(0, 20).await?;
//! let order = cart.checkout(&client, shipping).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod config;
mod error;
pub mod types;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use types::{CreateOrderRequest, ErrorBody, Page, Product};

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use silk_road_cart::{CheckoutError, RemoteSync};
use silk_road_core::{LineItem, Order, OrderId, OrderStatus, ProductId, ShippingInfo};
use tracing::{debug, instrument, warn};

/// Hook invoked after a 401 clears the stored token.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Client for the Silk Road marketplace REST API.
///
/// Cheap to clone; all clones share the token, cache, and connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
    product_cache: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying HTTP client cannot be
    /// constructed with the configured timeout.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                token: RwLock::new(config.token.clone()),
                on_unauthorized: RwLock::new(None),
                product_cache,
            }),
        })
    }

    /// Replace the stored bearer token (e.g., after login).
    pub fn set_token(&self, token: SecretString) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drop the stored bearer token.
    pub fn clear_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a bearer token is currently stored.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Register the forced-logout hook, fired after a 401 clears the token.
    pub fn on_unauthorized(&self, hook: UnauthorizedHook) {
        *self
            .inner
            .on_unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    fn current_token(&self) -> Option<SecretString> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send a request with auth attached and map non-success statuses.
    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let req = match self.current_token() {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        };

        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            reqwest::StatusCode::UNAUTHORIZED => {
                warn!("bearer token rejected, clearing stored token");
                self.clear_token();
                let hook = self
                    .inner
                    .on_unauthorized
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                if let Some(hook) = hook {
                    hook();
                }
                Err(ApiError::Unauthorized)
            }
            reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound(
                response.url().path().to_string(),
            )),
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                Err(ApiError::RateLimited(retry_after))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(classify_failure(status.as_u16(), &body))
            }
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, paged. `page` is zero-based.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u32, size: u32) -> Result<Page<Product>, ApiError> {
        let response = self
            .execute(
                self.inner
                    .http
                    .get(self.endpoint("products"))
                    .query(&[("page", page), ("size", size)]),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Search products by keyword, paged.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<Product>, ApiError> {
        let response = self
            .execute(
                self.inner
                    .http
                    .get(self.endpoint("products/search"))
                    .query(&[("q", query)])
                    .query(&[("page", page), ("size", size)]),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch one product, served from the cache when fresh.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for unknown IDs, or any transport error.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.product_cache.get(&id).await {
            debug!(%id, "product cache hit");
            return Ok(product);
        }

        let response = self
            .execute(self.inner.http.get(self.endpoint(&format!("products/{id}"))))
            .await?;
        let product: Product = response.json().await?;
        self.inner.product_cache.insert(id, product.clone()).await;
        Ok(product)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit a cart snapshot as a new order.
    ///
    /// # Errors
    ///
    /// [`ApiError::OutOfStock`] when a line's product lacks stock,
    /// [`ApiError::Validation`] for rejected contents, or any transport error.
    #[instrument(skip(self, items, shipping_info), fields(lines = items.len()))]
    pub async fn create_order(
        &self,
        items: Vec<LineItem>,
        shipping_info: ShippingInfo,
        total: Decimal,
    ) -> Result<Order, ApiError> {
        let request = CreateOrderRequest {
            items,
            shipping_info,
            total,
        };
        let response = self
            .execute(self.inner.http.post(self.endpoint("orders")).json(&request))
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch the caller's order history.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    #[instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<Vec<Order>, ApiError> {
        let response = self
            .execute(self.inner.http.get(self.endpoint("orders")))
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for unknown IDs, or any transport error.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let response = self
            .execute(self.inner.http.get(self.endpoint(&format!("orders/{id}"))))
            .await?;
        Ok(response.json().await?)
    }

    /// Update an order's status.
    ///
    /// The service enforces the status lifecycle; an illegal transition
    /// comes back as [`ApiError::Validation`].
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let response = self
            .execute(
                self.inner
                    .http
                    .put(self.endpoint(&format!("orders/{id}/status")))
                    .json(&serde_json::json!({ "status": status })),
            )
            .await?;
        Ok(response.json().await?)
    }
}

impl RemoteSync for ApiClient {
    async fn submit_order(
        &self,
        lines: &[LineItem],
        shipping: &ShippingInfo,
        total: Decimal,
    ) -> Result<Order, CheckoutError> {
        self.create_order(lines.to_vec(), shipping.clone(), total)
            .await
            .map_err(CheckoutError::from)
    }
}

/// Map a non-success response (other than 401/404/429) to an [`ApiError`].
fn classify_failure(status: u16, body: &str) -> ApiError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();

    if let Some(ref error_body) = parsed
        && error_body.error.as_deref() == Some(ErrorBody::OUT_OF_STOCK)
        && let Some(product_id) = error_body.product_id
    {
        return ApiError::OutOfStock(product_id);
    }

    match status {
        400 | 409 | 422 => ApiError::Validation(
            parsed
                .map(|b| b.detail())
                .unwrap_or_else(|| body.to_string()),
        ),
        _ => ApiError::Unexpected {
            status,
            message: parsed.map_or_else(|| body.to_string(), |b| b.detail()),
        },
    }
}
