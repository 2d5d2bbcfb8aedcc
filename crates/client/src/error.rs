//! Errors from the marketplace API.

use silk_road_cart::CheckoutError;
use silk_road_core::ProductId;
use thiserror::Error;

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (DNS, connect, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The bearer token was rejected. The stored token has been cleared
    /// and the forced-logout hook fired before this error is returned.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A product in the submission lacks sufficient stock.
    #[error("insufficient stock for product {0}")]
    OutOfStock(ProductId),

    /// The service rejected the request contents.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Rate limited by the service.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("unexpected status {status}: {message}")]
    Unexpected { status: u16, message: String },
}

impl From<ApiError> for CheckoutError {
    /// Collapse API failures into the cart's checkout taxonomy.
    ///
    /// Transport and server-side failures all map to `Network` (retryable);
    /// only explicit stock and validation rejections keep their identity.
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::OutOfStock(product_id) => Self::OutOfStock(product_id),
            ApiError::Validation(message) => Self::Validation(message),
            ApiError::Unauthorized => Self::Validation("authentication required".into()),
            other => Self::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_keeps_product_identity() {
        let err = CheckoutError::from(ApiError::OutOfStock(ProductId::new(7)));
        assert!(matches!(err, CheckoutError::OutOfStock(id) if id.as_i64() == 7));
    }

    #[test]
    fn test_transport_failures_are_retryable() {
        let err = CheckoutError::from(ApiError::RateLimited(2));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err = CheckoutError::from(ApiError::Validation("missing address".into()));
        assert!(!err.is_retryable());
    }
}
