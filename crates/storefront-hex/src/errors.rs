use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storefront_types::domain::checkout::CheckoutError;
use storefront_types::domain::order::OrderError;
use storefront_types::domain::validation::ValidationError;
use storefront_types::ports::catalog_store::CatalogError;
use storefront_types::ports::order_ledger::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A user-facing notice for an action the current state does not allow,
    /// such as checking out an empty cart. Nothing was changed.
    #[error("{0}")]
    Precondition(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("sign in required")]
    Unauthorized,

    #[error("admin access required")]
    Forbidden,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Rejected(inner) => AppError::from(inner),
            other => AppError::Internal(anyhow::anyhow!(other.to_string())),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        AppError::Precondition(e.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Incomplete(v) => AppError::Validation(v),
            other => AppError::Precondition(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            AppError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
            AppError::Precondition(m) => (StatusCode::CONFLICT, m.clone()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Catalog(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };

        let body = serde_json::to_string(&ErrorBody { error: msg })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}
