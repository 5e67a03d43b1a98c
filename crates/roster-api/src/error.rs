//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Store failures are classified by the [`roster_core::Error`] found in their
//! source chain:
//!
//! | Domain error | Status |
//! |--------------|--------|
//! | `Validation` | 422, with a `fields` list |
//! | `NotFound`   | 404 |
//! | `Conflict`   | 409 |
//! | anything else | 500 |

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Store(e) => match CoreError::find_in(&**e) {
        Some(CoreError::Validation(fields)) => (
          StatusCode::UNPROCESSABLE_ENTITY,
          json!({ "error": "validation failed", "fields": fields }),
        ),
        Some(err @ CoreError::NotFound { .. }) => {
          (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
        }
        Some(err @ CoreError::Conflict(_)) => {
          (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
        }
        _ => {
          tracing::error!(error = %e, "unclassified store failure");
          (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
        }
      },
    };
    (status, Json(body)).into_response()
  }
}
