//! HTTP Basic-auth middleware and standalone verifier.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde_json::json;
use thiserror::Error;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Rejection for a request without valid credentials.
#[derive(Debug, Error)]
#[error("unauthorized")]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
  fn into_response(self) -> Response {
    (
      StatusCode::UNAUTHORIZED,
      [(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(r#"Basic realm="roster""#),
      )],
      axum::Json(json!({ "error": "unauthorized" })),
    )
      .into_response()
  }
}

/// Verify Basic credentials in `headers` against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Unauthorized> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Unauthorized)?;

  let encoded = header_val.strip_prefix("Basic ").ok_or(Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Unauthorized)?;

  if username != config.username {
    return Err(Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash).map_err(|_| Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Unauthorized)?;

  Ok(())
}

/// Middleware guarding every route it wraps.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  request: Request,
  next: Next,
) -> Result<Response, Unauthorized> {
  if let Err(e) = verify_auth(request.headers(), &config) {
    tracing::debug!(uri = %request.uri(), "rejected request without valid credentials");
    return Err(e);
  }
  Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hash_password;

  fn config(password: &str) -> AuthConfig {
    AuthConfig {
      username:      "user".to_string(),
      password_hash: hash_password(password).unwrap(),
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  pub(crate) fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials() {
    let cfg = config("secret");
    assert!(verify_auth(&headers(&basic("user", "secret")), &cfg).is_ok());
  }

  #[test]
  fn wrong_password() {
    let cfg = config("secret");
    assert!(verify_auth(&headers(&basic("user", "wrong")), &cfg).is_err());
  }

  #[test]
  fn wrong_username() {
    let cfg = config("secret");
    assert!(verify_auth(&headers(&basic("admin", "secret")), &cfg).is_err());
  }

  #[test]
  fn missing_header() {
    let cfg = config("secret");
    assert!(verify_auth(&HeaderMap::new(), &cfg).is_err());
  }

  #[test]
  fn invalid_base64() {
    let cfg = config("secret");
    assert!(verify_auth(&headers("Basic !!!not-base64!!!"), &cfg).is_err());
  }
}
