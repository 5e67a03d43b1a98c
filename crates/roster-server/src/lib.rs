//! HTTP server assembly for the roster.
//!
//! Wraps the JSON API from `roster-api` with Basic auth and request tracing.
//! The binary in `main.rs` only loads configuration and calls [`router`].

pub mod auth;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{Router, middleware, routing::get};
use rand_core::OsRng;
use roster_core::{position::AssignmentPolicy, store::RosterStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// What happens when a person who already holds a position is assigned
  /// another one.
  #[serde(default)]
  pub assignment_policy:  AssignmentPolicy,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Load configuration from an optional TOML file layered with `ROSTER_*`
/// environment variables.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

/// Hash `password` into an argon2 PHC string for `auth_password_hash`.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();
  Ok(hash)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: `/api` behind Basic auth, plus an
/// unauthenticated `/health` probe.
pub fn router<S>(store: Arc<S>, auth: AuthConfig) -> Router
where
  S: RosterStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = roster_api::api_router(store)
    .layer(middleware::from_fn_with_state(Arc::new(auth), require_auth));

  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use roster_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let auth = AuthConfig {
      username:      "user".to_string(),
      password_hash: hash_password("secret").unwrap(),
    };
    router(Arc::new(store), auth)
  }

  fn get_req(uri: &str, creds: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some((user, pass)) = creds {
      let encoded = B64.encode(format!("{user}:{pass}"));
      builder = builder.header(header::AUTHORIZATION, format!("Basic {encoded}"));
    }
    builder.body(Body::empty()).unwrap()
  }

  #[tokio::test]
  async fn api_requires_credentials() {
    let app = app().await;
    let resp = app.clone().oneshot(get_req("/api/persons", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let resp = app
      .oneshot(get_req("/api/persons", Some(("user", "wrong"))))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn api_accepts_valid_credentials() {
    let app = app().await;
    let resp = app
      .oneshot(get_req("/api/status-kinds", Some(("user", "secret"))))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn health_is_open() {
    let resp = app().await.oneshot(get_req("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[test]
  fn config_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("store_path", "~/roster.db")
      .unwrap()
      .set_override("auth_username", "user")
      .unwrap()
      .set_override("auth_password_hash", "x")
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.assignment_policy, AssignmentPolicy::ClosePrevious);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/roster.db")),
      PathBuf::from(home).join("roster.db")
    );
    assert_eq!(expand_tilde(Path::new("/srv/roster.db")), PathBuf::from("/srv/roster.db"));
  }
}
