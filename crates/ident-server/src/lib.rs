//! HTTP server assembly for ident.
//!
//! Wires the JSON API from `ident-api` to a concrete store, adds the welcome
//! route and request tracing, and loads [`ServerConfig`].

use std::{path::{Path, PathBuf}, sync::Arc};

use axum::{Router, routing::get};
use config::{Config, ConfigError, Environment, File};
use ident_core::store::ContactStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Environment variable prefix for configuration overrides, e.g.
/// `IDENT_PORT=8080`.
pub const ENV_PREFIX: &str = "IDENT";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

/// Layer defaults, the optional TOML file at `file` and `env`, in increasing
/// order of precedence.
pub fn load_config(
  file: &Path,
  env: Environment,
) -> Result<ServerConfig, ConfigError> {
  Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 3000)?
    .set_default("store_path", "ident.db")?
    .add_source(File::from(file).required(false))
    .add_source(env)
    .build()?
    .try_deserialize()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/", get(welcome))
    .merge(ident_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn welcome() -> &'static str { "Welcome to the ident identity API" }

// ─── Tests ────────────────────────────────────────────────────────────────────
