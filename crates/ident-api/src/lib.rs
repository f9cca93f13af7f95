//! JSON REST API for ident.
//!
//! Exposes an axum [`Router`] backed by any [`ident_core::store::ContactStore`].
//! Transport concerns (binding, tracing layers) are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(ident_api::api_router(store.clone()))
//! ```

pub mod contacts;
pub mod error;
pub mod identify;

use std::sync::Arc;

use axum::{Router, routing::get};
use ident_core::store::ContactStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/identify",
      get(identify::list::<S>).post(identify::identify::<S>),
    )
    .route("/contacts/{id}", get(contacts::get_one::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
