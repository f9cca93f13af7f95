//! Handler for `GET /contacts/{id}`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use ident_core::{
  contact::{Contact, ContactId},
  store::ContactStore,
};

use crate::error::ApiError;

/// `GET /contacts/{id}` — 404 if not found.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<ContactId>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contact = store
    .get_contact(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}
