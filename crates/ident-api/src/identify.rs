//! Handlers for `/identify`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/identify` | Body: [`IdentifyBody`]; returns `{"contact": Identity}` |
//! | `GET`  | `/identify` | Every stored contact: `{"contacts": [...]}` |

use std::sync::Arc;

use axum::{Json, extract::State};
use ident_core::{
  contact::Contact,
  identity::{IdentifyRequest, Identity},
  store::ContactStore,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

// ─── Identify ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /identify`. Both fields may be absent or
/// `null`; validation happens in [`IdentifyRequest::new`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyBody {
  #[serde(default)]
  pub email:        Option<String>,
  /// Accepted as a JSON string or a JSON number.
  #[serde(default, deserialize_with = "string_or_number")]
  pub phone_number: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
  String(String),
  Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
    StringOrNumber::String(s) => s,
    StringOrNumber::Number(n) => n.to_string(),
  }))
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
  pub contact: Identity,
}

/// `POST /identify`
pub async fn identify<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<IdentifyBody>,
) -> Result<Json<IdentifyResponse>, ApiError>
where
  S: ContactStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let request = IdentifyRequest::new(body.email, body.phone_number)?;
  let contact = store
    .identify(request)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(IdentifyResponse { contact }))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
  pub contacts: Vec<Contact>,
}

/// `GET /identify`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<ContactsResponse>, ApiError>
where
  S: ContactStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contacts = store
    .list_contacts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ContactsResponse { contacts }))
}
