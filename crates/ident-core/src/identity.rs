//! The identify request and its consolidated result.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, contact::ContactId};

// ─── Request ─────────────────────────────────────────────────────────────────

/// A validated identify request: at least one of `email` and `phone_number`
/// is present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyRequest {
  email:        Option<String>,
  phone_number: Option<String>,
}

impl IdentifyRequest {
  /// Validate raw request fields. Empty strings count as absent.
  pub fn new(
    email: Option<String>,
    phone_number: Option<String>,
  ) -> Result<Self> {
    let email = email.filter(|e| !e.is_empty());
    let phone_number = phone_number.filter(|p| !p.is_empty());
    if email.is_none() && phone_number.is_none() {
      return Err(Error::InvalidRequest);
    }
    Ok(Self { email, phone_number })
  }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone_number(&self) -> Option<&str> { self.phone_number.as_deref() }
}

// ─── Consolidated view ───────────────────────────────────────────────────────

/// Everything known about one identity, as returned by `POST /identify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub primary_contact_id:    ContactId,
  /// Distinct emails; the primary's own email (if any) comes first.
  pub emails:                Vec<String>,
  /// Distinct phone numbers; the primary's own number (if any) comes first.
  pub phone_numbers:         Vec<String>,
  /// Ids of every secondary in the group, ascending.
  pub secondary_contact_ids: Vec<ContactId>,
}
