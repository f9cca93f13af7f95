//! Contact — the sole entity of the identity store.
//!
//! A contact is one fragment of a customer's identity: an email address, a
//! phone number, or both. Contacts that share either field belong to the same
//! connected group, which has exactly one primary (the oldest member); every
//! other member is a secondary pointing straight at that primary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository-assigned contact identifier.
pub type ContactId = i64;

// ─── Precedence ──────────────────────────────────────────────────────────────

/// Whether a contact is the canonical record of its group.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkPrecedence {
  Primary,
  Secondary,
}

// ─── Linkage ─────────────────────────────────────────────────────────────────

/// The `(linkPrecedence, linkedId)` pair as a single value, so that a
/// secondary without a target or a primary with one cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
  Primary,
  /// Linked to the primary with the given id.
  Secondary(ContactId),
}

impl Linkage {
  pub fn precedence(self) -> LinkPrecedence {
    match self {
      Self::Primary => LinkPrecedence::Primary,
      Self::Secondary(_) => LinkPrecedence::Secondary,
    }
  }

  pub fn linked_id(self) -> Option<ContactId> {
    match self {
      Self::Primary => None,
      Self::Secondary(id) => Some(id),
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A stored contact record. Serialised with the camelCase column names used
/// on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:              ContactId,
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub link_precedence: LinkPrecedence,
  pub linked_id:       Option<ContactId>,
  /// Set by the repository on insert; never changes afterwards.
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Contact {
  /// The contact's linkage, or `None` if the stored precedence and
  /// `linked_id` disagree (a secondary with no target, or a primary with one).
  pub fn linkage(&self) -> Option<Linkage> {
    match (self.link_precedence, self.linked_id) {
      (LinkPrecedence::Primary, None) => Some(Linkage::Primary),
      (LinkPrecedence::Secondary, Some(id)) => Some(Linkage::Secondary(id)),
      _ => None,
    }
  }

  pub fn is_primary(&self) -> bool {
    self.link_precedence == LinkPrecedence::Primary
  }

  /// Sort key used to pick a group's primary: oldest first, lowest id on a
  /// tie.
  pub fn seniority(&self) -> (DateTime<Utc>, ContactId) {
    (self.created_at, self.id)
  }
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::repository::ContactRepository::insert`]. The id is
/// assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewContact {
  pub email:        Option<String>,
  pub phone_number: Option<String>,
  pub linkage:      Linkage,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl NewContact {
  /// A contact whose creation and update timestamps are both `now`.
  pub fn new(
    email: Option<String>,
    phone_number: Option<String>,
    linkage: Linkage,
    now: DateTime<Utc>,
  ) -> Self {
    Self { email, phone_number, linkage, created_at: now, updated_at: now }
  }

  /// Attach the repository-assigned id.
  pub fn into_contact(self, id: ContactId) -> Contact {
    Contact {
      id,
      email: self.email,
      phone_number: self.phone_number,
      link_precedence: self.linkage.precedence(),
      linked_id: self.linkage.linked_id(),
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}
