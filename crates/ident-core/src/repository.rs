//! The `ContactRepository` trait: the storage operations the resolver needs.
//!
//! A repository is borrowed for the span of one reconciliation. Backends hand
//! the resolver a repository bound to an open transaction, so every read and
//! write issued through it commits or rolls back together.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::contact::{Contact, ContactId, Linkage, NewContact};

pub trait ContactRepository {
  type Error;

  /// Every contact whose email equals `email` or whose phone number equals
  /// `phone_number`. A `None` argument matches nothing.
  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone_number: Option<&str>,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// Every contact whose id is in `ids` or whose `linked_id` is in `ids`.
  fn find_by_ids_or_linked_ids(
    &mut self,
    ids: &BTreeSet<ContactId>,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// Persist a new contact and return its assigned id.
  fn insert(&mut self, contact: NewContact) -> Result<ContactId, Self::Error>;

  /// Rewrite the precedence and `linked_id` of an existing contact.
  fn update_linkage(
    &mut self,
    id: ContactId,
    linkage: Linkage,
    updated_at: DateTime<Utc>,
  ) -> Result<(), Self::Error>;
}

impl<R: ContactRepository + ?Sized> ContactRepository for &mut R {
  type Error = R::Error;

  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone_number: Option<&str>,
  ) -> Result<Vec<Contact>, Self::Error> {
    (**self).find_by_email_or_phone(email, phone_number)
  }

  fn find_by_ids_or_linked_ids(
    &mut self,
    ids: &BTreeSet<ContactId>,
  ) -> Result<Vec<Contact>, Self::Error> {
    (**self).find_by_ids_or_linked_ids(ids)
  }

  fn insert(&mut self, contact: NewContact) -> Result<ContactId, Self::Error> {
    (**self).insert(contact)
  }

  fn update_linkage(
    &mut self,
    id: ContactId,
    linkage: Linkage,
    updated_at: DateTime<Utc>,
  ) -> Result<(), Self::Error> {
    (**self).update_linkage(id, linkage, updated_at)
  }
}
