//! The `ContactStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `ident-store-sqlite`).
//! Higher layers (`ident-api`, `ident-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  contact::{Contact, ContactId},
  identity::{IdentifyRequest, Identity},
};

/// Abstraction over an ident storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Reconcile `request` against the stored contacts and return the
  /// consolidated identity.
  ///
  /// Implementations must apply every write of one call atomically: either
  /// the whole reconciliation is committed or none of it is.
  fn identify(
    &self,
    request: IdentifyRequest,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Every stored contact, ordered by id.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;
}
