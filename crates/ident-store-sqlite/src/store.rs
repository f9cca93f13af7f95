//! [`SqliteStore`] — the SQLite implementation of [`ContactStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use ident_core::{
  contact::{Contact, ContactId},
  identity::{IdentifyRequest, Identity},
  resolver::IdentityResolver,
  store::ContactStore,
};
use rusqlite::TransactionBehavior;

use crate::{Error, Result, repository::SqliteRepository, schema::SCHEMA};

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// An ident contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened contact store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn identify(&self, request: IdentifyRequest) -> Result<Identity> {
    let identity = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock before the first read, so two
        // overlapping requests cannot both see the pre-merge state.
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let identity = IdentityResolver::new(SqliteRepository::new(&tx))
          .resolve(&request, Utc::now())?;
        tx.commit()?;
        Ok(identity)
      })
      .await?;

    tracing::debug!(
      primary_id = identity.primary_contact_id,
      secondaries = identity.secondary_contact_ids.len(),
      "identify committed"
    );
    Ok(identity)
  }

  async fn list_contacts(&self) -> Result<Vec<Contact>> {
    let contacts = self
      .conn
      .call(|conn| Ok(SqliteRepository::new(conn).all()?))
      .await?;
    Ok(contacts)
  }

  async fn get_contact(&self, id: ContactId) -> Result<Option<Contact>> {
    let contact = self
      .conn
      .call(move |conn| Ok(SqliteRepository::new(conn).by_id(id)?))
      .await?;
    Ok(contact)
  }
}
