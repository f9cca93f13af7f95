//! [`SqliteRepository`] — [`ContactRepository`] over a borrowed connection.
//!
//! The store builds one of these around an open transaction for every
//! identify call, so the resolver's reads and writes share its lock.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use ident_core::{
  contact::{Contact, ContactId, Linkage, NewContact},
  repository::ContactRepository,
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::encode::{CONTACT_COLUMNS, contact_from_row, encode_dt, encode_precedence};

pub struct SqliteRepository<'c> {
  conn: &'c Connection,
}

impl<'c> SqliteRepository<'c> {
  pub fn new(conn: &'c Connection) -> Self { Self { conn } }

  pub fn all(&self) -> rusqlite::Result<Vec<Contact>> {
    let mut stmt = self
      .conn
      .prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY id"))?;
    let contacts = stmt
      .query_map([], contact_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(contacts)
  }

  pub fn by_id(&self, id: ContactId) -> rusqlite::Result<Option<Contact>> {
    self
      .conn
      .query_row(
        &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
        rusqlite::params![id],
        contact_from_row,
      )
      .optional()
  }
}

impl ContactRepository for SqliteRepository<'_> {
  type Error = rusqlite::Error;

  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone_number: Option<&str>,
  ) -> rusqlite::Result<Vec<Contact>> {
    // `column = NULL` is never true, so an absent field matches nothing.
    let mut stmt = self.conn.prepare(&format!(
      "SELECT {CONTACT_COLUMNS} FROM contacts
       WHERE email = ?1 OR phone_number = ?2
       ORDER BY id"
    ))?;
    let contacts = stmt
      .query_map(rusqlite::params![email, phone_number], contact_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(contacts)
  }

  fn find_by_ids_or_linked_ids(
    &mut self,
    ids: &BTreeSet<ContactId>,
  ) -> rusqlite::Result<Vec<Contact>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let placeholders = (1..=ids.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let mut stmt = self.conn.prepare(&format!(
      "SELECT {CONTACT_COLUMNS} FROM contacts
       WHERE id IN ({placeholders}) OR linked_id IN ({placeholders})
       ORDER BY id"
    ))?;
    let contacts = stmt
      .query_map(rusqlite::params_from_iter(ids.iter()), contact_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(contacts)
  }

  fn insert(&mut self, contact: NewContact) -> rusqlite::Result<ContactId> {
    self.conn.execute(
      "INSERT INTO contacts (
         email, phone_number, link_precedence, linked_id, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        contact.email,
        contact.phone_number,
        encode_precedence(contact.linkage.precedence()),
        contact.linkage.linked_id(),
        encode_dt(contact.created_at),
        encode_dt(contact.updated_at),
      ],
    )?;
    Ok(self.conn.last_insert_rowid())
  }

  fn update_linkage(
    &mut self,
    id: ContactId,
    linkage: Linkage,
    updated_at: DateTime<Utc>,
  ) -> rusqlite::Result<()> {
    let changed = self.conn.execute(
      "UPDATE contacts
       SET link_precedence = ?1, linked_id = ?2, updated_at = ?3
       WHERE id = ?4",
      rusqlite::params![
        encode_precedence(linkage.precedence()),
        linkage.linked_id(),
        encode_dt(updated_at),
        id,
      ],
    )?;
    if changed == 0 {
      return Err(rusqlite::Error::QueryReturnedNoRows);
    }
    Ok(())
  }
}
