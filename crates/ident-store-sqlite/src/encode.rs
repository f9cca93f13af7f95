//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and link precedence as its
//! lowercase name. Decoding failures are reported as
//! [`rusqlite::Error::FromSqlConversionFailure`] so they can surface from
//! inside a transaction closure.

use chrono::{DateTime, Utc};
use ident_core::contact::{Contact, LinkPrecedence};
use rusqlite::{Row, types::Type};

/// Column list shared by every `SELECT` against `contacts`; the order matches
/// [`contact_from_row`].
pub const CONTACT_COLUMNS: &str =
  "id, email, phone_number, link_precedence, linked_id, created_at, updated_at";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

// ─── LinkPrecedence ──────────────────────────────────────────────────────────

pub fn encode_precedence(p: LinkPrecedence) -> &'static str { p.into() }

pub fn decode_precedence(
  idx: usize,
  s: &str,
) -> rusqlite::Result<LinkPrecedence> {
  s.parse().map_err(|e: strum::ParseError| {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
  })
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// Decode a row selected with [`CONTACT_COLUMNS`].
pub fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
  let precedence: String = row.get(3)?;
  let created_at: String = row.get(5)?;
  let updated_at: String = row.get(6)?;

  Ok(Contact {
    id:              row.get(0)?,
    email:           row.get(1)?,
    phone_number:    row.get(2)?,
    link_precedence: decode_precedence(3, &precedence)?,
    linked_id:       row.get(4)?,
    created_at:      decode_dt(5, &created_at)?,
    updated_at:      decode_dt(6, &updated_at)?,
  })
}
