//! SQL schema for the ident SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never deleted. Only link_precedence, linked_id and updated_at are
-- ever rewritten.
CREATE TABLE IF NOT EXISTS contacts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT,
    phone_number    TEXT,
    link_precedence TEXT    NOT NULL
                    CHECK (link_precedence IN ('primary', 'secondary')),
    linked_id       INTEGER REFERENCES contacts(id),
    created_at      TEXT    NOT NULL,   -- RFC 3339 UTC; repository-assigned
    updated_at      TEXT    NOT NULL,   -- RFC 3339 UTC
    CHECK (email IS NOT NULL OR phone_number IS NOT NULL),
    CHECK ((link_precedence = 'primary') = (linked_id IS NULL))
);

CREATE INDEX IF NOT EXISTS contacts_email_idx     ON contacts(email);
CREATE INDEX IF NOT EXISTS contacts_phone_idx     ON contacts(phone_number);
CREATE INDEX IF NOT EXISTS contacts_linked_id_idx ON contacts(linked_id);

PRAGMA user_version = 1;
";
