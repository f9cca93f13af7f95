//! Error types for `ident-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  /// Neither an email nor a phone number was supplied.
  #[error("At least one of email or phoneNumber must be provided")]
  InvalidRequest,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
