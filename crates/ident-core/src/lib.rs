//! Core types and trait definitions for the ident reconciliation service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`repository::ContactRepository`] and
//! [`store::ContactStore`]; the reconciliation algorithm itself lives in
//! [`resolver::IdentityResolver`].

pub mod contact;
pub mod error;
pub mod identity;
pub mod repository;
pub mod resolver;
pub mod store;

pub use error::{Error, Result};
