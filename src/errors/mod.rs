//! Central error types, built on `thiserror`.
//!
//! `InnkeepError` is the transport-agnostic taxonomy used by storage and
//! services; the HTTP layer converts it (and `auth::AuthError`) into the
//! JSON envelope in `api::error`.

mod types;

pub use types::{InnkeepError, Result};
