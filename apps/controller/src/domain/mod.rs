//! Client-local domain types: the session record and its start
//! configuration. Wire DTOs live in `crate::protocol`.

pub mod config;
pub mod session;
