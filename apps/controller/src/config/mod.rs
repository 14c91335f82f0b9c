//! Environment-derived client settings.

pub mod remote;
