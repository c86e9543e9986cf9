//! Domain logic for the admin script gateway.
//!
//! Everything here is transport-agnostic: the API crate maps these types onto
//! HTTP, tests drive them directly.

pub mod error;
pub mod scripting;
pub mod types;
