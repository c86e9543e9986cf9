//! Admin script gateway domain logic.
//!
//! The static [`registry`] is the allow-list; [`identifier`] and [`resolve`]
//! turn untrusted identifiers into confined paths; [`catalog`] reports what
//! is on disk; [`runner`] ties it together with an [`executor`].

pub mod catalog;
pub mod executor;
pub mod identifier;
pub mod registry;
pub mod resolve;
pub mod runner;
pub mod shell;
pub mod subprocess;

pub use runner::{ExecutionFailure, ExecutionReport, RunOutcome, ScriptGateway};
