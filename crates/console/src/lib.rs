//! Admin console for the student-certification backend.
//!
//! Binds the domain logic in `cadmin_core` to the HTTP client in
//! `cadmin_client`: record submission with QR export, lookup, the
//! directory listing with inline edit and delete, and the login gate.

pub mod cli;
pub mod commands;
pub mod config;
pub mod directory;
pub mod error;
pub mod search;
pub mod workflow;
