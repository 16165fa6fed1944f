//! REST client for the external student-records backend.
//!
//! Provides the typed HTTP wrapper ([`api::BackendApi`]), the
//! [`backend::StudentBackend`] trait the console's workflows are written
//! against, the tagged [`error::BackendError`], and the explicit login
//! [`session::Session`].

pub mod api;
pub mod backend;
pub mod error;
pub mod session;
