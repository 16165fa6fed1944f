//! Domain core of the certification admin console.
//!
//! Pure logic only: record shapes, the course catalog, date-of-birth
//! normalization, the record form controller, the directory view state
//! machine, and QR artifact derivation. Nothing here performs network I/O.

pub mod catalog;
pub mod directory;
pub mod dob;
pub mod duration;
pub mod error;
pub mod form;
pub mod qr;
pub mod student;
pub mod types;
