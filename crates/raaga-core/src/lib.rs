//! Core domain model for raaga.
//!
//! This crate defines the track catalog, the error taxonomy shared by the
//! build and request paths, and the SQLite-backed store that persists
//! derived similarity artifacts.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
