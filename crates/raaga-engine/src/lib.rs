//! Build, persistence and recommendation service for raaga.
//!
//! A [`Snapshot`] bundles a catalog with its fitted similarity model and
//! name resolver. Snapshots are built once, persisted to the artifact store
//! and served through an [`Engine`], which swaps in rebuilt snapshots
//! atomically.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod artifacts;
pub mod config;
pub mod engine;
pub mod service;
pub mod snapshot;

pub use config::Config;
pub use engine::Engine;
pub use service::{RecommendedTrack, Recommendations};
pub use snapshot::{BuildOptions, Model, Snapshot};
