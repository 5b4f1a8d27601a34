//! Persistence of derived artifacts.

pub mod artifact;
pub mod db;
pub mod migrations;

pub use artifact::{ArtifactBlob, ArtifactInfo, ArtifactKind, FORMAT_VERSION};
pub use db::ArtifactStore;
