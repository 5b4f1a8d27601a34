use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The catalog input is missing or corrupt.
    #[error("catalog load error: {0}")]
    CatalogLoad(String),

    /// The catalog cannot produce usable features (e.g. an empty vocabulary).
    #[error("feature build error: {0}")]
    FeatureBuild(String),

    /// A persisted artifact is absent or inconsistent with the current catalog.
    #[error("model not fit: {0}")]
    ModelNotFit(String),

    #[error("no track found matching '{query}'")]
    NotFound { query: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl Error {
    /// Returns `true` for request-time failures the caller is expected to
    /// render as a message. Everything else aborts a build or startup.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidArgument(_))
    }

    /// Returns `true` when the error indicates no catalog entry matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
