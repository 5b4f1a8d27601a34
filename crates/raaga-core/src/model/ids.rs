use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a track, as assigned by the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_id_display() {
        let id = TrackId::new("4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(id.to_string(), "4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(id.as_str(), "4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn test_track_id_equality() {
        assert_eq!(TrackId::from("a"), TrackId::from(String::from("a")));
        assert_ne!(TrackId::from("a"), TrackId::from("b"));
    }

    #[test]
    fn test_track_id_serializes_as_plain_string() {
        let encoded = bincode::serialize(&TrackId::new("abc")).unwrap();
        let plain = bincode::serialize("abc").unwrap();
        assert_eq!(encoded, plain);
    }
}
