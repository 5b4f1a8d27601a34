use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::ids::TrackId;
use crate::model::track::TrackRecord;

/// The ordered, immutable set of tracks a snapshot is built from.
///
/// Row positions are the indices every derived artifact refers to, so a
/// `Catalog` is never reordered or edited after construction. A refreshed
/// catalog is a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    tracks: Vec<TrackRecord>,
    by_id: HashMap<TrackId, usize>,
}

impl Catalog {
    /// Build a catalog from records, validating ids and numeric fields.
    ///
    /// # Errors
    /// `CatalogLoad` if the list is empty, an id repeats, or a numeric field
    /// is not finite.
    pub fn new(tracks: Vec<TrackRecord>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::CatalogLoad("catalog contains no tracks".to_string()));
        }

        let mut by_id = HashMap::with_capacity(tracks.len());
        for (index, track) in tracks.iter().enumerate() {
            if track.id.as_str().is_empty() {
                return Err(Error::CatalogLoad(format!("row {index} has an empty id")));
            }
            if !track.popularity.is_finite() || !track.duration_ms.is_finite() {
                return Err(Error::CatalogLoad(format!(
                    "track {} has a non-finite numeric field",
                    track.id
                )));
            }
            if let Some(previous) = by_id.insert(track.id.clone(), index) {
                return Err(Error::CatalogLoad(format!(
                    "duplicate track id {} at rows {previous} and {index}",
                    track.id
                )));
            }
        }

        Ok(Self { tracks, by_id })
    }

    /// Load a catalog from a CSV file with a header row.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::CatalogLoad(format!("cannot open {}: {e}", path.display()))
        })?;
        let catalog = Self::from_csv_reader(file)
            .map_err(|e| match e {
                Error::CatalogLoad(msg) => {
                    Error::CatalogLoad(format!("{}: {msg}", path.display()))
                }
                other => other,
            })?;

        log::info!(
            "Loaded {} tracks from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse CSV from any reader. Columns are matched by header name, so
    /// column order and extra columns do not matter.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let tracks = reader
            .deserialize::<TrackRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::CatalogLoad(e.to_string()))?;

        Self::new(tracks)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TrackRecord> {
        self.tracks.get(index)
    }

    #[must_use]
    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackRecord> {
        self.tracks.iter()
    }

    /// Row index of the track with the given id.
    #[must_use]
    pub fn position(&self, id: &TrackId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Track ids in row order.
    #[must_use]
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id.clone()).collect()
    }

    /// SHA-256 over every row's id and the fields features are built from
    /// (artist, album, genres, popularity, duration), in row order.
    ///
    /// Names, release dates and album art do not feed any feature and are
    /// left out, so editing them keeps stored artifacts valid.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for track in &self.tracks {
            for field in [
                track.id.as_str(),
                track.artist.as_str(),
                track.album.as_str(),
                track.genres.as_str(),
            ] {
                // length prefix keeps ("ab", "c") apart from ("a", "bc")
                hasher.update((field.len() as u64).to_le_bytes());
                hasher.update(field.as_bytes());
            }
            hasher.update(track.popularity.to_bits().to_le_bytes());
            hasher.update(track.duration_ms.to_bits().to_le_bytes());
        }
        hasher.finalize().into()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a TrackRecord;
    type IntoIter = std::slice::Iter<'a, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
