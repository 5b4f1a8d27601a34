use serde::{Deserialize, Serialize};

use crate::model::ids::TrackId;

/// One row of the catalog.
///
/// Text fields absent from the input are empty strings. `genres` keeps the
/// provider's comma-joined tag string as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: TrackId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub artist: String,

    #[serde(default)]
    pub album: String,

    /// Release date with whatever precision the provider reported
    /// ("2021", "2021-03" or "2021-03-12").
    #[serde(default)]
    pub release_date: String,

    /// External popularity score.
    pub popularity: f64,

    pub duration_ms: f64,

    /// Comma-joined genre tags, e.g. "kuthu, tamil pop".
    #[serde(default)]
    pub genres: String,

    #[serde(default)]
    pub album_art_url: String,
}

impl TrackRecord {
    #[must_use]
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: String::new(),
            album: String::new(),
            release_date: String::new(),
            popularity: 0.0,
            duration_ms: 0.0,
            genres: String::new(),
            album_art_url: String::new(),
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    #[must_use]
    pub fn with_genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = genres.into();
        self
    }

    #[must_use]
    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = popularity;
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_album_art_url(mut self, url: impl Into<String>) -> Self {
        self.album_art_url = url.into();
        self
    }

    /// The public projection handed to callers.
    #[must_use]
    pub fn view(&self) -> TrackView {
        TrackView {
            id: self.id.clone(),
            name: self.name.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            album_art_url: self.album_art_url.clone(),
        }
    }
}

/// The fields of a track exposed in recommendation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackView {
    pub id: TrackId,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub album_art_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_new() {
        let track = TrackRecord::new("t1", "Vaathi Coming");
        assert_eq!(track.id, TrackId::new("t1"));
        assert_eq!(track.name, "Vaathi Coming");
        assert!(track.artist.is_empty());
        assert!(track.genres.is_empty());
    }

    #[test]
    fn test_track_builder() {
        let track = TrackRecord::new("t1", "Arabic Kuthu")
            .with_artist("Anirudh Ravichander")
            .with_album("Beast")
            .with_genres("kuthu, tamil pop")
            .with_popularity(71.0)
            .with_duration_ms(279_000.0);

        assert_eq!(track.artist, "Anirudh Ravichander");
        assert_eq!(track.album, "Beast");
        assert_eq!(track.popularity, 71.0);
        assert_eq!(track.duration_ms, 279_000.0);
    }

    #[test]
    fn test_view_projects_public_fields() {
        let track = TrackRecord::new("t1", "Vaathi Raid")
            .with_artist("Anirudh Ravichander")
            .with_album("Master")
            .with_album_art_url("https://i.scdn.co/image/abc")
            .with_popularity(60.0);

        let view = track.view();
        assert_eq!(view.id, track.id);
        assert_eq!(view.name, "Vaathi Raid");
        assert_eq!(view.album, "Master");
        assert_eq!(view.album_art_url, "https://i.scdn.co/image/abc");
    }
}
