//! Request-time recommendation pipeline: resolve, rank, project.

use serde::{Deserialize, Serialize};

use raaga_core::model::{TrackId, TrackView};
use raaga_core::{Error, Result};
use raaga_search::resolver::Candidate;

use crate::snapshot::Snapshot;

/// A recommended track and its similarity to the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedTrack {
    #[serde(flatten)]
    pub track: TrackView,
    pub score: f64,
}

/// The resolved seed track and the tracks most similar to it, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub seed: TrackView,
    pub items: Vec<RecommendedTrack>,
}

impl Recommendations {
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.track.name.as_str()).collect()
    }
}

impl Snapshot {
    /// Resolve free text to the best-matching catalog row.
    pub fn resolve(&self, query: &str) -> Result<Candidate> {
        self.resolver().resolve(query)
    }

    /// Close matches for a query, for "did you mean" prompts.
    pub fn candidates(&self, query: &str) -> Result<Vec<Candidate>> {
        self.resolver().candidates(query)
    }

    /// Catalog names containing `text`.
    #[must_use]
    pub fn suggest(&self, text: &str, limit: usize) -> Vec<String> {
        self.resolver().suggest(text, limit)
    }

    /// Recommend up to `n` tracks similar to the one `query` names.
    ///
    /// Returns exactly `min(n, catalog size - 1)` items; the seed itself is
    /// never among them.
    ///
    /// # Errors
    /// `InvalidArgument` if `n` is zero or the query is blank, `NotFound` if
    /// the query matches no track.
    pub fn recommend(&self, query: &str, n: usize) -> Result<Recommendations> {
        check_count(n)?;
        let seed = self.resolve(query)?;
        self.recommend_index(seed.index, n)
    }

    /// Like [`Snapshot::recommend`], for a caller that already holds a
    /// track id.
    pub fn recommend_by_id(&self, id: &TrackId, n: usize) -> Result<Recommendations> {
        check_count(n)?;
        let index = self.catalog().position(id).ok_or_else(|| Error::NotFound {
            query: id.to_string(),
        })?;
        self.recommend_index(index, n)
    }

    fn recommend_index(&self, index: usize, n: usize) -> Result<Recommendations> {
        let tracks = self.catalog().tracks();
        let seed = tracks[index].view();

        let k = n.min(tracks.len().saturating_sub(1));
        if k == 0 {
            return Ok(Recommendations {
                seed,
                items: Vec::new(),
            });
        }

        let items = self
            .strategy()
            .rank(index, k)?
            .into_iter()
            .map(|neighbor| RecommendedTrack {
                track: tracks[neighbor.index].view(),
                score: neighbor.score,
            })
            .collect();

        log::debug!("Recommended {} tracks for '{}'", k, seed.name);
        Ok(Recommendations { seed, items })
    }
}

fn check_count(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidArgument(
            "number of recommendations must be positive".to_string(),
        ));
    }
    Ok(())
}
