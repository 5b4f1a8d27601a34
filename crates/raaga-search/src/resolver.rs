//! Fuzzy resolution of free-text queries to catalog rows.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

use raaga_core::model::Catalog;
use raaga_core::{Error, Result};

/// Candidates scoring below this never resolve.
pub const MATCH_CUTOFF: f64 = 0.3;

/// Length of the close-match list.
pub const MAX_CANDIDATES: usize = 5;

/// A catalog row that plausibly matches a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub score: f64,
    /// The lowercased name equals the lowercased query.
    pub exact: bool,
}

/// Maps free text to catalog rows by normalized edit similarity.
///
/// Built once per catalog; holds lowercased names so queries only pay for
/// scoring.
#[derive(Debug, Clone)]
pub struct QueryResolver {
    names: Vec<String>,
    lowered: Vec<String>,
}

impl QueryResolver {
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        let names: Vec<String> = catalog.iter().map(|t| t.name.clone()).collect();
        let lowered = names.iter().map(|n| n.trim().to_lowercase()).collect();
        Self { names, lowered }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a query to the best matching row.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank query, `NotFound` if nothing reaches
    /// [`MATCH_CUTOFF`].
    pub fn resolve(&self, query: &str) -> Result<Candidate> {
        let best = self.candidates(query)?.into_iter().next();
        match best {
            Some(candidate) => {
                log::debug!(
                    "Resolved '{}' to row {} ('{}', score {:.3})",
                    query,
                    candidate.index,
                    self.names[candidate.index],
                    candidate.score
                );
                Ok(candidate)
            }
            None => Err(Error::NotFound {
                query: query.to_string(),
            }),
        }
    }

    /// Up to [`MAX_CANDIDATES`] rows at or above the cutoff, best first.
    ///
    /// Exact case-insensitive matches come before everything else, then
    /// higher scores, then lower row indices.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank query.
    pub fn candidates(&self, query: &str) -> Result<Vec<Candidate>> {
        let query = normalize_query(query)?;

        let mut found: Vec<Candidate> = self
            .lowered
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                let exact = *name == query;
                let score = if exact { 1.0 } else { match_score(&query, name) };
                passes_cutoff(score).then_some(Candidate {
                    index,
                    score,
                    exact,
                })
            })
            .collect();

        found.sort_by(|a, b| {
            b.exact
                .cmp(&a.exact)
                .then(b.score.total_cmp(&a.score))
                .then(a.index.cmp(&b.index))
        });
        found.truncate(MAX_CANDIDATES);
        Ok(found)
    }

    /// Distinct catalog names containing `text` (case-insensitive), sorted,
    /// at most `limit` of them.
    #[must_use]
    pub fn suggest(&self, text: &str, limit: usize) -> Vec<String> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }
        self.lowered
            .iter()
            .zip(&self.names)
            .filter(|(lowered, _)| lowered.contains(&needle))
            .map(|(_, name)| name.as_str())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .take(limit)
            .map(str::to_string)
            .collect()
    }
}

/// The cutoff is inclusive.
fn passes_cutoff(score: f64) -> bool {
    score >= MATCH_CUTOFF
}

fn normalize_query(query: &str) -> Result<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Err(Error::InvalidArgument("query must not be empty".to_string()));
    }
    Ok(query)
}

/// Similarity in [0, 1] between a lowercased query and a lowercased name.
///
/// The larger of the whole-string similarity and the best similarity against
/// any window of the name as long as the query, so a short query that names
/// part of a title still scores well.
#[must_use]
pub fn match_score(query: &str, name: &str) -> f64 {
    let whole = normalized_levenshtein(query, name);

    let name_chars: Vec<char> = name.chars().collect();
    let width = query.chars().count();
    if width == 0 || width >= name_chars.len() {
        return whole;
    }

    name_chars
        .windows(width)
        .map(|window| normalized_levenshtein(query, &window.iter().collect::<String>()))
        .fold(whole, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raaga_core::model::TrackRecord;

    fn catalog(names: &[&str]) -> Catalog {
        Catalog::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| TrackRecord::new(format!("t{i}"), *name))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_misspelling_resolves_to_first_of_tied_rows() {
        let resolver = QueryResolver::new(&catalog(&[
            "Vaathi Coming",
            "Vaathi Raid",
            "Arabic Kuthu",
        ]));
        let best = resolver.resolve("vathi").unwrap();
        assert_eq!(best.index, 0);
        assert!((best.score - 0.8).abs() < 1e-12);
        assert!(!best.exact);

        let all = resolver.candidates("vathi").unwrap();
        let order: Vec<usize> = all.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_exact_match_wins_over_near_duplicates() {
        let resolver = QueryResolver::new(&catalog(&[
            "Vaathi Raid (Remix)",
            "Vaathi Raid",
            "Vaathi Raids",
        ]));
        // the first row also scores 1.0 through its "vaathi raid" window
        let best = resolver.resolve("  VAATHI RAID ").unwrap();
        assert_eq!(best.index, 1);
        assert!(best.exact);
        assert_eq!(best.score, 1.0);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first_row() {
        let resolver = QueryResolver::new(&catalog(&["Kutti Story", "Master", "Kutti Story"]));
        assert_eq!(resolver.resolve("kutti story").unwrap().index, 0);
    }

    #[test]
    fn test_close_spelling() {
        let resolver = QueryResolver::new(&catalog(&["Rowdy Baby", "Kutti Story", "Kaavaalaa"]));
        let best = resolver.resolve("kutty story").unwrap();
        assert_eq!(best.index, 1);
        assert!(best.score > 0.9);
    }

    #[test]
    fn test_unrelated_query_is_not_found() {
        let resolver = QueryResolver::new(&catalog(&[
            "Vaathi Coming",
            "Rowdy Baby",
            "Kutti Story",
        ]));
        let err = resolver.resolve("qzxwv").unwrap_err();
        assert!(err.is_not_found());
        assert!(resolver.candidates("xyzzy plugh").unwrap().is_empty());
    }

    #[test]
    fn test_blank_query_is_invalid() {
        let resolver = QueryResolver::new(&catalog(&["Kaavaalaa"]));
        assert!(matches!(resolver.resolve("   "), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_candidates_capped() {
        let names = [
            "Naatu Naatu",
            "Naatu Koothu",
            "Naatu Beat",
            "Naatu Song",
            "Naatu Remix",
            "Naatu Live",
            "Naatu Again",
        ];
        let resolver = QueryResolver::new(&catalog(&names));
        let found = resolver.candidates("naatu").unwrap();
        assert_eq!(found.len(), MAX_CANDIDATES);
        assert!(found.iter().all(|c| c.score >= MATCH_CUTOFF));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        assert!(passes_cutoff(MATCH_CUTOFF));
        assert!(passes_cutoff(1.0));
        assert!(!passes_cutoff(MATCH_CUTOFF - 1e-9));
        assert!(!passes_cutoff(0.0));
    }

    #[test]
    fn test_candidates_at_cutoff_boundary() {
        // 7 edits over 10 characters scores 3/10; 5 over 7 scores 2/7
        let resolver = QueryResolver::new(&catalog(&["abcxxxxxxx", "abxxxxxxxx"]));
        let at_cutoff = resolver.candidates("abcdefghij").unwrap();
        assert_eq!(at_cutoff.len(), 1);
        assert_eq!(at_cutoff[0].index, 0);
        assert!((at_cutoff[0].score - MATCH_CUTOFF).abs() < 1e-12);

        let below = QueryResolver::new(&catalog(&["abxxxxx"]));
        assert!((match_score("abcdefg", "abxxxxx") - 2.0 / 7.0).abs() < 1e-12);
        assert!(below.candidates("abcdefg").unwrap().is_empty());
        assert!(below.resolve("abcdefg").unwrap_err().is_not_found());
    }

    #[test]
    fn test_match_score_partial_window() {
        assert!((match_score("vathi", "vaathi coming") - 0.8).abs() < 1e-12);
        assert_eq!(match_score("rowdy", "rowdy baby"), 1.0);
        assert_eq!(match_score("kaavaalaa", "kaavaalaa"), 1.0);
        assert!(match_score("qzxwv", "rowdy baby") < MATCH_CUTOFF);
    }

    #[test]
    fn test_suggest() {
        let resolver = QueryResolver::new(&catalog(&[
            "Vaathi Raid",
            "Vaathi Coming",
            "Arabic Kuthu",
            "Vaathi Coming",
        ]));
        assert_eq!(
            resolver.suggest("VAATHI", 10),
            vec!["Vaathi Coming".to_string(), "Vaathi Raid".to_string()]
        );
        assert_eq!(resolver.suggest("vaathi", 1), vec!["Vaathi Coming".to_string()]);
        assert!(resolver.suggest("", 5).is_empty());
        assert!(resolver.suggest("melody", 5).is_empty());
    }
}
