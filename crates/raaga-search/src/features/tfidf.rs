use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use raaga_core::{Error, Result};

use crate::text;
use crate::vector::SparseVector;

/// TF-IDF vectorizer fit on the catalog's own documents.
///
/// ```text
/// tfidf(t, d) = count(t, d) × idf(t)
/// idf(t)      = ln((1 + n) / (1 + df(t))) + 1
/// ```
///
/// Every output vector is L2-normalized. Terms are indexed in lexicographic
/// order, so the same documents always produce the same vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, u32>,
    idf: Vec<f64>,
    stop_words: bool,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights.
    ///
    /// # Errors
    /// `FeatureBuild` if no document contains a single token.
    pub fn fit<S: AsRef<str>>(documents: &[S], stop_words: bool) -> Result<Self> {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let terms: BTreeSet<String> = Self::tokens(doc.as_ref(), stop_words)
                .into_iter()
                .collect();
            for term in terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(Error::FeatureBuild(
                "empty vocabulary: every text field in the catalog is empty".to_string(),
            ));
        }

        #[allow(clippy::cast_precision_loss)]
        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (position, (term, df)) in doc_freq.into_iter().enumerate() {
            let index = u32::try_from(position)
                .map_err(|_| Error::FeatureBuild("vocabulary exceeds u32 terms".to_string()))?;
            vocabulary.insert(term, index);
            #[allow(clippy::cast_precision_loss)]
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        Ok(Self {
            vocabulary,
            idf,
            stop_words,
        })
    }

    /// Vectorize one document. Terms outside the vocabulary are ignored, so
    /// a document sharing nothing with the catalog yields the zero vector.
    #[must_use]
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for token in Self::tokens(document, self.stop_words) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        SparseVector::from_sorted(
            counts
                .into_iter()
                .map(|(index, tf)| (index, tf * self.idf[index as usize])),
        )
        .l2_normalized()
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    #[must_use]
    pub fn vocabulary(&self) -> &BTreeMap<String, u32> {
        &self.vocabulary
    }

    /// IDF weight of a term, if it is in the vocabulary.
    #[must_use]
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary
            .get(term)
            .map(|&index| self.idf[index as usize])
    }

    fn tokens(document: &str, stop_words: bool) -> Vec<String> {
        if stop_words {
            text::tokenize_without_stop_words(document)
        } else {
            text::tokenize(document)
        }
    }
}
