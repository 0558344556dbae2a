//! Text-term vocabulary with inverse document frequencies.
//!
//! ## Weighting
//! For a description `d` and vocabulary term `t`:
//!
//! ```text
//! tf(t, d)  = occurrences of t in d
//! idf(t)    = ln((1 + n_docs) / (1 + df(t))) + 1
//! w(t, d)   = tf(t, d) * idf(t), then the row is scaled to unit L2 norm
//! ```
//!
//! Terms are lower-cased runs of two or more word characters. Only the
//! `max_terms` terms with the highest document frequency are kept (ties go
//! to the lexically smaller term) and the kept terms are laid out in
//! lexical order, so two fits over the same corpus produce identical
//! columns.

use crate::error::FitError;
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

lazy_static! {
    static ref TOKEN_PATTERN: Regex =
        Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex");
}

/// Split text into lower-cased terms
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Fixed, ordered term list with one IDF weight per term.
///
/// Immutable after [`Vocabulary::fit`]; inference never adds terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Terms in column order (sorted lexically)
    terms: Vec<String>,
    /// IDF weight per term, parallel to `terms`
    idf: Vec<f64>,
    /// Number of documents seen at fit time
    n_documents: usize,
}

impl Vocabulary {
    /// Learn the vocabulary from a training corpus.
    ///
    /// # Errors
    /// - `EmptyCorpus` when `documents` is empty
    /// - `InvalidVocabularySize` when `max_terms` is 0
    /// - `EmptyVocabulary` when no description contains a single term
    pub fn fit<S: AsRef<str> + Sync>(documents: &[S], max_terms: usize) -> Result<Self, FitError> {
        if documents.is_empty() {
            return Err(FitError::EmptyCorpus);
        }
        if max_terms == 0 {
            return Err(FitError::InvalidVocabularySize);
        }

        // Unique terms per document, tokenized in parallel
        let per_document: Vec<HashSet<String>> = documents
            .par_iter()
            .map(|doc| tokenize(doc.as_ref()).into_iter().collect())
            .collect();

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for terms in per_document {
            for term in terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(FitError::EmptyVocabulary {
                documents: documents.len(),
            });
        }

        // Highest document frequency first, lexical order breaks ties
        let mut ranked: Vec<(String, usize)> = doc_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_terms);

        // Column layout is lexical
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n_documents = documents.len();
        let (terms, idf) = ranked
            .into_iter()
            .map(|(term, df)| (term, smoothed_idf(n_documents, df)))
            .unzip();

        let vocabulary = Self {
            terms,
            idf,
            n_documents,
        };
        debug!(
            "Fitted vocabulary: {} terms from {} documents",
            vocabulary.len(),
            n_documents
        );
        Ok(vocabulary)
    }

    /// Number of term columns
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weights in column order
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Column index of a term, if it is in the vocabulary
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }

    /// Write the normalised TF-IDF weights of `text` into `out`.
    ///
    /// `out` must be exactly `self.len()` long and is overwritten.
    /// Terms outside the vocabulary are ignored.
    pub fn encode_into(&self, text: &str, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.len());
        out.fill(0.0);

        for term in tokenize(text) {
            if let Some(idx) = self.index_of(&term) {
                out[idx] += 1.0;
            }
        }

        let mut norm = 0.0;
        for (value, idf) in out.iter_mut().zip(&self.idf) {
            *value *= idf;
            norm += *value * *value;
        }

        if norm > 0.0 {
            let norm = norm.sqrt();
            out.iter_mut().for_each(|v| *v /= norm);
        }
    }

    /// TF-IDF weights of `text` as a fresh vector
    pub fn encode(&self, text: &str) -> Vec<f64> {
        let mut out = vec![0.0; self.len()];
        self.encode_into(text, &mut out);
        out
    }
}

fn smoothed_idf(n_documents: usize, df: usize) -> f64 {
    ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0
}
