//! BM25 ranking with hard filters.

use crate::error::{EngineError, Result};
use crate::filter::Filters;
use crate::index::InvertedIndex;
use crate::tokenizer::tokenize;
use crate::{DocId, Document, Posting};
use serde::Serialize;
use std::cmp::Ordering;

/// Term-frequency saturation.
pub const BM25_K1: f32 = 1.2;
/// Document-length normalization strength.
pub const BM25_B: f32 = 0.75;
/// Results returned when the caller gives no limit.
pub const DEFAULT_LIMIT: usize = 20;

/// A ranked result borrowing its document from the index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit<'a> {
    #[serde(rename = "item")]
    pub document: &'a Document,
    pub score: f32,
}

/// Inverse document frequency: `ln((N - df + 0.5) / (df + 0.5) + 1)`.
pub fn idf(num_docs: u32, df: u32) -> f32 {
    let n = num_docs as f32;
    let df = df as f32;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// Contribution of one query term to one document's score.
pub fn term_score(idf: f32, tf: u32, doc_length: u32, avg_doc_length: f32) -> f32 {
    let tf = tf as f32;
    let norm = if avg_doc_length > 0.0 {
        1.0 - BM25_B + BM25_B * (doc_length as f32 / avg_doc_length)
    } else {
        1.0
    };
    idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm)
}

/// Rank documents for `text` under `filters`, returning at most `limit` hits
/// (default [`DEFAULT_LIMIT`]).
///
/// An empty query (no terms after tokenization) returns every document that
/// passes the filters with score 1. A query whose terms match nothing returns
/// no hits. Equal scores are ordered by ascending doc id.
pub fn query<'a>(index: &'a InvertedIndex, text: &str, filters: &Filters, limit: Option<usize>) -> Result<Vec<Hit<'a>>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return Err(EngineError::invalid_argument("limit must be a positive integer"));
    }
    let filters = filters.compile()?;
    let terms = tokenize(text);

    let mut scored: Vec<(DocId, f32)> = if terms.is_empty() {
        index
            .documents()
            .iter()
            .filter(|doc| filters.matches(doc))
            .map(|doc| (doc.doc_id, 1.0))
            .collect()
    } else {
        // each query occurrence contributes, so repeated terms weigh more
        let n = index.num_docs();
        let resolved: Vec<(&[Posting], f32)> = terms
            .iter()
            .filter_map(|t| index.postings(t))
            .map(|p| (p, idf(n, p.len() as u32)))
            .collect();

        let mut candidates: Vec<DocId> = resolved.iter().flat_map(|(p, _)| p.iter().map(|posting| posting.doc_id)).collect();
        candidates.sort_unstable();
        candidates.dedup();
        if candidates.is_empty() {
            tracing::debug!(terms = terms.len(), "no candidates");
            return Ok(Vec::new());
        }

        let avgdl = index.avg_doc_length();
        candidates
            .into_iter()
            .filter_map(|doc_id| {
                let doc = index.document(doc_id)?;
                if !filters.matches(doc) {
                    return None;
                }
                let dl = index.doc_length(doc_id).unwrap_or(0);
                let score: f32 = resolved
                    .iter()
                    .filter_map(|(postings, idf)| {
                        let i = postings.binary_search_by_key(&doc_id, |p| p.doc_id).ok()?;
                        Some(term_score(*idf, postings[i].tf, dl, avgdl))
                    })
                    .sum();
                Some((doc_id, score))
            })
            .collect()
    };

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
    let total_hits = scored.len();
    scored.truncate(limit);
    tracing::debug!(terms = terms.len(), total_hits, returned = scored.len(), "ranked query");

    Ok(scored
        .into_iter()
        .filter_map(|(doc_id, score)| index.document(doc_id).map(|document| Hit { document, score }))
        .collect())
}
