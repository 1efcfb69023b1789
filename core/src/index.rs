use crate::error::{EngineError, Result};
use crate::record::{records_from_value, RawRecord};
use crate::tokenizer::tokenize;
use crate::{DocId, Document, Posting, TermId};
use std::collections::HashMap;

/// Immutable inverted index over a catalog.
///
/// Built once with [`InvertedIndex::build`]; there is no update path. Rebuilds
/// produce a new value (see [`crate::SharedIndex`]).
#[derive(Debug, Default, PartialEq)]
pub struct InvertedIndex {
    dictionary: HashMap<String, TermId>,
    postings: Vec<Vec<Posting>>, // by term id, each sorted by doc_id
    docs: Vec<Document>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f32,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Build an index from records in input order. Record `i` gets doc id `i`.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut postings: Vec<Vec<Posting>> = Vec::new();
        let mut docs: Vec<Document> = Vec::new();
        let mut doc_lengths: Vec<u32> = Vec::new();

        for (pos, record) in records.into_iter().enumerate() {
            let doc_id = DocId::try_from(pos)
                .map_err(|_| EngineError::malformed(format!("catalog exceeds {} records", DocId::MAX)))?;
            let doc = record.into_document(doc_id);

            let tokens = tokenize(&doc.indexed_text());
            doc_lengths.push(tokens.len() as u32);

            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in tokens {
                let next_id = postings.len() as TermId;
                let tid = *dictionary.entry(term).or_insert_with(|| {
                    postings.push(Vec::new());
                    next_id
                });
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            // doc ids only grow, so every posting list stays sorted
            for (tid, tf) in tf_counts {
                postings[tid as usize].push(Posting { doc_id, tf });
            }
            docs.push(doc);
        }

        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            let total: u64 = doc_lengths.iter().map(|&l| l as u64).sum();
            (total as f64 / doc_lengths.len() as f64) as f32
        };

        tracing::info!(num_docs = docs.len(), num_terms = dictionary.len(), avg_doc_length, "built inverted index");
        Ok(Self { dictionary, postings, docs, doc_lengths, avg_doc_length })
    }

    /// Build from a parsed JSON catalog (an array of record objects).
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Self::build(records_from_value(value)?)
    }

    pub fn num_docs(&self) -> u32 { self.docs.len() as u32 }
    pub fn num_terms(&self) -> usize { self.dictionary.len() }
    pub fn avg_doc_length(&self) -> f32 { self.avg_doc_length }
    pub fn documents(&self) -> &[Document] { &self.docs }
    pub fn document(&self, doc_id: DocId) -> Option<&Document> { self.docs.get(doc_id as usize) }
    pub fn doc_length(&self, doc_id: DocId) -> Option<u32> { self.doc_lengths.get(doc_id as usize).copied() }

    /// Posting list for `term`, sorted by doc id. `None` if no document contains it.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        let tid = *self.dictionary.get(term)?;
        Some(&self.postings[tid as usize])
    }

    /// Number of documents containing `term`.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.postings(term).map_or(0, |p| p.len() as u32)
    }

    /// Occurrences of `term` in document `doc_id`; 0 when absent.
    pub fn term_frequency(&self, term: &str, doc_id: DocId) -> u32 {
        self.postings(term)
            .and_then(|p| p.binary_search_by_key(&doc_id, |posting| posting.doc_id).ok().map(|i| p[i].tf))
            .unwrap_or(0)
    }

    /// Iterate over `(term, postings)` pairs in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[Posting])> + '_ {
        self.dictionary
            .iter()
            .map(|(term, &tid)| (term.as_str(), self.postings[tid as usize].as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> InvertedIndex {
        InvertedIndex::build(vec![
            RawRecord::new().name("Black Leather Jacket").description("black leather, a classic"),
            RawRecord::new().name("Blue Jeans"),
            RawRecord::new(),
        ])
        .unwrap()
    }

    #[test]
    fn assigns_dense_doc_ids() {
        let idx = sample();
        assert_eq!(idx.num_docs(), 3);
        for (i, d) in idx.documents().iter().enumerate() {
            assert_eq!(d.doc_id as usize, i);
        }
    }

    #[test]
    fn counts_term_frequencies() {
        let idx = sample();
        assert_eq!(idx.term_frequency("black", 0), 2);
        assert_eq!(idx.term_frequency("leather", 0), 2);
        assert_eq!(idx.term_frequency("jacket", 0), 1);
        assert_eq!(idx.term_frequency("black", 1), 0);
        assert_eq!(idx.doc_frequency("blue"), 1);
        assert_eq!(idx.doc_frequency("nothing"), 0);
    }

    #[test]
    fn doc_lengths_count_tokens() {
        let idx = sample();
        // "black leather jacket black leather classic" ("a" dropped)
        assert_eq!(idx.doc_length(0), Some(6));
        assert_eq!(idx.doc_length(1), Some(2));
        assert_eq!(idx.doc_length(2), Some(0));
        assert!((idx.avg_doc_length() - 8.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn no_zero_count_postings() {
        let idx = sample();
        for (term, postings) in idx.terms() {
            assert!(!postings.is_empty(), "{term} has an empty posting list");
            assert!(postings.iter().all(|p| p.tf > 0));
            assert!(postings.windows(2).all(|w| w[0].doc_id < w[1].doc_id));
        }
    }

    #[test]
    fn empty_catalog() {
        let idx = InvertedIndex::build(Vec::new()).unwrap();
        assert_eq!(idx.num_docs(), 0);
        assert_eq!(idx.avg_doc_length(), 0.0);
    }

    #[test]
    fn from_json_rejects_non_array() {
        let err = InvertedIndex::from_json(json!("not a catalog")).unwrap_err();
        assert!(matches!(err, EngineError::MalformedInput(_)));
    }

    #[test]
    fn build_is_idempotent() {
        let catalog = json!([
            {"name": "Red Dress", "description": "summer dress", "price": "30"},
            {"name": "Red Scarf", "price": 12.5, "size": "M"},
        ]);
        let a = InvertedIndex::from_json(catalog.clone()).unwrap();
        let b = InvertedIndex::from_json(catalog).unwrap();
        assert_eq!(a, b);
    }
}
