use serde::Serialize;

pub mod error;
pub mod filter;
pub mod index;
pub mod loader;
pub mod ranker;
pub mod record;
pub mod shared;
pub mod tokenizer;

pub use error::{EngineError, Result};
pub use filter::Filters;
pub use index::InvertedIndex;
pub use ranker::{query, Hit, BM25_B, BM25_K1, DEFAULT_LIMIT};
pub use record::RawRecord;
pub use shared::SharedIndex;

pub type TermId = u32;
pub type DocId = u32;

/// A normalized catalog item. Everything except `name` and `description` is
/// returned to callers untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub doc_id: DocId,
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub brand_store: Option<String>,
    pub material: Option<String>,
    pub sizes: Vec<String>,
    pub image_urls: Vec<String>,
    pub data_source: Option<String>,
}

impl Document {
    /// Text fed to the tokenizer: non-empty `name` and `description` joined by a space.
    pub fn indexed_text(&self) -> String {
        match (self.name.is_empty(), self.description.is_empty()) {
            (false, false) => format!("{} {}", self.name, self.description),
            (false, true) => self.name.clone(),
            (true, false) => self.description.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}
