use crate::index::InvertedIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Process-wide handle to the current index.
///
/// Readers take a snapshot with [`SharedIndex::current`] and query it without
/// holding any lock. A rebuild swaps in a new index; queries already running
/// keep the snapshot they started with.
#[derive(Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<Arc<InvertedIndex>>>,
}

impl SharedIndex {
    pub fn new(index: InvertedIndex) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(index))) }
    }

    pub fn current(&self) -> Arc<InvertedIndex> { self.inner.read().clone() }

    /// Replace the index wholesale, returning the previous one.
    pub fn replace(&self, index: InvertedIndex) -> Arc<InvertedIndex> {
        std::mem::replace(&mut *self.inner.write(), Arc::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;

    #[test]
    fn snapshots_survive_replace() {
        let shared = SharedIndex::new(InvertedIndex::build(vec![RawRecord::new().name("Old Coat")]).unwrap());
        let before = shared.current();
        let old = shared.replace(InvertedIndex::build(vec![RawRecord::new().name("New Coat"), RawRecord::new()]).unwrap());
        assert!(Arc::ptr_eq(&before, &old));
        assert_eq!(before.num_docs(), 1);
        assert_eq!(shared.current().num_docs(), 2);
    }

    #[test]
    fn clones_share_the_same_slot() {
        let a = SharedIndex::new(InvertedIndex::new());
        let b = a.clone();
        a.replace(InvertedIndex::build(vec![RawRecord::new()]).unwrap());
        assert_eq!(b.current().num_docs(), 1);
    }
}
