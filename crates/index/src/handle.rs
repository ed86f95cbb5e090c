use std::sync::{Arc, RwLock};

use tracing::info;

use crate::CorpusStore;

/// Shared, swappable reference to the current [`CorpusStore`].
///
/// The read lock is held only long enough to clone the inner `Arc`; searches
/// run on the snapshot without any lock. [`CorpusHandle::publish`] replaces
/// the whole store in one step, so a reader sees either the old store or the
/// new one, never a mix.
#[derive(Debug, Default)]
pub struct CorpusHandle {
    current: RwLock<Arc<CorpusStore>>,
}

impl CorpusHandle {
    pub fn new(store: CorpusStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    pub fn snapshot(&self) -> Arc<CorpusStore> {
        self.current
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Swaps in `store` and returns the one it replaced.
    pub fn publish(&self, store: CorpusStore) -> Arc<CorpusStore> {
        let next = Arc::new(store);
        let entries = next.len();
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(|p| p.into_inner());
            std::mem::replace(&mut *guard, next)
        };
        info!(entries, previous_entries = previous.len(), "corpus_published");
        previous
    }

    pub fn is_loaded(&self) -> bool {
        !self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::entry;

    #[test]
    fn default_handle_is_empty() {
        let handle = CorpusHandle::default();
        assert!(!handle.is_loaded());
        assert!(handle.snapshot().is_empty());
    }

    #[test]
    fn old_snapshot_survives_publish() {
        let handle = CorpusHandle::new(
            CorpusStore::build(vec![entry("first", "x")], vec![vec![1.0]]).unwrap(),
        );
        let before = handle.snapshot();

        let replaced = handle.publish(
            CorpusStore::build(
                vec![entry("a", "x"), entry("b", "x")],
                vec![vec![1.0], vec![1.0]],
            )
            .unwrap(),
        );

        assert_eq!(before.len(), 1);
        assert!(Arc::ptr_eq(&before, &replaced));
        assert_eq!(handle.snapshot().len(), 2);
        assert_eq!(before.search(&[1.0], 5).unwrap()[0].entry.symptom_title, "first");
    }

    #[test]
    fn concurrent_readers_see_whole_stores() {
        let handle = Arc::new(CorpusHandle::new(
            CorpusStore::build(vec![entry("a", "x")], vec![vec![1.0]]).unwrap(),
        ));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let len = handle.snapshot().len();
                        assert!(len == 1 || len == 3);
                    }
                })
            })
            .collect();

        for _ in 0..50 {
            handle.publish(
                CorpusStore::build(
                    vec![entry("a", "x"), entry("b", "x"), entry("c", "x")],
                    vec![vec![1.0], vec![1.0], vec![1.0]],
                )
                .unwrap(),
            );
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
