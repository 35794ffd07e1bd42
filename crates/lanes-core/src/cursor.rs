use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared hand-out counter for task indices.
///
/// Each successful [`Cursor::claim`] returns a distinct index below `len`, so every
/// index is claimed exactly once no matter how many lanes race on it.
#[derive(Debug, Default)]
pub struct Cursor {
    next: AtomicUsize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next unclaimed index, or `None` once all `len` indices are taken.
    pub fn claim(&self, len: usize) -> Option<usize> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < len).then_some(next + 1)
            })
            .ok()
    }

    /// Number of indices handed out so far.
    pub fn claimed(&self) -> usize {
        self.next.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, sync::Arc, thread};

    #[test]
    fn hands_out_indices_in_order_then_stops() {
        let cursor = Cursor::new();
        assert_eq!(cursor.claim(3), Some(0));
        assert_eq!(cursor.claim(3), Some(1));
        assert_eq!(cursor.claim(3), Some(2));
        assert_eq!(cursor.claim(3), None);
        assert_eq!(cursor.claim(3), None);
        assert_eq!(cursor.claimed(), 3);
    }

    #[test]
    fn empty_list_yields_nothing() {
        let cursor = Cursor::new();
        assert_eq!(cursor.claim(0), None);
        assert_eq!(cursor.claimed(), 0);
    }

    #[test]
    fn concurrent_claims_are_unique() {
        const LEN: usize = 10_000;
        let cursor = Arc::new(Cursor::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cursor = Arc::clone(&cursor);
                thread::spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(i) = cursor.claim(LEN) {
                        mine.push(i);
                    }
                    mine
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for i in handle.join().unwrap() {
                assert!(seen.insert(i), "index {i} claimed twice");
            }
        }
        assert_eq!(seen.len(), LEN);
        assert_eq!(cursor.claimed(), LEN);
    }
}
