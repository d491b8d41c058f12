//! Memoized derived values keyed by input versions

use tokio::sync::Mutex;

/// Caches the last value computed for a given dependency key.
///
/// The key is usually a tuple of [`StateCell`](super::StateCell) versions.
/// A lookup with a different key misses; the caller recomputes and stores.
#[derive(Debug)]
pub struct Memo<K, T> {
    slot: Mutex<Option<(K, T)>>,
}

impl<K: PartialEq, T: Clone> Memo<K, T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Cached value for `key`, if the last computation used the same key
    pub async fn lookup(&self, key: &K) -> Option<T> {
        let slot = self.slot.lock().await;
        match slot.as_ref() {
            Some((cached, value)) if cached == key => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn store(&self, key: K, value: T) {
        *self.slot.lock().await = Some((key, value));
    }

    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }
}

impl<K: PartialEq, T: Clone> Default for Memo<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_only_on_same_key() {
        let memo: Memo<(u64, u64), &str> = Memo::new();
        assert_eq!(memo.lookup(&(0, 0)).await, None);

        memo.store((1, 2), "signed").await;
        assert_eq!(memo.lookup(&(1, 2)).await, Some("signed"));
        assert_eq!(memo.lookup(&(1, 3)).await, None);

        memo.clear().await;
        assert_eq!(memo.lookup(&(1, 2)).await, None);
    }
}
