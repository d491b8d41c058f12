//! Versioned single-writer state cell

use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Versioned<T> {
    version: u64,
    value: T,
}

/// A value with a monotonically increasing version.
///
/// Every `set` bumps the version, even when the new value equals the old
/// one. Derived values compare versions to decide whether to recompute.
/// Observers can `subscribe` to receive each new value.
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<Versioned<T>>,
}

impl<T: Clone> StateCell<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(Versioned { version: 0, value });
        Self { tx }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().value.clone()
    }

    /// Current version
    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    /// Replace the value and bump the version
    pub fn set(&self, value: T) {
        self.tx.send_modify(|slot| {
            slot.version = slot.version.wrapping_add(1);
            slot.value = value;
        });
    }

    /// Watch for changes to the value
    pub fn subscribe(&self) -> CellReceiver<T> {
        CellReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Read side of a [`StateCell`]
#[derive(Debug, Clone)]
pub struct CellReceiver<T> {
    rx: watch::Receiver<Versioned<T>>,
}

impl<T: Clone> CellReceiver<T> {
    /// Latest value, marking it as seen
    pub fn get(&mut self) -> T {
        self.rx.borrow_and_update().value.clone()
    }

    /// Wait until the cell is set again. Returns `None` once the cell is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.get())
    }
}
