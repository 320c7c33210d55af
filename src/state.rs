//! Observable state containers.
//!
//! A [`StateCell`] holds one value, replaces it wholesale on every update, and notifies every
//! subscriber. Renderers subscribe and re-project the view whenever a cell changes.

use tokio::sync::watch;

/// Update-and-notify container for a single piece of flow state.
#[derive(Debug)]
pub struct StateCell<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> StateCell<T> {
    /// Create a cell holding `initial`.
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Replace the value and notify subscribers. Never merges with the previous value.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Receiver that observes every subsequent update.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
