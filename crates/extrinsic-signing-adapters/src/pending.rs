use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

use extrinsic_signing_core::{PendingKey, PendingPort};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PendingOp {
    Added(PendingKey),
    Removed(PendingKey),
}

/// Process-wide set of in-flight `(sender, nonce)` keys, with the history of
/// operations applied to it.
#[derive(Debug, Clone, Default)]
pub struct PendingAdapter {
    state: Arc<Mutex<PendingState>>,
}

#[derive(Debug, Default)]
struct PendingState {
    keys: BTreeSet<PendingKey>,
    history: Vec<PendingOp>,
}

impl PendingAdapter {
    fn state(&self) -> MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn keys(&self) -> Vec<PendingKey> {
        self.state().keys.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.state().keys.is_empty()
    }

    pub fn history(&self) -> Vec<PendingOp> {
        self.state().history.clone()
    }
}

impl PendingPort for PendingAdapter {
    fn add(&self, key: PendingKey) {
        let mut state = self.state();
        if state.keys.insert(key.clone()) {
            debug!(%key, "pending nonce added");
            state.history.push(PendingOp::Added(key));
        }
    }

    fn remove(&self, key: &PendingKey) {
        let mut state = self.state();
        if state.keys.remove(key) {
            debug!(%key, "pending nonce removed");
            state.history.push(PendingOp::Removed(key.clone()));
        }
    }

    fn contains(&self, key: &PendingKey) -> bool {
        self.state().keys.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use extrinsic_signing_core::{AccountId, PendingKey, PendingPort};

    use super::{PendingAdapter, PendingOp};

    #[test]
    fn removing_absent_key_is_a_no_op() {
        let pending = PendingAdapter::default();
        let key = PendingKey {
            sender: AccountId::from("alice"),
            nonce: 3,
        };
        pending.remove(&key);
        assert!(pending.history().is_empty());

        pending.add(key.clone());
        pending.add(key.clone());
        assert!(pending.contains(&key));
        pending.remove(&key);
        assert!(pending.is_empty());
        assert_eq!(
            pending.history(),
            vec![PendingOp::Added(key.clone()), PendingOp::Removed(key)]
        );
    }
}
