use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use extrinsic_signing_core::{AccountId, Delegation, ProxyPort};

/// At most one active delegate per delegator; setting a new one replaces the old.
#[derive(Debug, Clone, Default)]
pub struct ProxyAdapter {
    delegations: Arc<Mutex<BTreeMap<AccountId, Delegation>>>,
}

impl ProxyAdapter {
    pub fn with_delegation(self, delegation: Delegation) -> Self {
        self.set_delegate(delegation);
        self
    }

    pub fn set_delegate(&self, delegation: Delegation) {
        debug!(
            delegator = %delegation.delegator,
            delegate = %delegation.delegate,
            proxy_type = ?delegation.proxy_type,
            "delegate set"
        );
        self.delegations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(delegation.delegator.clone(), delegation);
    }

    pub fn clear(&self, delegator: &AccountId) {
        self.delegations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(delegator);
    }
}

impl ProxyPort for ProxyAdapter {
    fn active_delegate(&self, delegator: &AccountId) -> Option<Delegation> {
        self.delegations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(delegator)
            .cloned()
    }
}
