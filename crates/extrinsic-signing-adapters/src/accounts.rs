use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use extrinsic_signing_core::{Account, AccountId, AccountsPort};

#[derive(Debug, Clone, Default)]
pub struct AccountsAdapter {
    accounts: Arc<Mutex<BTreeMap<AccountId, Account>>>,
}

impl AccountsAdapter {
    pub fn with_account(self, account: Account) -> Self {
        self.insert(account);
        self
    }

    pub fn insert(&self, account: Account) {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.address.clone(), account);
    }

    pub fn remove(&self, address: &AccountId) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(address)
    }
}

impl AccountsPort for AccountsAdapter {
    fn account(&self, address: &AccountId) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }
}
