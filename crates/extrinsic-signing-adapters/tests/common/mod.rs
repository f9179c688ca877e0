#![allow(dead_code)]

use std::sync::Arc;

use alloy::primitives::Bytes;

use extrinsic_signing_adapters::{
    AccountsAdapter, DevChainAdapter, DevChainConfig, ExtensionAdapter, HardwareAdapter,
    NotificationAdapter, PendingAdapter, ProxyAdapter,
};
use extrinsic_signing_core::{
    Account, AccountId, Call, CallArg, Delegation, ManualDevice, Orchestrator, PendingKey,
    ProxyType, SigningSource, SubmissionSession, SubmitterConfig,
};

pub const EXTENSION: &str = "polkadot-js";

pub type TestOrchestrator = Orchestrator<
    DevChainAdapter,
    ExtensionAdapter,
    AccountsAdapter,
    ProxyAdapter,
    NotificationAdapter,
    PendingAdapter,
    HardwareAdapter,
>;

pub type TestSession = SubmissionSession<
    DevChainAdapter,
    ExtensionAdapter,
    AccountsAdapter,
    ProxyAdapter,
    NotificationAdapter,
    PendingAdapter,
    HardwareAdapter,
>;

pub fn stash() -> AccountId {
    AccountId::from("15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5")
}

pub fn controller() -> AccountId {
    AccountId::from("14E5nqKAp3oAJcmzgZhUD2RcptBeUBScxKHgJKU4HPNcKVf3")
}

pub fn ledger() -> AccountId {
    AccountId::from("13UVJyLnbVp9RBZYFwFGyDvVd1y27Tt8tkntv6Q7JVPhFsTB")
}

pub fn vault() -> AccountId {
    AccountId::from("12xtAYsRUrmbniiWQqJtECiBQrMn8AypQcXhnQAc6RB6XkLW")
}

pub fn watcher() -> AccountId {
    AccountId::from("16ZL8yLyXv3V3L3z9ofR1ovFLziyXaN1DPq4yffMAZ9czzBD")
}

pub fn accounts() -> AccountsAdapter {
    AccountsAdapter::default()
        .with_account(Account::new(
            stash(),
            SigningSource::Extension(EXTENSION.to_owned()),
        ))
        .with_account(Account::new(
            controller(),
            SigningSource::Extension(EXTENSION.to_owned()),
        ))
        .with_account(Account::new(
            ledger(),
            SigningSource::Manual(ManualDevice::Ledger),
        ))
        .with_account(Account::new(vault(), SigningSource::Manual(ManualDevice::Vault)))
        .with_account(Account::new(watcher(), SigningSource::ReadOnly))
}

pub fn new_orchestrator() -> Arc<TestOrchestrator> {
    new_orchestrator_with(SubmitterConfig::default())
}

pub fn new_orchestrator_with(config: SubmitterConfig) -> Arc<TestOrchestrator> {
    let extensions = ExtensionAdapter::default();
    extensions.install_enabled(EXTENSION);
    Arc::new(
        Orchestrator::new(
            DevChainAdapter::with_config(DevChainConfig::default()),
            extensions,
            accounts(),
            ProxyAdapter::default(),
            NotificationAdapter::default(),
            PendingAdapter::default(),
            HardwareAdapter::default(),
        )
        .with_config(config),
    )
}

pub fn staking_delegation() -> Delegation {
    Delegation {
        delegator: stash(),
        delegate: controller(),
        proxy_type: ProxyType::Staking,
    }
}

pub fn bond_extra(amount: u128) -> Call {
    Call::new("staking", "bond_extra").arg(CallArg::Balance(amount))
}

pub fn transfer(amount: u128) -> Call {
    Call::new("balances", "transfer_keep_alive")
        .arg(CallArg::Account(watcher()))
        .arg(CallArg::Balance(amount))
}

pub fn key(sender: AccountId, nonce: u64) -> PendingKey {
    PendingKey { sender, nonce }
}

pub fn signature_bytes(seed: u8) -> Bytes {
    Bytes::from(vec![seed; 64])
}
