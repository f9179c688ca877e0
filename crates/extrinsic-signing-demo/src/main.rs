use std::sync::Arc;

use extrinsic_signing_adapters::{
    AccountsAdapter, DeterministicSigner, DevChainAdapter, ExtensionAdapter, HardwareAdapter,
    NotificationAdapter, PendingAdapter, ProxyAdapter,
};
use extrinsic_signing_core::{
    Account, AccountId, Call, CallArg, Delegation, ManualDevice, Orchestrator, ProxyType,
    SigningSource, SubmitOptions, SubmitterConfig,
};

const EXTENSION: &str = "polkadot-js";

type DemoOrchestrator = Orchestrator<
    DevChainAdapter,
    ExtensionAdapter,
    AccountsAdapter,
    ProxyAdapter,
    NotificationAdapter,
    PendingAdapter,
    HardwareAdapter,
>;

fn build_orchestrator(
    stash: &AccountId,
    controller: &AccountId,
    ledger: &AccountId,
) -> DemoOrchestrator {
    let extensions = ExtensionAdapter::default();
    extensions.install(EXTENSION);

    let accounts = AccountsAdapter::default()
        .with_account(Account::new(
            stash.clone(),
            SigningSource::Extension(EXTENSION.to_owned()),
        ))
        .with_account(Account::new(
            controller.clone(),
            SigningSource::Extension(EXTENSION.to_owned()),
        ))
        .with_account(Account::new(
            ledger.clone(),
            SigningSource::Manual(ManualDevice::Ledger),
        ));

    let proxies = ProxyAdapter::default().with_delegation(Delegation {
        delegator: stash.clone(),
        delegate: controller.clone(),
        proxy_type: ProxyType::Staking,
    });

    Orchestrator::new(
        DevChainAdapter::default(),
        extensions,
        accounts,
        proxies,
        NotificationAdapter::default(),
        PendingAdapter::default(),
        HardwareAdapter::default(),
    )
    .with_config(SubmitterConfig::from_env())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting extrinsic-signing demo");

    let stash = AccountId::from("15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5");
    let controller = AccountId::from("14E5nqKAp3oAJcmzgZhUD2RcptBeUBScxKHgJKU4HPNcKVf3");
    let ledger = AccountId::from("13UVJyLnbVp9RBZYFwFGyDvVd1y27Tt8tkntv6Q7JVPhFsTB");
    let orch = Arc::new(build_orchestrator(&stash, &controller, &ledger));

    // Proxied: stash -> controller.
    let bond_extra = Call::new("staking", "bond_extra").arg(CallArg::Balance(25_000_000_000));
    let proxied = orch
        .create(
            bond_extra,
            SubmitOptions::for_account(stash.clone())
                .on_submitted(|| tracing::info!("proxied bond_extra is pending")),
        )
        .await;
    tracing::info!(
        sender = ?proxied.effective_sender(),
        fee = proxied.fee(),
        "prepared proxied submission"
    );
    let outcome = proxied.submit().await?;
    tracing::info!(?outcome, "proxied submission settled");
    println!("{}", serde_json::to_string_pretty(&proxied.snapshot())?);

    // Manual: the payload is handed to the device, the signature comes back as data.
    orch.hardware
        .begin_signing(ManualDevice::Ledger, "0x9000", "Review transaction on device");
    let nominate = Call::new("staking", "nominate").arg(CallArg::Account(AccountId::from(
        "16SpacegeUTft9v3ts27CEC3tJaxgvE4uZeCctThFH3Vb24p",
    )));
    let manual = orch
        .create(nominate, SubmitOptions::for_account(ledger.clone()))
        .await;
    let payload = manual
        .payload()
        .ok_or_else(|| eyre::eyre!("no signing payload built for {ledger}"))?;
    manual.set_signature(Some(DeterministicSigner::signature_for("ledger", &payload)));
    let outcome = manual.submit().await?;
    tracing::info!(?outcome, resets = orch.hardware.resets().len(), "manual submission settled");
    println!("{}", serde_json::to_string_pretty(&manual.snapshot())?);

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "submitted": orch.chain.submitted(),
            "notifications": orch.notifications.sent(),
            "pending": orch.pending.keys(),
        }))?
    );
    Ok(())
}
