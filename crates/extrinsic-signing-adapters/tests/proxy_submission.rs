mod common;

use extrinsic_signing_core::proxy::{envelope_real, is_proxy_envelope};
use extrinsic_signing_core::{PendingKey, SubmitOptions, SubmitterConfig};

use common::{
    bond_extra, controller, new_orchestrator, new_orchestrator_with, stash, staking_delegation,
    transfer,
};

#[tokio::test]
async fn delegated_call_is_wrapped_and_signed_by_the_delegate() {
    let orch = new_orchestrator();
    orch.proxies.set_delegate(staking_delegation());

    let session = orch
        .create(bond_extra(10), SubmitOptions::for_account(stash()))
        .await;
    assert_eq!(session.effective_sender(), Some(controller()));
    assert!(session.proxy_supported());
    let call = session.call();
    assert!(is_proxy_envelope(&call));
    assert_eq!(envelope_real(&call), Some(&stash()));
    assert_eq!(call.inner_call(), Some(&bond_extra(10)));

    session.prepare().await;
    assert_eq!(session.call(), call);

    assert!(!session.update(bond_extra(10), Some(stash())).await);
    assert!(session.update(call.clone(), Some(stash())).await);
    assert_eq!(session.call(), call);
    assert_eq!(session.effective_sender(), Some(controller()));
}

#[tokio::test]
async fn delegate_nonce_is_used_for_submission() {
    let orch = new_orchestrator();
    orch.proxies.set_delegate(staking_delegation());
    orch.chain.set_nonce(&controller(), 7);

    let session = orch
        .create(bond_extra(10), SubmitOptions::for_account(stash()))
        .await;
    session.submit().await.expect("submission succeeds");

    let submitted = orch.chain.submitted();
    assert_eq!(submitted[0].sender, controller());
    assert_eq!(submitted[0].nonce, 7);
    assert!(is_proxy_envelope(&submitted[0].call));
    assert_eq!(
        orch.pending.history()[0],
        extrinsic_signing_adapters::PendingOp::Added(PendingKey {
            sender: controller(),
            nonce: 7
        })
    );
}

#[tokio::test]
async fn unsupported_call_goes_out_from_the_delegator() {
    let orch = new_orchestrator();
    orch.proxies.set_delegate(staking_delegation());

    let session = orch
        .create(transfer(5), SubmitOptions::for_account(stash()))
        .await;
    assert_eq!(session.effective_sender(), Some(stash()));
    assert!(!session.proxy_supported());
    assert_eq!(session.call(), transfer(5));
}

#[tokio::test]
async fn removing_the_delegate_unwraps_on_next_preparation() {
    let orch = new_orchestrator();
    orch.proxies.set_delegate(staking_delegation());
    let session = orch
        .create(bond_extra(1), SubmitOptions::for_account(stash()))
        .await;
    assert_eq!(session.effective_sender(), Some(controller()));

    orch.proxies.clear(&stash());
    session.prepare().await;
    assert_eq!(session.effective_sender(), Some(stash()));
    assert_eq!(session.call(), bond_extra(1));
}

#[tokio::test]
async fn wrapping_can_be_switched_off() {
    let orch = new_orchestrator_with(SubmitterConfig {
        proxy_wrapping: false,
        ..SubmitterConfig::default()
    });
    orch.proxies.set_delegate(staking_delegation());

    let session = orch
        .create(bond_extra(1), SubmitOptions::for_account(stash()))
        .await;
    assert_eq!(session.effective_sender(), Some(stash()));
    assert_eq!(session.call(), bond_extra(1));
    assert!(session.proxy_supported());
}
