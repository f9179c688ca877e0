mod common;

use extrinsic_signing_core::{SubmitOptions, SubmitterConfig};

use common::{bond_extra, new_orchestrator, new_orchestrator_with, stash, transfer, vault};

#[tokio::test]
async fn equal_estimate_does_not_change_state() {
    let orch = new_orchestrator();
    orch.chain.set_fee(Some(500));
    let session = orch
        .create(bond_extra(1), SubmitOptions::for_account(stash()))
        .await;
    assert_eq!(session.fee(), 500);
    let revision = session.revision();

    session.prepare().await;
    assert_eq!(orch.chain.payment_info_calls(), 2);
    assert_eq!(session.revision(), revision);

    orch.chain.set_fee(Some(600));
    session.prepare().await;
    assert_eq!(session.fee(), 600);
    assert_eq!(session.revision(), revision + 1);
}

#[tokio::test]
async fn failed_estimate_keeps_the_previous_fee() {
    let orch = new_orchestrator();
    orch.chain.set_fee(Some(500));
    let session = orch
        .create(bond_extra(1), SubmitOptions::for_account(stash()))
        .await;
    let revision = session.revision();

    orch.chain.set_fee_failure(Some("payment_queryInfo unavailable"));
    session.prepare().await;
    assert_eq!(session.fee(), 500);
    assert_eq!(session.revision(), revision);
}

#[tokio::test]
async fn fee_follows_the_encoded_call() {
    let orch = new_orchestrator();
    let session = orch
        .create(bond_extra(1), SubmitOptions::for_account(stash()))
        .await;
    let expected = orch.chain.config().fee_for(bond_extra(1).encoded().len());
    assert_eq!(session.fee(), expected);

    assert!(!session.update(bond_extra(1), Some(stash())).await);
    assert_eq!(orch.chain.payment_info_calls(), 1);

    assert!(session.update(transfer(1), Some(stash())).await);
    assert_eq!(orch.chain.payment_info_calls(), 2);
    assert_eq!(
        session.fee(),
        orch.chain.config().fee_for(transfer(1).encoded().len())
    );
}

#[tokio::test]
async fn estimation_can_be_switched_off() {
    let orch = new_orchestrator_with(SubmitterConfig {
        fee_estimation: false,
        ..SubmitterConfig::default()
    });
    let session = orch
        .create(bond_extra(1), SubmitOptions::for_account(stash()))
        .await;
    assert_eq!(session.fee(), 0);
    assert_eq!(orch.chain.payment_info_calls(), 0);
}

#[tokio::test]
async fn superseded_preparation_never_lands() {
    // (older update's fee delay, newer update's fee delay)
    for (older, newer) in [(8, 0), (3, 3)] {
        let orch = new_orchestrator();
        let session = orch
            .create(bond_extra(1), SubmitOptions::for_account(vault()))
            .await;
        orch.chain.push_fee_delay(older);
        orch.chain.push_fee_delay(newer);

        let (first, second) = tokio::join!(
            session.update(bond_extra(2), Some(vault())),
            session.update(transfer(3), Some(vault())),
        );
        assert!(first && second);

        assert_eq!(session.call(), transfer(3));
        assert_eq!(
            session.fee(),
            orch.chain.config().fee_for(transfer(3).encoded().len())
        );
        let payload = session.payload().expect("payload for the newer call");
        assert_eq!(payload.call_hash, transfer(3).hash());
        assert_eq!(payload.call_data, transfer(3).encoded());
    }
}
