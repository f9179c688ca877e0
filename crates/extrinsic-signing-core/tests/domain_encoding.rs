use alloy::primitives::{Bytes, B256};
use extrinsic_signing_core::{
    AccountId, Call, CallArg, ChainEvent, ExtrinsicOutcome, Notification, NotificationKind,
    PendingKey, PortError, SignedExtrinsic, SigningPayload, StatusUpdate, TxStatus,
};

fn payload_for(call: &Call, address: &str, nonce: u64) -> SigningPayload {
    SigningPayload {
        uid: 1,
        address: AccountId::from(address),
        call_data: call.encoded(),
        call_hash: call.hash(),
        nonce,
        tip: 0,
        spec_version: 1_002_000,
        transaction_version: 26,
        genesis_hash: B256::repeat_byte(0x91),
        block_hash: B256::repeat_byte(0x42),
    }
}

#[test]
fn calls_are_equal_by_encoding_including_nested_arguments() {
    let a = Call::new("utility", "batch").arg(CallArg::Calls(vec![
        Call::new("staking", "bond_extra").arg(CallArg::Balance(5)),
    ]));
    let b = Call::new("utility", "batch").arg(CallArg::Calls(vec![
        Call::new("staking", "bond_extra").arg(CallArg::Balance(5)),
    ]));
    let c = Call::new("utility", "batch").arg(CallArg::Calls(vec![
        Call::new("staking", "bond_extra").arg(CallArg::Balance(6)),
    ]));
    assert_eq!(a.hash(), b.hash());
    assert_ne!(a.hash(), c.hash());
    assert_eq!(a.path(), "utility.batch");
}

#[test]
fn payload_digest_covers_nonce() {
    let call = Call::new("staking", "chill");
    let first = payload_for(&call, "alice", 3);
    let second = payload_for(&call, "alice", 4);
    assert_ne!(first.digest(), second.digest());
    assert!(first.signing_bytes().starts_with(&call.encoded()));
}

#[test]
fn signed_extrinsic_rejects_stale_payload() {
    let call = Call::new("staking", "chill");
    let other = Call::new("staking", "nominate").arg(CallArg::Account(AccountId::from("bob")));
    let signature = Bytes::from(vec![7u8; 64]);

    let err = SignedExtrinsic::from_parts(
        other,
        AccountId::from("alice"),
        signature.clone(),
        payload_for(&call, "alice", 0),
    )
    .expect_err("call changed after signing");
    assert!(matches!(err, PortError::Validation(ref msg) if msg.starts_with("STALE_PAYLOAD")));

    let err = SignedExtrinsic::from_parts(
        call.clone(),
        AccountId::from("bob"),
        signature.clone(),
        payload_for(&call, "alice", 0),
    )
    .expect_err("signer changed after signing");
    assert!(err.to_string().contains("STALE_PAYLOAD"));

    let err = SignedExtrinsic::from_parts(
        call.clone(),
        AccountId::from("alice"),
        Bytes::new(),
        payload_for(&call, "alice", 0),
    )
    .expect_err("empty signature");
    assert!(err.to_string().contains("INVALID_SIGNATURE_FORMAT"));

    let extrinsic = SignedExtrinsic::from_parts(
        call.clone(),
        AccountId::from("alice"),
        signature,
        payload_for(&call, "alice", 9),
    )
    .expect("matching payload");
    assert_eq!(extrinsic.nonce(), 9);
}

#[test]
fn first_outcome_marker_wins() {
    let update = StatusUpdate::with_events(
        TxStatus::Finalized(B256::repeat_byte(1)),
        vec![
            ChainEvent::new("balances", "Withdraw"),
            ChainEvent::extrinsic_failed(),
            ChainEvent::extrinsic_success(),
        ],
    );
    assert!(update.is_finalized());
    assert_eq!(update.outcome(), Some(ExtrinsicOutcome::Failed));
    assert_eq!(
        StatusUpdate::new(TxStatus::Finalized(B256::ZERO)).outcome(),
        None
    );
    assert_eq!(ChainEvent::new("staking", "ExtrinsicSuccess").outcome(), None);
}

#[test]
fn abandoned_statuses_are_classified() {
    assert!(TxStatus::Dropped.is_abandoned());
    assert!(TxStatus::Invalid.is_abandoned());
    assert!(TxStatus::Usurped(B256::ZERO).is_abandoned());
    assert!(TxStatus::FinalityTimeout(B256::ZERO).is_abandoned());
    assert!(!TxStatus::Retracted(B256::ZERO).is_abandoned());
    assert!(!TxStatus::Future.is_abandoned());
}

#[test]
fn notifications_carry_user_facing_text() {
    let pending = Notification::from(NotificationKind::Pending);
    assert_eq!(pending.title, "Pending");
    assert_eq!(pending.subtitle, "Transaction initiated.");
    let failed = Notification::from(NotificationKind::Failed);
    assert_eq!(failed.subtitle, "Error with transaction.");

    let json = serde_json::to_string(&Notification::from(NotificationKind::Cancelled))
        .expect("serialize notification");
    assert!(json.contains("Transaction cancelled."));
}

#[test]
fn pending_keys_display_sender_and_nonce() {
    let key = PendingKey {
        sender: AccountId::from("alice"),
        nonce: 12,
    };
    assert_eq!(key.to_string(), "alice#12");
}
