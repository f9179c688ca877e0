use extrinsic_signing_core::proxy::{
    envelope_real, is_proxy_envelope, is_proxy_supported, proxy_call, wrap_if_delegated,
};
use extrinsic_signing_core::{AccountId, Call, CallArg, Delegation, ProxyType};

fn stash() -> AccountId {
    AccountId::from("15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5")
}

fn controller() -> AccountId {
    AccountId::from("14E5nqKAp3oAJcmzgZhUD2RcptBeUBScxKHgJKU4HPNcKVf3")
}

fn delegation(proxy_type: ProxyType) -> Delegation {
    Delegation {
        delegator: stash(),
        delegate: controller(),
        proxy_type,
    }
}

fn bond_extra(amount: u128) -> Call {
    Call::new("staking", "bond_extra").arg(CallArg::Balance(amount))
}

fn transfer(amount: u128) -> Call {
    Call::new("balances", "transfer_keep_alive")
        .arg(CallArg::Account(controller()))
        .arg(CallArg::Balance(amount))
}

#[test]
fn delegated_staking_call_is_wrapped_for_the_delegate() {
    let wrapped = wrap_if_delegated(
        bond_extra(10_000_000_000),
        &stash(),
        Some(&delegation(ProxyType::Staking)),
    );
    assert!(wrapped.wrapped);
    assert_eq!(wrapped.sender, controller());
    assert!(is_proxy_envelope(&wrapped.call));
    assert_eq!(envelope_real(&wrapped.call), Some(&stash()));
    assert_eq!(wrapped.call.inner_call(), Some(&bond_extra(10_000_000_000)));
}

#[test]
fn wrapping_is_idempotent() {
    let once = wrap_if_delegated(bond_extra(1), &stash(), Some(&delegation(ProxyType::Any)));
    let twice = wrap_if_delegated(
        once.call.clone(),
        &stash(),
        Some(&delegation(ProxyType::Any)),
    );
    assert!(!twice.wrapped);
    assert_eq!(twice.call, once.call);
    assert_eq!(twice.call.encoded(), once.call.encoded());
    assert_eq!(twice.sender, controller());
}

#[test]
fn without_delegation_the_call_is_untouched() {
    let wrapped = wrap_if_delegated(bond_extra(5), &stash(), None);
    assert!(!wrapped.wrapped);
    assert_eq!(wrapped.call, bond_extra(5));
    assert_eq!(wrapped.sender, stash());
}

#[test]
fn delegation_of_another_account_is_ignored() {
    let other = Delegation {
        delegator: controller(),
        delegate: stash(),
        proxy_type: ProxyType::Any,
    };
    let wrapped = wrap_if_delegated(bond_extra(5), &stash(), Some(&other));
    assert!(!wrapped.wrapped);
    assert_eq!(wrapped.sender, stash());
}

#[test]
fn unsupported_call_is_submitted_directly() {
    let wrapped = wrap_if_delegated(transfer(7), &stash(), Some(&delegation(ProxyType::Staking)));
    assert!(!wrapped.wrapped);
    assert_eq!(wrapped.call, transfer(7));
    assert_eq!(wrapped.sender, stash());
}

#[test]
fn allow_list_follows_proxy_type() {
    assert!(is_proxy_supported(&transfer(1), ProxyType::Any));
    assert!(!is_proxy_supported(&transfer(1), ProxyType::NonTransfer));
    assert!(is_proxy_supported(&bond_extra(1), ProxyType::NonTransfer));
    assert!(is_proxy_supported(&bond_extra(1), ProxyType::Staking));
    assert!(!is_proxy_supported(&bond_extra(1), ProxyType::NominationPools));
    let join = Call::new("nomination_pools", "join")
        .arg(CallArg::Balance(1))
        .arg(CallArg::U32(7));
    assert!(is_proxy_supported(&join, ProxyType::NominationPools));
    assert!(!is_proxy_supported(&join, ProxyType::Staking));
}

#[test]
fn batches_need_every_inner_call_supported() {
    let nominate = Call::new("staking", "nominate").arg(CallArg::Account(controller()));
    let good = Call::new("utility", "batch_all")
        .arg(CallArg::Calls(vec![bond_extra(1), nominate.clone()]));
    let mixed =
        Call::new("utility", "batch").arg(CallArg::Calls(vec![bond_extra(1), transfer(1)]));
    let empty = Call::new("utility", "batch").arg(CallArg::Calls(Vec::new()));

    assert!(is_proxy_supported(&good, ProxyType::Staking));
    assert!(!is_proxy_supported(&mixed, ProxyType::Staking));
    assert!(!is_proxy_supported(&empty, ProxyType::Any));
}

#[test]
fn nested_envelope_inside_batch_is_refused() {
    let nested = Call::new("utility", "batch")
        .arg(CallArg::Calls(vec![proxy_call(&stash(), bond_extra(1))]));
    assert!(!is_proxy_supported(&nested, ProxyType::Any));
}
