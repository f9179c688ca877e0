use crate::domain::{AccountId, Call, CallArg, Delegation, ProxyType};

const STAKING_CALLS: &[&str] = &[
    "staking.bond",
    "staking.bond_extra",
    "staking.unbond",
    "staking.rebond",
    "staking.withdraw_unbonded",
    "staking.nominate",
    "staking.chill",
    "staking.set_payee",
    "staking.set_controller",
    "staking.payout_stakers",
    "fast_unstake.register_fast_unstake",
    "fast_unstake.deregister",
];

const NOMINATION_POOL_CALLS: &[&str] = &[
    "nomination_pools.join",
    "nomination_pools.bond_extra",
    "nomination_pools.claim_payout",
    "nomination_pools.unbond",
    "nomination_pools.withdraw_unbonded",
    "nomination_pools.set_claim_permission",
    "nomination_pools.claim_commission",
];

const BATCH_CALLS: &[&str] = &["utility.batch", "utility.batch_all", "utility.force_batch"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapped {
    pub call: Call,
    pub sender: AccountId,
    pub wrapped: bool,
}

pub fn is_proxy_envelope(call: &Call) -> bool {
    call.is("proxy", "proxy")
}

/// The `real` account of a `proxy.proxy` envelope.
pub fn envelope_real(call: &Call) -> Option<&AccountId> {
    if !is_proxy_envelope(call) {
        return None;
    }
    call.args.iter().find_map(|arg| match arg {
        CallArg::Account(real) => Some(real),
        _ => None,
    })
}

pub fn proxy_call(real: &AccountId, call: Call) -> Call {
    Call::new("proxy", "proxy")
        .arg(CallArg::Account(real.clone()))
        .arg(CallArg::Empty)
        .arg(CallArg::Call(Box::new(call)))
}

/// Whether a delegate holding `proxy_type` may submit `call` on the delegator's behalf.
/// Batches qualify only when non-empty and every inner call qualifies.
pub fn is_proxy_supported(call: &Call, proxy_type: ProxyType) -> bool {
    if is_proxy_envelope(call) {
        return true;
    }
    let path = call.path();
    if BATCH_CALLS.contains(&path.as_str()) {
        return match call.inner_calls() {
            Some(calls) if !calls.is_empty() => calls
                .iter()
                .all(|inner| !is_proxy_envelope(inner) && is_proxy_supported(inner, proxy_type)),
            _ => false,
        };
    }
    allows(proxy_type, &path)
}

fn allows(proxy_type: ProxyType, path: &str) -> bool {
    match proxy_type {
        ProxyType::Any => true,
        ProxyType::NonTransfer => !path.starts_with("balances."),
        ProxyType::Staking => STAKING_CALLS.contains(&path),
        ProxyType::NominationPools => NOMINATION_POOL_CALLS.contains(&path),
    }
}

pub fn wrap_if_delegated(call: Call, from: &AccountId, delegation: Option<&Delegation>) -> Wrapped {
    let Some(delegation) = delegation.filter(|d| &d.delegator == from) else {
        return Wrapped {
            call,
            sender: from.clone(),
            wrapped: false,
        };
    };

    if is_proxy_envelope(&call) {
        // Already an envelope: keep it, but it still has to be signed by the delegate.
        let sender = if envelope_real(&call) == Some(&delegation.delegator) {
            delegation.delegate.clone()
        } else {
            from.clone()
        };
        return Wrapped {
            call,
            sender,
            wrapped: false,
        };
    }

    if !is_proxy_supported(&call, delegation.proxy_type) {
        return Wrapped {
            call,
            sender: from.clone(),
            wrapped: false,
        };
    }

    Wrapped {
        call: proxy_call(&delegation.delegator, call),
        sender: delegation.delegate.clone(),
        wrapped: true,
    }
}
