use tracing::{debug, warn};

use crate::domain::{AccountId, Call, SigningPayload};
use crate::ports::ChainRpcPort;

/// Builds the payload an out-of-band signer (hardware device, vault) signs. Chain
/// failures are logged and yield `None`; this runs on every call change and must
/// never abort preparation.
pub async fn build_payload<C: ChainRpcPort>(
    chain: &C,
    call: &Call,
    sender: &AccountId,
    uid: u64,
) -> Option<SigningPayload> {
    let context = match chain.signing_context().await {
        Ok(context) => context,
        Err(err) => {
            warn!(uid, error = %err, "signing context unavailable; no payload built");
            return None;
        }
    };
    let nonce = match chain.account_next_index(sender).await {
        Ok(nonce) => nonce,
        Err(err) => {
            warn!(uid, %sender, error = %err, "nonce unavailable; no payload built");
            return None;
        }
    };

    let payload = SigningPayload {
        uid,
        address: sender.clone(),
        call_data: call.encoded(),
        call_hash: call.hash(),
        nonce,
        tip: 0,
        spec_version: context.spec_version,
        transaction_version: context.transaction_version,
        genesis_hash: context.genesis_hash,
        block_hash: context.block_hash,
    };
    debug!(uid, %sender, nonce, digest = %payload.digest(), "signing payload built");
    Some(payload)
}
