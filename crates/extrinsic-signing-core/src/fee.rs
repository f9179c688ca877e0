use tracing::warn;

use crate::domain::{AccountId, Balance, Call};
use crate::ports::ChainRpcPort;

#[derive(Debug)]
pub enum FeeEstimate {
    Changed(Balance),
    Unchanged,
    /// Best-effort: the caller keeps whatever fee it already shows.
    Unavailable,
}

pub async fn estimate_fee<C: ChainRpcPort>(
    chain: &C,
    call: &Call,
    sender: &AccountId,
    cached: Balance,
) -> FeeEstimate {
    match chain.payment_info(call, sender).await {
        Ok(fee) if fee == cached => FeeEstimate::Unchanged,
        Ok(fee) => FeeEstimate::Changed(fee),
        Err(err) => {
            warn!(call = %call.path(), %sender, error = %err, "fee estimation failed");
            FeeEstimate::Unavailable
        }
    }
}
