use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{keccak256, Bytes, B256};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use extrinsic_signing_core::{
    AccountId, Balance, Call, ChainEvent, ChainRpcPort, ExtrinsicSigner, Nonce, PortError,
    SignedExtrinsic, SigningContext, SigningPayload, StatusSender, StatusSubscription,
    StatusUpdate, TxStatus,
};

use crate::DevChainConfig;

pub fn block_hash(number: u64) -> B256 {
    keccak256(number.to_be_bytes())
}

fn finalized_updates(block_number: u64, outcome_event: ChainEvent) -> Vec<StatusUpdate> {
    let block = block_hash(block_number);
    vec![
        StatusUpdate::new(TxStatus::Ready),
        StatusUpdate::new(TxStatus::InBlock(block)),
        StatusUpdate::with_events(
            TxStatus::Finalized(block),
            vec![ChainEvent::new("balances", "Withdraw"), outcome_event],
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionRoute {
    Extension,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedExtrinsic {
    pub call: Call,
    pub sender: AccountId,
    pub nonce: Nonce,
    pub signature: Bytes,
    pub route: SubmissionRoute,
}

/// In-memory chain node. Status sequences are scripted per submission; without a
/// script the node walks Ready, InBlock and Finalized with `ExtrinsicSuccess`.
#[derive(Debug, Clone)]
pub struct DevChainAdapter {
    config: DevChainConfig,
    state: Arc<Mutex<DevChainState>>,
    unsubscribed: Arc<AtomicUsize>,
}

#[derive(Debug)]
struct DevChainState {
    connected: bool,
    fee: Option<Balance>,
    fee_failure: Option<String>,
    fee_delays: VecDeque<usize>,
    nonce_failure: Option<String>,
    submit_failure: Option<String>,
    nonces: BTreeMap<AccountId, Nonce>,
    scripts: VecDeque<Vec<StatusUpdate>>,
    hold_streams: bool,
    open_streams: Vec<StatusSender>,
    submitted: Vec<SubmittedExtrinsic>,
    best_block: u64,
    payment_info_calls: usize,
    next_index_calls: usize,
}

impl Default for DevChainState {
    fn default() -> Self {
        Self {
            connected: true,
            fee: None,
            fee_failure: None,
            fee_delays: VecDeque::new(),
            nonce_failure: None,
            submit_failure: None,
            nonces: BTreeMap::new(),
            scripts: VecDeque::new(),
            hold_streams: false,
            open_streams: Vec::new(),
            submitted: Vec::new(),
            best_block: 1,
            payment_info_calls: 0,
            next_index_calls: 0,
        }
    }
}

impl Default for DevChainAdapter {
    fn default() -> Self {
        Self::with_config(DevChainConfig::from_env())
    }
}

impl DevChainAdapter {
    pub fn with_config(config: DevChainConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(DevChainState::default())),
            unsubscribed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &DevChainConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, DevChainState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("dev chain lock poisoned: {e}")))
    }

    fn state(&self) -> MutexGuard<'_, DevChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_connected(&self, connected: bool) {
        self.state().connected = connected;
    }

    pub fn set_fee(&self, fee: Option<Balance>) {
        self.state().fee = fee;
    }

    pub fn set_fee_failure(&self, reason: Option<&str>) {
        self.state().fee_failure = reason.map(str::to_owned);
    }

    pub fn push_fee_delay(&self, yields: usize) {
        self.state().fee_delays.push_back(yields);
    }

    pub fn set_nonce_failure(&self, reason: Option<&str>) {
        self.state().nonce_failure = reason.map(str::to_owned);
    }

    pub fn set_submit_failure(&self, reason: Option<&str>) {
        self.state().submit_failure = reason.map(str::to_owned);
    }

    pub fn set_nonce(&self, account: &AccountId, nonce: Nonce) {
        self.state().nonces.insert(account.clone(), nonce);
    }

    /// Queues the status sequence for the next submission. Updates listed after a
    /// terminal status are still delivered, to exercise late callbacks.
    pub fn push_script(&self, updates: Vec<StatusUpdate>) {
        self.state().scripts.push_back(updates);
    }

    pub fn hold_streams(&self, hold: bool) {
        self.state().hold_streams = hold;
    }

    pub fn release_streams(&self, updates: Vec<StatusUpdate>) -> usize {
        let streams = std::mem::take(&mut self.state().open_streams);
        for stream in &streams {
            for update in &updates {
                let _ = stream.send(update.clone());
            }
        }
        streams.len()
    }

    pub fn submitted(&self) -> Vec<SubmittedExtrinsic> {
        self.state().submitted.clone()
    }

    pub fn payment_info_calls(&self) -> usize {
        self.state().payment_info_calls
    }

    pub fn next_index_calls(&self) -> usize {
        self.state().next_index_calls
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribed.load(Ordering::SeqCst)
    }

    pub fn finalized_script(&self, outcome_event: ChainEvent) -> Vec<StatusUpdate> {
        finalized_updates(self.state().best_block, outcome_event)
    }

    fn next_nonce(state: &DevChainState, config: &DevChainConfig, sender: &AccountId) -> Nonce {
        state
            .nonces
            .get(sender)
            .copied()
            .unwrap_or(config.starting_nonce)
    }

    fn context(&self, state: &DevChainState) -> SigningContext {
        SigningContext {
            genesis_hash: self.config.genesis_hash,
            block_hash: block_hash(state.best_block),
            spec_version: self.config.spec_version,
            transaction_version: self.config.transaction_version,
        }
    }

    fn accept(&self, submission: SubmittedExtrinsic) -> Result<StatusSubscription, PortError> {
        let mut state = self.lock()?;
        if !state.connected {
            return Err(PortError::Transport("dev chain disconnected".to_owned()));
        }
        if let Some(reason) = &state.submit_failure {
            return Err(PortError::Transport(reason.clone()));
        }
        let expected = Self::next_nonce(&state, &self.config, &submission.sender);
        if submission.nonce < expected {
            return Err(PortError::Validation(format!(
                "stale nonce {} for {}, next index is {expected}",
                submission.nonce, submission.sender
            )));
        }

        let script = match state.scripts.pop_front() {
            Some(script) => script,
            None if self.config.auto_finalize => {
                finalized_updates(state.best_block, ChainEvent::extrinsic_success())
            }
            None => Vec::new(),
        };

        let unsubscribed = Arc::clone(&self.unsubscribed);
        let (tx, subscription) = StatusSubscription::channel(move || {
            unsubscribed.fetch_add(1, Ordering::SeqCst);
        });
        for update in script {
            let _ = tx.send(update);
        }
        if state.hold_streams {
            state.open_streams.push(tx);
        }

        state
            .nonces
            .insert(submission.sender.clone(), submission.nonce.saturating_add(1));
        state.best_block = state.best_block.saturating_add(1);
        info!(
            sender = %submission.sender,
            nonce = submission.nonce,
            call = %submission.call.path(),
            route = ?submission.route,
            "dev chain accepted extrinsic"
        );
        state.submitted.push(submission);
        Ok(subscription)
    }
}

#[async_trait]
impl ChainRpcPort for DevChainAdapter {
    fn is_connected(&self) -> bool {
        self.state().connected
    }

    async fn payment_info(&self, call: &Call, sender: &AccountId) -> Result<Balance, PortError> {
        let delay = self.lock()?.fee_delays.pop_front().unwrap_or(0);
        for _ in 0..delay {
            tokio::task::yield_now().await;
        }
        let mut state = self.lock()?;
        state.payment_info_calls += 1;
        if let Some(reason) = &state.fee_failure {
            return Err(PortError::Transport(reason.clone()));
        }
        let fee = state
            .fee
            .unwrap_or_else(|| self.config.fee_for(call.encoded().len()));
        debug!(%sender, call = %call.path(), fee, "payment info");
        Ok(fee)
    }

    async fn account_next_index(&self, sender: &AccountId) -> Result<Nonce, PortError> {
        let mut state = self.lock()?;
        state.next_index_calls += 1;
        if let Some(reason) = &state.nonce_failure {
            return Err(PortError::Transport(reason.clone()));
        }
        Ok(Self::next_nonce(&state, &self.config, sender))
    }

    async fn signing_context(&self) -> Result<SigningContext, PortError> {
        let state = self.lock()?;
        Ok(self.context(&state))
    }

    async fn submit(&self, extrinsic: SignedExtrinsic) -> Result<StatusSubscription, PortError> {
        let nonce = extrinsic.nonce();
        self.accept(SubmittedExtrinsic {
            call: extrinsic.call,
            sender: extrinsic.signer,
            nonce,
            signature: extrinsic.signature,
            route: SubmissionRoute::Manual,
        })
    }

    async fn sign_and_submit(
        &self,
        call: &Call,
        sender: &AccountId,
        nonce: Nonce,
        signer: &dyn ExtrinsicSigner,
    ) -> Result<StatusSubscription, PortError> {
        let context = {
            let state = self.lock()?;
            self.context(&state)
        };
        let payload = SigningPayload {
            uid: 0,
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
        let signature = signer.sign(&payload).await?;
        self.accept(SubmittedExtrinsic {
            call: call.clone(),
            sender: sender.clone(),
            nonce,
            signature,
            route: SubmissionRoute::Extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use extrinsic_signing_core::{AccountId, ChainEvent, ChainRpcPort, ExtrinsicOutcome, TxStatus};

    use super::DevChainAdapter;
    use crate::DevChainConfig;

    #[tokio::test]
    async fn success_script_and_nonce_lookup() {
        let chain = DevChainAdapter::with_config(DevChainConfig::default());
        let script = chain.finalized_script(ChainEvent::extrinsic_success());
        assert_eq!(script.len(), 3);
        assert_eq!(script[0].status, TxStatus::Ready);
        assert_eq!(script[2].outcome(), Some(ExtrinsicOutcome::Success));

        let alice = AccountId::from("alice");
        chain.set_nonce(&alice, 4);
        assert_eq!(chain.account_next_index(&alice).await.expect("nonce"), 4);
        assert_eq!(chain.next_index_calls(), 1);
    }
}
