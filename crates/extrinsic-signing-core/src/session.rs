use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{keccak256, Bytes, B256};
use parity_scale_codec::Encode;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{
    AccountId, Balance, Call, ExtrinsicOutcome, ManualDevice, NotificationKind, PendingKey,
    SigningPayload, StatusUpdate, TxStatus,
};
use crate::fee::{self, FeeEstimate};
use crate::orchestrator::Orchestrator;
use crate::payload;
use crate::ports::{
    AccountsPort, ChainRpcPort, ExtensionPort, HardwarePort, NotificationPort, PendingPort,
    PortError, ProxyPort,
};
use crate::proxy::{self, Wrapped};
use crate::signer::{self, DeclineReason, Resolution, SignerBackend};
use crate::state_machine::{
    submission_transition, StateTransition, SubmissionAction, SubmissionPhase,
};
use crate::subscription::StatusSubscription;

pub type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Default)]
pub struct SubmitOptions {
    pub from: Option<AccountId>,
    pub should_submit: bool,
    pub on_submitted: Option<Callback>,
    pub on_in_block: Option<Callback>,
}

impl SubmitOptions {
    pub fn for_account(address: impl Into<AccountId>) -> Self {
        Self {
            from: Some(address.into()),
            should_submit: true,
            ..Self::default()
        }
    }

    pub fn should_submit(mut self, ready: bool) -> Self {
        self.should_submit = ready;
        self
    }

    pub fn on_submitted(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_submitted = Some(Arc::new(callback));
        self
    }

    pub fn on_in_block(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_in_block = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for SubmitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitOptions")
            .field("from", &self.from)
            .field("should_submit", &self.should_submit)
            .field("on_submitted", &self.on_submitted.is_some())
            .field("on_in_block", &self.on_in_block.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Declined(DeclineReason),
    Finalized(ExtrinsicOutcome),
    /// The node gave up on the extrinsic. `None` when the stream closed without a status.
    Abandoned(Option<TxStatus>),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("signer not found: extension `{0}` is not available")]
    SignerNotFound(String),
    #[error("submission failed: {0}")]
    SubmissionFailed(#[source] PortError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub uid: u64,
    pub phase: SubmissionPhase,
    pub from: Option<AccountId>,
    pub effective_sender: Option<AccountId>,
    pub call: String,
    pub call_hash: B256,
    pub fee: Balance,
    pub proxy_supported: bool,
    pub submitting: bool,
    pub should_submit: bool,
    pub has_payload: bool,
    pub has_signature: bool,
    pub revision: u64,
}

#[derive(Debug)]
struct SessionState {
    input_call: Call,
    from: Option<AccountId>,
    call: Call,
    sender: Option<AccountId>,
    proxy_supported: bool,
    fee: Balance,
    payload: Option<SigningPayload>,
    signature: Option<Bytes>,
    should_submit: bool,
    submitting: bool,
    phase: SubmissionPhase,
    fingerprint: Option<B256>,
    generation: u64,
    revision: u64,
    transitions: Vec<StateTransition>,
}

impl SessionState {
    fn new(call: Call, options: &SubmitOptions) -> Self {
        Self {
            input_call: call.clone(),
            from: options.from.clone(),
            call,
            sender: options.from.clone(),
            proxy_supported: false,
            fee: 0,
            payload: None,
            signature: None,
            should_submit: options.should_submit,
            submitting: false,
            phase: SubmissionPhase::Idle,
            fingerprint: None,
            generation: 0,
            revision: 0,
            transitions: Vec::new(),
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }

    fn advance(&mut self, action: SubmissionAction) -> Result<StateTransition, PortError> {
        let (to, transition) = submission_transition(self.phase, action)?;
        if to != self.phase {
            self.phase = to;
            self.transitions.push(transition.clone());
            self.bump();
        }
        Ok(transition)
    }

    fn publish_target(&mut self, call: Call, sender: Option<AccountId>, proxy_supported: bool) {
        if self.call != call || self.sender != sender || self.proxy_supported != proxy_supported {
            self.call = call;
            self.sender = sender;
            self.proxy_supported = proxy_supported;
            self.bump();
        }
    }

    fn set_submitting(&mut self, submitting: bool) {
        if self.submitting != submitting {
            self.submitting = submitting;
            self.bump();
        }
    }

    /// Clears the staged payload and signature and leaves the busy state. The next
    /// `update` re-prepares even for an unchanged call.
    fn reset_staged(&mut self) {
        self.payload = None;
        self.signature = None;
        self.submitting = false;
        self.fingerprint = None;
        self.bump();
    }
}

fn fingerprint(call: &Call, from: Option<&AccountId>) -> B256 {
    let mut bytes = call.encode();
    from.cloned().encode_to(&mut bytes);
    keccak256(bytes)
}

pub struct SubmissionSession<C, E, A, P, N, R, H>
where
    C: ChainRpcPort,
    E: ExtensionPort,
    A: AccountsPort,
    P: ProxyPort,
    N: NotificationPort,
    R: PendingPort,
    H: HardwarePort,
{
    orchestrator: Arc<Orchestrator<C, E, A, P, N, R, H>>,
    uid: u64,
    state: Mutex<SessionState>,
    on_submitted: Option<Callback>,
    on_in_block: Option<Callback>,
}

impl<C, E, A, P, N, R, H> SubmissionSession<C, E, A, P, N, R, H>
where
    C: ChainRpcPort,
    E: ExtensionPort,
    A: AccountsPort,
    P: ProxyPort,
    N: NotificationPort,
    R: PendingPort,
    H: HardwarePort,
{
    pub(crate) fn new(
        orchestrator: Arc<Orchestrator<C, E, A, P, N, R, H>>,
        uid: u64,
        call: Call,
        options: SubmitOptions,
    ) -> Self {
        Self {
            orchestrator,
            uid,
            state: Mutex::new(SessionState::new(call, &options)),
            on_submitted: options.on_submitted,
            on_in_block: options.on_in_block,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    pub fn effective_sender(&self) -> Option<AccountId> {
        self.lock().sender.clone()
    }

    pub fn proxy_supported(&self) -> bool {
        self.lock().proxy_supported
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.lock().phase
    }

    pub fn fee(&self) -> Balance {
        self.lock().fee
    }

    pub fn call(&self) -> Call {
        self.lock().call.clone()
    }

    pub fn payload(&self) -> Option<SigningPayload> {
        self.lock().payload.clone()
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    pub fn transitions(&self) -> Vec<StateTransition> {
        self.lock().transitions.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            uid: self.uid,
            phase: state.phase,
            from: state.from.clone(),
            effective_sender: state.sender.clone(),
            call: state.call.path(),
            call_hash: state.call.hash(),
            fee: state.fee,
            proxy_supported: state.proxy_supported,
            submitting: state.submitting,
            should_submit: state.should_submit,
            has_payload: state.payload.is_some(),
            has_signature: state.signature.is_some(),
            revision: state.revision,
        }
    }

    pub fn set_signature(&self, signature: Option<Bytes>) {
        let mut state = self.lock();
        if state.signature != signature {
            state.signature = signature;
            state.bump();
        }
    }

    pub fn set_should_submit(&self, ready: bool) {
        let mut state = self.lock();
        if state.should_submit != ready {
            state.should_submit = ready;
            state.bump();
        }
    }

    /// Re-prepares when the call's encoding (nested calls included) or the sender
    /// changed since the last preparation. Returns whether preparation ran.
    pub async fn update(&self, call: Call, from: Option<AccountId>) -> bool {
        let changed = {
            let mut state = self.lock();
            if state.fingerprint == Some(fingerprint(&call, from.as_ref())) {
                false
            } else {
                state.input_call = call;
                state.from = from;
                true
            }
        };
        if changed {
            self.prepare().await;
        }
        changed
    }

    pub async fn prepare(&self) {
        let orchestrator = &self.orchestrator;
        let (generation, input, from) = {
            let mut state = self.lock();
            state.generation = state.generation.saturating_add(1);
            state.fingerprint = Some(fingerprint(&state.input_call, state.from.as_ref()));
            if let Err(err) = state.advance(SubmissionAction::Prepare) {
                debug!(
                    uid = self.uid,
                    phase = ?state.phase,
                    error = %err,
                    "preparing while a submission is in flight"
                );
            }
            (state.generation, state.input_call.clone(), state.from.clone())
        };

        let Some(from) = from else {
            let mut state = self.lock();
            if state.generation == generation {
                state.publish_target(input, None, false);
                if state.payload.take().is_some() {
                    state.bump();
                }
            }
            return;
        };

        let delegation = orchestrator.proxies.active_delegate(&from);
        let proxy_supported = delegation
            .as_ref()
            .is_some_and(|d| proxy::is_proxy_supported(&input, d.proxy_type));
        let Wrapped {
            call,
            sender,
            wrapped,
        } = if orchestrator.config.proxy_wrapping {
            proxy::wrap_if_delegated(input, &from, delegation.as_ref())
        } else {
            Wrapped {
                sender: from.clone(),
                call: input,
                wrapped: false,
            }
        };
        if wrapped {
            debug!(
                uid = self.uid,
                delegator = %from,
                delegate = %sender,
                "call wrapped in proxy envelope"
            );
        }

        let cached_fee = {
            let mut state = self.lock();
            if state.generation != generation {
                return;
            }
            state.publish_target(call.clone(), Some(sender.clone()), proxy_supported);
            state.fee
        };

        if orchestrator.config.fee_estimation {
            let estimate =
                fee::estimate_fee(&orchestrator.chain, &call, &sender, cached_fee).await;
            if let FeeEstimate::Changed(fee) = estimate {
                let mut state = self.lock();
                if state.generation != generation {
                    return;
                }
                if state.fee != fee {
                    state.fee = fee;
                    state.bump();
                }
            }
        }

        let manual = orchestrator
            .accounts
            .account(&sender)
            .is_some_and(|account| account.source.is_manual());
        let payload = if manual {
            payload::build_payload(&orchestrator.chain, &call, &sender, self.uid).await
        } else {
            None
        };

        let mut state = self.lock();
        if state.generation != generation || state.payload == payload {
            return;
        }
        state.payload = payload;
        if state.signature.take().is_some() {
            debug!(uid = self.uid, "payload rebuilt; staged signature discarded");
        }
        state.bump();
    }

    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
        let orchestrator = &self.orchestrator;
        let (sender, call, backend) = {
            let mut state = self.lock();
            let Some(sender) = state.sender.clone() else {
                return Ok(self.declined(DeclineReason::MissingAccount));
            };
            let Some(account) = orchestrator.accounts.account(&sender) else {
                return Ok(self.declined(DeclineReason::MissingAccount));
            };
            if state.submitting || state.phase.is_in_flight() {
                return Ok(self.declined(DeclineReason::AlreadySubmitting));
            }
            if !state.should_submit {
                return Ok(self.declined(DeclineReason::NotReady));
            }
            if !orchestrator.chain.is_connected() {
                return Ok(self.declined(DeclineReason::Disconnected));
            }
            let backend = match signer::resolve(
                &account,
                &orchestrator.extensions,
                state.signature.clone(),
                state.payload.clone(),
            ) {
                Resolution::Backend(backend) => backend,
                Resolution::Declined(reason) => return Ok(self.declined(reason)),
                Resolution::NotFound(id) => {
                    error!(uid = self.uid, extension = %id, "signer not found");
                    return Err(SubmitError::SignerNotFound(id));
                }
            };
            if let Err(err) = state.advance(SubmissionAction::RequestSignature) {
                warn!(uid = self.uid, error = %err, "submit requested from an unexpected phase");
                return Ok(self.declined(DeclineReason::AlreadySubmitting));
            }
            state.set_submitting(true);
            (sender, state.call.clone(), backend)
        };

        let device = backend.manual_device();
        info!(uid = self.uid, %sender, call = %call.path(), ?backend, "submitting extrinsic");

        let mut in_flight = InFlight {
            session: self,
            key: None,
            device,
            armed: true,
        };
        let result = self
            .dispatch(&backend, &call, &sender, &mut in_flight)
            .await;
        in_flight.armed = false;
        result
    }

    async fn dispatch(
        &self,
        backend: &SignerBackend,
        call: &Call,
        sender: &AccountId,
        in_flight: &mut InFlight<'_, C, E, A, P, N, R, H>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let orchestrator = &self.orchestrator;
        let device = in_flight.device;

        if let Err(err) = backend
            .enable(&orchestrator.extensions, &orchestrator.config.app_name)
            .await
        {
            return Err(self.fail(err, device, None));
        }
        self.advance(SubmissionAction::Submit);

        let next_index = match orchestrator.chain.account_next_index(sender).await {
            Ok(nonce) => nonce,
            Err(err) => return Err(self.fail(err, device, None)),
        };
        let nonce = match backend.signed_nonce() {
            Some(signed) if signed != next_index => {
                warn!(
                    uid = self.uid,
                    %sender,
                    signed,
                    next_index,
                    "signed payload nonce differs from the account's next index"
                );
                signed
            }
            Some(signed) => signed,
            None => next_index,
        };
        let key = PendingKey {
            sender: sender.clone(),
            nonce,
        };
        in_flight.key = Some(key.clone());
        let mut subscription = match backend
            .submit(&orchestrator.chain, call, sender, nonce)
            .await
        {
            Ok(subscription) => subscription,
            Err(err) => return Err(self.fail(err, device, Some(&key))),
        };

        debug!(uid = self.uid, %key, "watching extrinsic status");
        Ok(self.watch(&mut subscription, &key, device).await)
    }

    async fn watch(
        &self,
        subscription: &mut StatusSubscription,
        key: &PendingKey,
        device: Option<ManualDevice>,
    ) -> SubmitOutcome {
        let outcome = loop {
            let Some(update) = subscription.next().await else {
                warn!(uid = self.uid, %key, "status stream closed before a terminal status");
                break self.abandon(key, None, device);
            };
            self.first_status(device);
            match &update.status {
                TxStatus::Ready => self.on_ready(key),
                TxStatus::InBlock(block) => self.on_in_block(key, block),
                TxStatus::Finalized(block) => break self.on_finalized(key, &update, block),
                status if status.is_abandoned() => {
                    break self.abandon(key, Some(status.clone()), device)
                }
                status => {
                    debug!(uid = self.uid, ?status, "status update");
                }
            }
        };
        subscription.unsubscribe();
        outcome
    }

    fn declined(&self, reason: DeclineReason) -> SubmitOutcome {
        debug!(uid = self.uid, ?reason, "submission declined");
        SubmitOutcome::Declined(reason)
    }

    fn advance(&self, action: SubmissionAction) -> bool {
        let mut state = self.lock();
        match state.advance(action) {
            Ok(_) => true,
            Err(err) => {
                warn!(uid = self.uid, error = %err, "status ignored");
                false
            }
        }
    }

    fn reset_device(&self, device: Option<ManualDevice>) {
        if let Some(device) = device.filter(|d| d.is_hardware()) {
            self.orchestrator.hardware.reset(device);
        }
    }

    fn notify(&self, kind: NotificationKind) {
        self.orchestrator.notifications.notify(kind.into());
    }

    fn first_status(&self, device: Option<ManualDevice>) {
        let reset = {
            let mut state = self.lock();
            let first = state.phase == SubmissionPhase::Submitting
                && state.advance(SubmissionAction::FirstStatus).is_ok();
            if first {
                state.reset_staged();
            }
            first
        };
        if reset {
            self.reset_device(device);
            debug!(uid = self.uid, "first status received; staged signing state reset");
        }
    }

    fn on_ready(&self, key: &PendingKey) {
        if !self.advance(SubmissionAction::Ready) {
            return;
        }
        self.orchestrator.pending.add(key.clone());
        self.notify(NotificationKind::Pending);
        info!(uid = self.uid, %key, "extrinsic ready");
        if let Some(callback) = &self.on_submitted {
            callback();
        }
    }

    fn on_in_block(&self, key: &PendingKey, block: &B256) {
        if !self.advance(SubmissionAction::InBlock) {
            return;
        }
        self.lock().set_submitting(false);
        self.orchestrator.pending.remove(key);
        self.notify(NotificationKind::InBlock);
        info!(uid = self.uid, %key, %block, "extrinsic in block");
        if let Some(callback) = &self.on_in_block {
            callback();
        }
    }

    fn on_finalized(&self, key: &PendingKey, update: &StatusUpdate, block: &B256) -> SubmitOutcome {
        let Some(outcome) = update.outcome() else {
            warn!(uid = self.uid, %key, %block, "finalized without an extrinsic outcome event");
            self.advance(SubmissionAction::Abandon);
            self.lock().set_submitting(false);
            self.orchestrator.pending.remove(key);
            return SubmitOutcome::Abandoned(Some(update.status.clone()));
        };

        self.advance(SubmissionAction::Finalize(outcome));
        self.orchestrator.pending.remove(key);
        match outcome {
            ExtrinsicOutcome::Success => {
                self.notify(NotificationKind::Finalized);
                info!(uid = self.uid, %key, %block, "extrinsic finalized");
            }
            ExtrinsicOutcome::Failed => {
                self.lock().set_submitting(false);
                self.notify(NotificationKind::Failed);
                warn!(uid = self.uid, %key, %block, "extrinsic failed on chain");
            }
        }
        SubmitOutcome::Finalized(outcome)
    }

    fn abandon(
        &self,
        key: &PendingKey,
        status: Option<TxStatus>,
        device: Option<ManualDevice>,
    ) -> SubmitOutcome {
        let unreset = {
            let mut state = self.lock();
            let unreset = state.phase == SubmissionPhase::Submitting;
            let action = if unreset {
                state.reset_staged();
                SubmissionAction::Fail
            } else {
                SubmissionAction::Abandon
            };
            if let Err(err) = state.advance(action) {
                warn!(uid = self.uid, error = %err, "abandon from unexpected phase");
            }
            state.set_submitting(false);
            unreset
        };
        if unreset {
            self.reset_device(device);
        }
        self.orchestrator.pending.remove(key);
        self.notify(NotificationKind::Failed);
        warn!(uid = self.uid, %key, ?status, "extrinsic abandoned");
        SubmitOutcome::Abandoned(status)
    }

    fn fail(
        &self,
        err: PortError,
        device: Option<ManualDevice>,
        key: Option<&PendingKey>,
    ) -> SubmitError {
        let action = if err.is_user_rejection() {
            SubmissionAction::Cancel
        } else {
            SubmissionAction::Fail
        };
        {
            let mut state = self.lock();
            state.reset_staged();
            if let Err(transition_err) = state.advance(action) {
                warn!(uid = self.uid, error = %transition_err, "failure from unexpected phase");
            }
        }
        self.reset_device(device);
        if let Some(key) = key {
            self.orchestrator.pending.remove(key);
        }
        self.notify(NotificationKind::Cancelled);
        warn!(uid = self.uid, error = %err, "submission failed");
        SubmitError::SubmissionFailed(err)
    }

    /// The submit future went away before a terminal status. The status stream is torn
    /// down by its own drop; everything the session registered is undone here.
    fn interrupted(&self, key: Option<&PendingKey>, device: Option<ManualDevice>) {
        let unreset = {
            let mut state = self.lock();
            if state.phase.is_terminal() {
                return;
            }
            let unreset = !state.phase.is_watching();
            let action = if unreset {
                state.reset_staged();
                SubmissionAction::Cancel
            } else {
                SubmissionAction::Abandon
            };
            if let Err(err) = state.advance(action) {
                warn!(uid = self.uid, error = %err, "interrupted from unexpected phase");
            }
            state.set_submitting(false);
            unreset
        };
        if unreset {
            self.reset_device(device);
        }
        if let Some(key) = key {
            self.orchestrator.pending.remove(key);
        }
        self.notify(NotificationKind::Cancelled);
        warn!(uid = self.uid, ?key, "submission dropped before a terminal status");
    }
}

/// Armed for the lifetime of a `submit` call; dropping it armed means the caller
/// dropped the future mid-flight.
struct InFlight<'a, C, E, A, P, N, R, H>
where
    C: ChainRpcPort,
    E: ExtensionPort,
    A: AccountsPort,
    P: ProxyPort,
    N: NotificationPort,
    R: PendingPort,
    H: HardwarePort,
{
    session: &'a SubmissionSession<C, E, A, P, N, R, H>,
    key: Option<PendingKey>,
    device: Option<ManualDevice>,
    armed: bool,
}

impl<C, E, A, P, N, R, H> Drop for InFlight<'_, C, E, A, P, N, R, H>
where
    C: ChainRpcPort,
    E: ExtensionPort,
    A: AccountsPort,
    P: ProxyPort,
    N: NotificationPort,
    R: PendingPort,
    H: HardwarePort,
{
    fn drop(&mut self) {
        if self.armed {
            self.session.interrupted(self.key.as_ref(), self.device);
        }
    }
}
