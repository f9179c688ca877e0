use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::config::SubmitterConfig;
use crate::domain::Call;
use crate::ports::{
    AccountsPort, ChainRpcPort, ExtensionPort, HardwarePort, NotificationPort, PendingPort,
    ProxyPort,
};
use crate::session::{SubmissionSession, SubmitOptions};

/// Shared context for every submission session: the chain connection, signer
/// backends and the process-wide pending registry and notification sink.
pub struct Orchestrator<C, E, A, P, N, R, H>
where
    C: ChainRpcPort,
    E: ExtensionPort,
    A: AccountsPort,
    P: ProxyPort,
    N: NotificationPort,
    R: PendingPort,
    H: HardwarePort,
{
    pub chain: C,
    pub extensions: E,
    pub accounts: A,
    pub proxies: P,
    pub notifications: N,
    pub pending: R,
    pub hardware: H,
    pub config: SubmitterConfig,
    last_uid: AtomicU64,
}

impl<C, E, A, P, N, R, H> Orchestrator<C, E, A, P, N, R, H>
where
    C: ChainRpcPort,
    E: ExtensionPort,
    A: AccountsPort,
    P: ProxyPort,
    N: NotificationPort,
    R: PendingPort,
    H: HardwarePort,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain: C,
        extensions: E,
        accounts: A,
        proxies: P,
        notifications: N,
        pending: R,
        hardware: H,
    ) -> Self {
        Self {
            chain,
            extensions,
            accounts,
            proxies,
            notifications,
            pending,
            hardware,
            config: SubmitterConfig::default(),
            last_uid: AtomicU64::new(0),
        }
    }

    pub fn with_config(mut self, config: SubmitterConfig) -> Self {
        self.config = config;
        self
    }

    /// Monotonically increasing session id, starting at 1.
    pub fn next_uid(&self) -> u64 {
        self.last_uid.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Opens a session for `call` and runs the first preparation pass.
    pub async fn create(
        self: &Arc<Self>,
        call: Call,
        options: SubmitOptions,
    ) -> SubmissionSession<C, E, A, P, N, R, H> {
        let uid = self.next_uid();
        debug!(uid, call = %call.path(), "creating submission session");
        let session = SubmissionSession::new(Arc::clone(self), uid, call, options);
        session.prepare().await;
        session
    }
}
