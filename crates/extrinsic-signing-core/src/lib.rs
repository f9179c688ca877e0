pub mod config;
pub mod domain;
pub mod fee;
pub mod orchestrator;
pub mod payload;
pub mod ports;
pub mod proxy;
pub mod session;
pub mod signer;
pub mod state_machine;
pub mod subscription;

pub use config::SubmitterConfig;
pub use domain::{
    Account, AccountId, Balance, Call, CallArg, ChainEvent, Delegation, ExtrinsicOutcome,
    ManualDevice, Nonce, Notification, NotificationKind, PendingKey, ProxyType, SignedExtrinsic,
    SigningContext, SigningPayload, SigningSource, StatusUpdate, TxStatus,
};
pub use orchestrator::Orchestrator;
pub use ports::{
    AccountsPort, ChainRpcPort, ExtensionPort, ExtensionStatus, ExtrinsicSigner, HardwarePort,
    NotificationPort, PendingPort, PortError, ProxyPort,
};
pub use session::{SessionSnapshot, SubmissionSession, SubmitError, SubmitOptions, SubmitOutcome};
pub use signer::DeclineReason;
pub use state_machine::{SubmissionPhase, StateTransition};
pub use subscription::{StatusSender, StatusSubscription};
