pub mod accounts;
pub mod config;
pub mod dev_chain;
pub mod extensions;
pub mod hardware;
pub mod notifications;
pub mod pending;
pub mod proxies;

pub use accounts::AccountsAdapter;
pub use config::DevChainConfig;
pub use dev_chain::{block_hash, DevChainAdapter, SubmissionRoute, SubmittedExtrinsic};
pub use extensions::{DeterministicSigner, ExtensionAdapter};
pub use hardware::{HardwareAdapter, HardwareState};
pub use notifications::NotificationAdapter;
pub use pending::{PendingAdapter, PendingOp};
pub use proxies::ProxyAdapter;
