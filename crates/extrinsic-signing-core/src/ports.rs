use std::sync::Arc;

use alloy::primitives::Bytes;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    Account, AccountId, Balance, Call, Delegation, ManualDevice, Nonce, Notification, PendingKey,
    SignedExtrinsic, SigningContext, SigningPayload,
};
use crate::subscription::StatusSubscription;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("rejected by user: {0}")]
    Rejected(String),
}

impl PortError {
    /// The user dismissed a wallet prompt rather than something breaking.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, PortError::Rejected(_))
    }
}

#[async_trait]
pub trait ChainRpcPort: Send + Sync {
    fn is_connected(&self) -> bool;
    async fn payment_info(&self, call: &Call, sender: &AccountId) -> Result<Balance, PortError>;
    async fn account_next_index(&self, sender: &AccountId) -> Result<Nonce, PortError>;
    async fn signing_context(&self) -> Result<SigningContext, PortError>;
    async fn submit(&self, extrinsic: SignedExtrinsic) -> Result<StatusSubscription, PortError>;
    async fn sign_and_submit(
        &self,
        call: &Call,
        sender: &AccountId,
        nonce: Nonce,
        signer: &dyn ExtrinsicSigner,
    ) -> Result<StatusSubscription, PortError>;
}

/// Signing capability handed out by an injected wallet extension.
#[async_trait]
pub trait ExtrinsicSigner: Send + Sync {
    async fn sign(&self, payload: &SigningPayload) -> Result<Bytes, PortError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionStatus {
    Missing,
    Installed,
    Enabled,
}

#[async_trait]
pub trait ExtensionPort: Send + Sync {
    fn status(&self, extension_id: &str) -> ExtensionStatus;
    async fn enable(&self, extension_id: &str, app_name: &str) -> Result<(), PortError>;
    fn signer(&self, extension_id: &str) -> Option<Arc<dyn ExtrinsicSigner>>;
}

pub trait AccountsPort: Send + Sync {
    fn account(&self, address: &AccountId) -> Option<Account>;
}

pub trait ProxyPort: Send + Sync {
    fn active_delegate(&self, delegator: &AccountId) -> Option<Delegation>;
}

pub trait NotificationPort: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait PendingPort: Send + Sync {
    fn add(&self, key: PendingKey);
    fn remove(&self, key: &PendingKey);
    fn contains(&self, key: &PendingKey) -> bool;
}

pub trait HardwarePort: Send + Sync {
    /// Clears the device's executing flag, status codes and feedback.
    fn reset(&self, device: ManualDevice);
}
