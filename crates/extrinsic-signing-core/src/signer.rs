use std::fmt;
use std::sync::Arc;

use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    Account, AccountId, Call, ManualDevice, Nonce, SignedExtrinsic, SigningPayload, SigningSource,
};
use crate::ports::{ChainRpcPort, ExtensionPort, ExtensionStatus, ExtrinsicSigner, PortError};
use crate::subscription::StatusSubscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineReason {
    MissingAccount,
    ReadOnlyAccount,
    AlreadySubmitting,
    NotReady,
    Disconnected,
    SignatureMissing,
    PayloadMissing,
}

pub enum SignerBackend {
    Extension {
        id: String,
        signer: Arc<dyn ExtrinsicSigner>,
        needs_enable: bool,
    },
    Manual {
        device: ManualDevice,
        signature: Bytes,
        payload: SigningPayload,
    },
}

pub enum Resolution {
    Backend(SignerBackend),
    Declined(DeclineReason),
    NotFound(String),
}

/// Classifies `account`'s signing source. Manual sources resolve only once both the
/// out-of-band signature and the payload it was produced for are staged.
pub fn resolve<E: ExtensionPort>(
    account: &Account,
    extensions: &E,
    signature: Option<Bytes>,
    payload: Option<SigningPayload>,
) -> Resolution {
    match &account.source {
        SigningSource::ReadOnly => Resolution::Declined(DeclineReason::ReadOnlyAccount),
        SigningSource::Manual(device) => match (signature, payload) {
            (None, _) => Resolution::Declined(DeclineReason::SignatureMissing),
            (Some(_), None) => Resolution::Declined(DeclineReason::PayloadMissing),
            (Some(signature), Some(payload)) => Resolution::Backend(SignerBackend::Manual {
                device: *device,
                signature,
                payload,
            }),
        },
        SigningSource::Extension(id) => {
            let status = extensions.status(id);
            if status == ExtensionStatus::Missing {
                return Resolution::NotFound(id.clone());
            }
            match extensions.signer(id) {
                Some(signer) => Resolution::Backend(SignerBackend::Extension {
                    id: id.clone(),
                    signer,
                    needs_enable: status != ExtensionStatus::Enabled,
                }),
                None => Resolution::NotFound(id.clone()),
            }
        }
    }
}

impl SignerBackend {
    pub fn manual_device(&self) -> Option<ManualDevice> {
        match self {
            SignerBackend::Manual { device, .. } => Some(*device),
            SignerBackend::Extension { .. } => None,
        }
    }

    /// The nonce a manual signature was produced over. The extrinsic goes out with it,
    /// whatever the account's next index is by now.
    pub fn signed_nonce(&self) -> Option<Nonce> {
        match self {
            SignerBackend::Manual { payload, .. } => Some(payload.nonce),
            SignerBackend::Extension { .. } => None,
        }
    }

    pub async fn enable<E: ExtensionPort>(
        &self,
        extensions: &E,
        app_name: &str,
    ) -> Result<(), PortError> {
        if let SignerBackend::Extension {
            id,
            needs_enable: true,
            ..
        } = self
        {
            debug!(extension = %id, app_name, "enabling extension");
            extensions.enable(id, app_name).await?;
        }
        Ok(())
    }

    pub async fn submit<C: ChainRpcPort>(
        &self,
        chain: &C,
        call: &Call,
        sender: &AccountId,
        nonce: Nonce,
    ) -> Result<StatusSubscription, PortError> {
        match self {
            SignerBackend::Manual {
                signature, payload, ..
            } => {
                let extrinsic = SignedExtrinsic::from_parts(
                    call.clone(),
                    sender.clone(),
                    signature.clone(),
                    payload.clone(),
                )?;
                chain.submit(extrinsic).await
            }
            SignerBackend::Extension { signer, .. } => {
                chain
                    .sign_and_submit(call, sender, nonce, signer.as_ref())
                    .await
            }
        }
    }
}

impl fmt::Debug for SignerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerBackend::Extension {
                id, needs_enable, ..
            } => f
                .debug_struct("Extension")
                .field("id", id)
                .field("needs_enable", needs_enable)
                .finish_non_exhaustive(),
            SignerBackend::Manual {
                device, payload, ..
            } => f
                .debug_struct("Manual")
                .field("device", device)
                .field("payload_uid", &payload.uid)
                .finish_non_exhaustive(),
        }
    }
}
