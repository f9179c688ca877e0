use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{keccak256, Bytes};
use async_trait::async_trait;
use tracing::{debug, info};

use extrinsic_signing_core::{
    ExtensionPort, ExtensionStatus, ExtrinsicSigner, PortError, SigningPayload,
};

/// Browser-extension registry. Installed extensions sign deterministically so
/// tests can assert on exact signatures.
#[derive(Debug, Clone, Default)]
pub struct ExtensionAdapter {
    state: Arc<Mutex<ExtensionState>>,
    signatures: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct ExtensionState {
    installed: BTreeMap<String, InstalledExtension>,
    enable_calls: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct InstalledExtension {
    enabled: bool,
    reject_enable: bool,
    reject_signing: bool,
}

impl ExtensionAdapter {
    fn state(&self) -> MutexGuard<'_, ExtensionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn install(&self, id: &str) {
        self.state()
            .installed
            .insert(id.to_owned(), InstalledExtension::default());
    }

    pub fn install_enabled(&self, id: &str) {
        self.state().installed.insert(
            id.to_owned(),
            InstalledExtension {
                enabled: true,
                ..InstalledExtension::default()
            },
        );
    }

    pub fn uninstall(&self, id: &str) {
        self.state().installed.remove(id);
    }

    /// The user dismisses the enable prompt.
    pub fn reject_enable(&self, id: &str, reject: bool) {
        if let Some(extension) = self.state().installed.get_mut(id) {
            extension.reject_enable = reject;
        }
    }

    /// The user dismisses the signing popup.
    pub fn reject_signing(&self, id: &str, reject: bool) {
        if let Some(extension) = self.state().installed.get_mut(id) {
            extension.reject_signing = reject;
        }
    }

    pub fn enable_calls(&self) -> usize {
        self.state().enable_calls
    }

    pub fn signatures(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtensionPort for ExtensionAdapter {
    fn status(&self, extension_id: &str) -> ExtensionStatus {
        match self.state().installed.get(extension_id) {
            None => ExtensionStatus::Missing,
            Some(extension) if extension.enabled => ExtensionStatus::Enabled,
            Some(_) => ExtensionStatus::Installed,
        }
    }

    async fn enable(&self, extension_id: &str, app_name: &str) -> Result<(), PortError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| PortError::Transport(format!("extension lock poisoned: {e}")))?;
        state.enable_calls += 1;
        let extension = state
            .installed
            .get_mut(extension_id)
            .ok_or_else(|| PortError::NotFound(format!("extension {extension_id}")))?;
        if extension.reject_enable {
            return Err(PortError::Rejected(format!(
                "{extension_id} refused access for {app_name}"
            )));
        }
        extension.enabled = true;
        info!(extension = extension_id, app_name, "extension enabled");
        Ok(())
    }

    fn signer(&self, extension_id: &str) -> Option<Arc<dyn ExtrinsicSigner>> {
        let extension = *self.state().installed.get(extension_id)?;
        Some(Arc::new(DeterministicSigner {
            extension_id: extension_id.to_owned(),
            reject: extension.reject_signing,
            signatures: Arc::clone(&self.signatures),
        }))
    }
}

#[derive(Debug)]
pub struct DeterministicSigner {
    extension_id: String,
    reject: bool,
    signatures: Arc<AtomicUsize>,
}

impl DeterministicSigner {
    pub fn signature_for(extension_id: &str, payload: &SigningPayload) -> Bytes {
        let mut seed = Vec::new();
        seed.extend_from_slice(extension_id.as_bytes());
        seed.extend_from_slice(payload.address.as_str().as_bytes());
        seed.extend_from_slice(&payload.signing_bytes());
        let hash = keccak256(seed);
        let mut sig = Vec::with_capacity(64);
        sig.extend_from_slice(hash.as_slice());
        sig.extend_from_slice(keccak256(hash).as_slice());
        Bytes::from(sig)
    }
}

#[async_trait]
impl ExtrinsicSigner for DeterministicSigner {
    async fn sign(&self, payload: &SigningPayload) -> Result<Bytes, PortError> {
        if self.reject {
            return Err(PortError::Rejected("Cancelled".to_owned()));
        }
        self.signatures.fetch_add(1, Ordering::SeqCst);
        debug!(
            extension = %self.extension_id,
            address = %payload.address,
            nonce = payload.nonce,
            "payload signed"
        );
        Ok(Self::signature_for(&self.extension_id, payload))
    }
}
