use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

use extrinsic_signing_core::{HardwarePort, ManualDevice};

/// Signing UI state a hardware device keeps between prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HardwareState {
    pub executing: bool,
    pub status_codes: Vec<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HardwareAdapter {
    state: Arc<Mutex<HardwareRegistry>>,
}

#[derive(Debug, Default)]
struct HardwareRegistry {
    devices: BTreeMap<ManualDevice, HardwareState>,
    resets: Vec<ManualDevice>,
}

impl HardwareAdapter {
    fn state(&self) -> MutexGuard<'_, HardwareRegistry> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The device starts a signing prompt.
    pub fn begin_signing(&self, device: ManualDevice, status_code: &str, feedback: &str) {
        let mut state = self.state();
        let entry = state.devices.entry(device).or_default();
        entry.executing = true;
        entry.status_codes.push(status_code.to_owned());
        entry.feedback = Some(feedback.to_owned());
    }

    pub fn device_state(&self, device: ManualDevice) -> HardwareState {
        self.state()
            .devices
            .get(&device)
            .cloned()
            .unwrap_or_default()
    }

    pub fn resets(&self) -> Vec<ManualDevice> {
        self.state().resets.clone()
    }
}

impl HardwarePort for HardwareAdapter {
    fn reset(&self, device: ManualDevice) {
        let mut state = self.state();
        state.devices.insert(device, HardwareState::default());
        state.resets.push(device);
        debug!(?device, "hardware signing state reset");
    }
}
