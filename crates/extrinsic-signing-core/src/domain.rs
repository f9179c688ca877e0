use std::fmt;

use alloy::primitives::{keccak256, Bytes, B256};
use parity_scale_codec::{Compact, Encode};
use serde::{Deserialize, Serialize};

use crate::ports::PortError;

pub type Balance = u128;
pub type Nonce = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A chain operation. Two calls are the same call iff their SCALE encodings match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode)]
pub struct Call {
    pub pallet: String,
    pub method: String,
    pub args: Vec<CallArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode)]
pub enum CallArg {
    Empty,
    Bool(bool),
    U32(u32),
    Balance(Balance),
    Account(AccountId),
    Text(String),
    Bytes(Vec<u8>),
    Call(Box<Call>),
    Calls(Vec<Call>),
}

impl Call {
    pub fn new(pallet: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            pallet: pallet.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: CallArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn encoded(&self) -> Bytes {
        Bytes::from(self.encode())
    }

    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }

    pub fn path(&self) -> String {
        format!("{}.{}", self.pallet, self.method)
    }

    pub fn is(&self, pallet: &str, method: &str) -> bool {
        self.pallet == pallet && self.method == method
    }

    pub fn inner_calls(&self) -> Option<&[Call]> {
        self.args.iter().find_map(|arg| match arg {
            CallArg::Calls(calls) => Some(calls.as_slice()),
            _ => None,
        })
    }

    pub fn inner_call(&self) -> Option<&Call> {
        self.args.iter().find_map(|arg| match arg {
            CallArg::Call(call) => Some(call.as_ref()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ManualDevice {
    Ledger,
    Vault,
}

impl ManualDevice {
    pub fn is_hardware(self) -> bool {
        matches!(self, ManualDevice::Ledger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningSource {
    Extension(String),
    Manual(ManualDevice),
    ReadOnly,
}

impl SigningSource {
    pub fn is_manual(&self) -> bool {
        matches!(self, SigningSource::Manual(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: AccountId,
    pub source: SigningSource,
}

impl Account {
    pub fn new(address: impl Into<AccountId>, source: SigningSource) -> Self {
        Self {
            address: address.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyType {
    Any,
    NonTransfer,
    Staking,
    NominationPools,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: AccountId,
    pub delegate: AccountId,
    pub proxy_type: ProxyType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningContext {
    pub genesis_hash: B256,
    pub block_hash: B256,
    pub spec_version: u32,
    pub transaction_version: u32,
}

/// Everything an out-of-band signer needs to produce a signature for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningPayload {
    pub uid: u64,
    pub address: AccountId,
    pub call_data: Bytes,
    pub call_hash: B256,
    pub nonce: Nonce,
    pub tip: Balance,
    pub spec_version: u32,
    pub transaction_version: u32,
    pub genesis_hash: B256,
    pub block_hash: B256,
}

impl SigningPayload {
    /// Call data, explicit extensions (nonce, tip), then implicit ones (versions, hashes).
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.call_data.len() + 96);
        out.extend_from_slice(&self.call_data);
        Compact(self.nonce).encode_to(&mut out);
        Compact(self.tip).encode_to(&mut out);
        self.spec_version.encode_to(&mut out);
        self.transaction_version.encode_to(&mut out);
        out.extend_from_slice(self.genesis_hash.as_slice());
        out.extend_from_slice(self.block_hash.as_slice());
        out
    }

    pub fn digest(&self) -> B256 {
        keccak256(self.signing_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedExtrinsic {
    pub call: Call,
    pub signer: AccountId,
    pub signature: Bytes,
    pub payload: SigningPayload,
}

impl SignedExtrinsic {
    /// Attaches an externally produced signature to `call`. The payload must have been
    /// built for this exact call and signer.
    pub fn from_parts(
        call: Call,
        signer: AccountId,
        signature: Bytes,
        payload: SigningPayload,
    ) -> Result<Self, PortError> {
        if signature.is_empty() {
            return Err(PortError::Validation("INVALID_SIGNATURE_FORMAT".to_owned()));
        }
        if payload.address != signer {
            return Err(PortError::Validation(format!(
                "STALE_PAYLOAD: payload built for {}, submitting as {signer}",
                payload.address
            )));
        }
        if payload.call_hash != call.hash() {
            return Err(PortError::Validation(format!(
                "STALE_PAYLOAD: payload call hash {} does not match call {}",
                payload.call_hash,
                call.path()
            )));
        }
        Ok(Self {
            call,
            signer,
            signature,
            payload,
        })
    }

    pub fn nonce(&self) -> Nonce {
        self.payload.nonce
    }

    pub fn hash(&self) -> B256 {
        let mut bytes = self.payload.signing_bytes();
        bytes.extend_from_slice(&self.signature);
        keccak256(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Future,
    Ready,
    Broadcast,
    InBlock(B256),
    Retracted(B256),
    FinalityTimeout(B256),
    Finalized(B256),
    Usurped(B256),
    Dropped,
    Invalid,
}

impl TxStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, TxStatus::Ready)
    }

    pub fn is_in_block(&self) -> bool {
        matches!(self, TxStatus::InBlock(_))
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, TxStatus::Finalized(_))
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(
            self,
            TxStatus::FinalityTimeout(_)
                | TxStatus::Usurped(_)
                | TxStatus::Dropped
                | TxStatus::Invalid
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub pallet: String,
    pub method: String,
}

impl ChainEvent {
    pub fn new(pallet: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            pallet: pallet.into(),
            method: method.into(),
        }
    }

    pub fn extrinsic_success() -> Self {
        Self::new("system", "ExtrinsicSuccess")
    }

    pub fn extrinsic_failed() -> Self {
        Self::new("system", "ExtrinsicFailed")
    }

    pub fn outcome(&self) -> Option<ExtrinsicOutcome> {
        if self.pallet != "system" {
            return None;
        }
        match self.method.as_str() {
            "ExtrinsicSuccess" => Some(ExtrinsicOutcome::Success),
            "ExtrinsicFailed" => Some(ExtrinsicOutcome::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrinsicOutcome {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: TxStatus,
    pub events: Vec<ChainEvent>,
}

impl StatusUpdate {
    pub fn new(status: TxStatus) -> Self {
        Self {
            status,
            events: Vec::new(),
        }
    }

    pub fn with_events(status: TxStatus, events: Vec<ChainEvent>) -> Self {
        Self { status, events }
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    pub fn is_in_block(&self) -> bool {
        self.status.is_in_block()
    }

    pub fn is_finalized(&self) -> bool {
        self.status.is_finalized()
    }

    pub fn outcome(&self) -> Option<ExtrinsicOutcome> {
        self.events.iter().find_map(ChainEvent::outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PendingKey {
    pub sender: AccountId,
    pub nonce: Nonce,
}

impl fmt::Display for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.sender, self.nonce)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Pending,
    InBlock,
    Finalized,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub subtitle: String,
}

impl From<NotificationKind> for Notification {
    fn from(kind: NotificationKind) -> Self {
        let (title, subtitle) = match kind {
            NotificationKind::Pending => ("Pending", "Transaction initiated."),
            NotificationKind::InBlock => ("In Block", "Transaction in block."),
            NotificationKind::Finalized => ("Finalized", "Transaction successful."),
            NotificationKind::Failed => ("Failed", "Error with transaction."),
            NotificationKind::Cancelled => ("Cancelled", "Transaction cancelled."),
        };
        Self {
            kind,
            title: title.to_owned(),
            subtitle: subtitle.to_owned(),
        }
    }
}
