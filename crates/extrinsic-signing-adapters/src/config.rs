use std::str::FromStr;

use alloy::primitives::{keccak256, B256};
use extrinsic_signing_core::config::parse_flag;
use extrinsic_signing_core::{Balance, Nonce};

#[derive(Debug, Clone)]
pub struct DevChainConfig {
    /// Fee is `base_fee + byte_fee * encoded_call_len`.
    pub base_fee: Balance,
    pub byte_fee: Balance,
    pub starting_nonce: Nonce,
    pub spec_version: u32,
    pub transaction_version: u32,
    pub genesis_hash: B256,
    /// Unscripted submissions run Ready, InBlock, Finalized(success).
    pub auto_finalize: bool,
}

impl Default for DevChainConfig {
    fn default() -> Self {
        Self {
            base_fee: 100_000_000,
            byte_fee: 1_000_000,
            starting_nonce: 0,
            spec_version: 1_002_000,
            transaction_version: 26,
            genesis_hash: keccak256(b"extrinsic-signing-dev-chain"),
            auto_finalize: true,
        }
    }
}

impl DevChainConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_fee: env_parse("EXTRINSIC_DEV_BASE_FEE").unwrap_or(defaults.base_fee),
            byte_fee: env_parse("EXTRINSIC_DEV_BYTE_FEE").unwrap_or(defaults.byte_fee),
            starting_nonce: env_parse("EXTRINSIC_DEV_STARTING_NONCE")
                .unwrap_or(defaults.starting_nonce),
            spec_version: env_parse("EXTRINSIC_DEV_SPEC_VERSION").unwrap_or(defaults.spec_version),
            transaction_version: env_parse("EXTRINSIC_DEV_TX_VERSION")
                .unwrap_or(defaults.transaction_version),
            genesis_hash: env_parse("EXTRINSIC_DEV_GENESIS").unwrap_or(defaults.genesis_hash),
            auto_finalize: std::env::var("EXTRINSIC_DEV_AUTO_FINALIZE")
                .ok()
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(defaults.auto_finalize),
        }
    }

    pub fn fee_for(&self, encoded_len: usize) -> Balance {
        self.base_fee
            .saturating_add(self.byte_fee.saturating_mul(encoded_len as Balance))
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
