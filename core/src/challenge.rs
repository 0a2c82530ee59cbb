//! Reveal challenge message
//!
//! Before a payload is decoded for display the owner signs a challenge
//! message built from the current session parameters. The format and field
//! order are fixed, so the same session always yields the same message.

use std::fmt;

use chrono::{DateTime, Utc};
use ethers::types::Address;
use ethers::utils::to_checksum;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of hex digits in generated session key material
pub const PUBLIC_KEY_HEX_DIGITS: usize = 2000;

/// Default validity window of a session, in days
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Parameters of a reveal challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeMessage {
    /// Session public key material, `0x`-prefixed hex
    pub public_key: String,

    /// Address of the contract holding the records
    pub contract_address: Address,

    /// Chain the contract lives on
    pub chain_id: u64,

    /// Session start, Unix seconds
    pub start_timestamp: i64,

    /// Validity window in days
    pub duration_days: u32,
}

impl ChallengeMessage {
    /// Build a challenge from session parameters
    pub fn new(
        public_key: impl Into<String>,
        contract_address: Address,
        chain_id: u64,
        start: DateTime<Utc>,
        duration_days: u32,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            contract_address,
            chain_id,
            start_timestamp: start.timestamp(),
            duration_days,
        }
    }

    /// The exact message text to be signed
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChallengeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key,
            to_checksum(&self.contract_address, None),
            self.chain_id,
            self.start_timestamp,
            self.duration_days,
        )
    }
}

/// Generate fresh session key material (`0x` + 2000 hex digits)
pub fn generate_public_key() -> String {
    let mut bytes = vec![0u8; PUBLIC_KEY_HEX_DIGITS / 2];
    rand::thread_rng().fill(bytes.as_mut_slice());
    format!("0x{}", hex::encode(bytes))
}
