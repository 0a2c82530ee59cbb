//! Session context
//!
//! Everything a workflow needs to know about the caller travels in one
//! value: the identity, the contract and chain it is talking to, and the
//! reveal challenge parameters fixed at session start.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ethers::types::Address;
use mood_museum_core::challenge::{generate_public_key, ChallengeMessage};
use mood_museum_core::config::ChallengeConfig;

use crate::identity::Identity;

/// Per-session caller context
#[derive(Clone)]
pub struct SessionContext {
    identity: Arc<dyn Identity>,
    contract_address: Address,
    chain_id: u64,
    public_key: String,
    started_at: DateTime<Utc>,
    duration_days: u32,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("address", &self.identity.address())
            .field("contract_address", &self.contract_address)
            .field("chain_id", &self.chain_id)
            .field("started_at", &self.started_at)
            .field("duration_days", &self.duration_days)
            .finish()
    }
}

impl SessionContext {
    /// Start a session now with fresh key material
    pub fn start(
        identity: Arc<dyn Identity>,
        contract_address: Address,
        chain_id: u64,
        config: &ChallengeConfig,
    ) -> Self {
        Self::with_parameters(
            identity,
            contract_address,
            chain_id,
            generate_public_key(),
            Utc::now(),
            config.duration_days,
        )
    }

    /// Build a session from explicit parameters
    pub fn with_parameters(
        identity: Arc<dyn Identity>,
        contract_address: Address,
        chain_id: u64,
        public_key: String,
        started_at: DateTime<Utc>,
        duration_days: u32,
    ) -> Self {
        Self {
            identity,
            contract_address,
            chain_id,
            public_key,
            started_at,
            duration_days,
        }
    }

    /// The caller's identity
    pub fn identity(&self) -> &dyn Identity {
        self.identity.as_ref()
    }

    /// Whether the caller is connected
    pub fn is_connected(&self) -> bool {
        self.identity.is_connected()
    }

    /// The caller's address, if connected
    pub fn address(&self) -> Option<Address> {
        self.identity.address()
    }

    /// Contract the session talks to
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Chain the session talks to
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// When the session started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The reveal challenge for this session
    pub fn challenge(&self) -> ChallengeMessage {
        ChallengeMessage::new(
            self.public_key.clone(),
            self.contract_address,
            self.chain_id,
            self.started_at,
            self.duration_days,
        )
    }
}
