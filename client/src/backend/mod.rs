//! Key/value backend capability
//!
//! The store only needs three operations from its backend: an availability
//! check, a byte read, and a byte write. Empty bytes from a read mean the
//! key is absent. Implementations here cover an in-process map, a local
//! SQLite file, and the on-chain contract.

mod memory;
mod sqlite;
pub mod contract;

pub use memory::InMemoryBackend;
pub use sqlite::SqliteBackend;
pub use contract::{ContractBackend, ContractConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Acknowledgement of a write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAck {
    /// Transaction hash, for backends that produce one
    pub tx_hash: Option<String>,

    /// Block the write was included in, if known
    pub block_number: Option<u64>,
}

impl TransactionAck {
    /// Acknowledgement for a backend without transactions
    pub fn local() -> Self {
        Self::default()
    }
}

/// A flat key/value store with no enumeration
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Whether the backend currently accepts operations
    async fn is_available(&self) -> Result<bool>;

    /// Read the value under `key`; empty when absent
    async fn get_data(&self, key: &str) -> Result<Vec<u8>>;

    /// Write `value` under `key`
    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TransactionAck>;
}
