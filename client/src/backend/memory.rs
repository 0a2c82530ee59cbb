//! In-process backend
//!
//! Holds everything in a map behind a `tokio` lock. Availability and
//! per-key failures can be switched on to exercise the error paths of the
//! store and workflows.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use crate::error::{ClientError, Result};
use super::{KvBackend, TransactionAck};

#[derive(Debug)]
struct MemoryState {
    data: HashMap<String, Vec<u8>>,
    available: bool,
    probe_fails: bool,
    failing_writes: Vec<String>,
    failing_reads: Vec<String>,
    write_budget: Option<usize>,
    writes: usize,
}

/// Backend storing all entries in memory
#[derive(Debug)]
pub struct InMemoryBackend {
    state: RwLock<MemoryState>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Create an empty, available backend
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                data: HashMap::new(),
                available: true,
                probe_fails: false,
                failing_writes: Vec::new(),
                failing_reads: Vec::new(),
                write_budget: None,
                writes: 0,
            }),
        }
    }

    /// Set what `is_available` reports
    pub async fn set_available(&self, available: bool) {
        self.state.write().await.available = available;
    }

    /// Make `is_available` fail with a transport error
    pub async fn fail_probe(&self, fails: bool) {
        self.state.write().await.probe_fails = fails;
    }

    /// Fail every write to a key starting with `prefix`
    pub async fn fail_writes_with_prefix(&self, prefix: impl Into<String>) {
        self.state.write().await.failing_writes.push(prefix.into());
    }

    /// Fail every read of a key starting with `prefix`
    pub async fn fail_reads_with_prefix(&self, prefix: impl Into<String>) {
        self.state.write().await.failing_reads.push(prefix.into());
    }

    /// Accept `count` more writes, then fail every write after that
    pub async fn fail_writes_after(&self, count: usize) {
        self.state.write().await.write_budget = Some(count);
    }

    /// Remove all injected failures
    pub async fn clear_failures(&self) {
        let mut state = self.state.write().await;
        state.failing_writes.clear();
        state.failing_reads.clear();
        state.write_budget = None;
        state.probe_fails = false;
    }

    /// Write raw bytes, bypassing failure injection
    pub async fn insert_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.state.write().await.data.insert(key.into(), value.into());
    }

    /// Raw bytes under `key`, if any
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().await.data.get(key).cloned()
    }

    /// Number of keys held
    pub async fn len(&self) -> usize {
        self.state.read().await.data.len()
    }

    /// Whether no keys are held
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.data.is_empty()
    }

    /// Number of successful writes so far
    pub async fn write_count(&self) -> usize {
        self.state.read().await.writes
    }
}

#[async_trait]
impl KvBackend for InMemoryBackend {
    async fn is_available(&self) -> Result<bool> {
        let state = self.state.read().await;
        if state.probe_fails {
            return Err(ClientError::Transport("availability probe failed".to_string()));
        }
        Ok(state.available)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        let state = self.state.read().await;
        if state.failing_reads.iter().any(|prefix| key.starts_with(prefix.as_str())) {
            return Err(ClientError::Transport(format!("read of {} failed", key)));
        }
        Ok(state.data.get(key).cloned().unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TransactionAck> {
        let mut state = self.state.write().await;
        if state.failing_writes.iter().any(|prefix| key.starts_with(prefix.as_str())) {
            return Err(ClientError::Transport(format!("write of {} failed", key)));
        }
        match state.write_budget {
            Some(0) => return Err(ClientError::Transport(format!("write of {} failed", key))),
            Some(ref mut left) => *left -= 1,
            None => {}
        }

        debug!("memory backend: set {} ({} bytes)", key, value.len());
        state.data.insert(key.to_string(), value);
        state.writes += 1;

        Ok(TransactionAck::local())
    }
}
