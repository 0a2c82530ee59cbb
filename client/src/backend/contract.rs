// SPDX-License-Identifier: MIT
//! Contract backend
//!
//! This module provides integration with the on-chain key/value contract
//! that holds mood and exhibit entries. Reads go through a plain provider;
//! writes need an operator key and go through a signer middleware.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::{abigen, ContractError};
use ethers::core::types::{Address, Bytes};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{is_user_rejection, ClientError, Result};
use super::{KvBackend, TransactionAck};

// Generate contract bindings
abigen!(
    MoodStore,
    r#"[
        function isAvailable() external view returns (bool)
        function getData(string key) external view returns (bytes)
        function setData(string key, bytes value) external
    ]"#
);

/// Configuration for the contract backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the key/value contract
    pub contract_address: String,

    /// RPC endpoint for the Ethereum node
    pub rpc_endpoint: String,

    /// Private key used to send writes
    pub private_key: Option<String>,

    /// Chain ID
    pub chain_id: u64,

    /// Confirmations to wait for after a write
    pub confirmations: usize,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            rpc_endpoint: "http://localhost:8545".to_string(),
            private_key: None,
            chain_id: 31337, // Local Anvil chain
            confirmations: 1,
        }
    }
}

impl ContractConfig {
    /// Parse the configured contract address
    pub fn address(&self) -> Result<Address> {
        self.contract_address
            .parse::<Address>()
            .map_err(|e| ClientError::Config(format!("Invalid contract address: {}", e)))
    }

    /// Parse the configured private key into a chain-bound wallet
    pub fn wallet(&self) -> Result<Option<LocalWallet>> {
        self.private_key
            .as_deref()
            .map(|key| {
                LocalWallet::from_str(key)
                    .map(|wallet| wallet.with_chain_id(self.chain_id))
                    .map_err(|e| ClientError::Config(format!("Failed to create wallet: {}", e)))
            })
            .transpose()
    }
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Backend talking to the deployed contract
pub struct ContractBackend {
    config: ContractConfig,
    address: Address,
    reader: MoodStore<Provider<Http>>,
    writer: Option<MoodStore<SignerClient>>,
}

impl ContractBackend {
    /// Connect to the contract described by `config`
    ///
    /// Without a private key the backend is read-only and writes fail with
    /// `NotAuthenticated`.
    pub fn connect(config: ContractConfig) -> Result<Self> {
        info!("Connecting to contract {} via {}", config.contract_address, config.rpc_endpoint);

        let provider = Provider::<Http>::try_from(config.rpc_endpoint.as_str())
            .map_err(|e| ClientError::Config(format!("Failed to create provider: {}", e)))?;
        let address = config.address()?;

        let reader = MoodStore::new(address, Arc::new(provider.clone()));
        let writer = match config.wallet()? {
            Some(wallet) => {
                info!("Writes will be sent from {:?}", wallet.address());
                let client = SignerMiddleware::new(provider, wallet);
                Some(MoodStore::new(address, Arc::new(client)))
            }
            None => {
                info!("No private key provided, contract backend is read-only");
                None
            }
        };

        Ok(Self {
            config,
            address,
            reader,
            writer,
        })
    }

    /// Address of the contract
    pub fn address(&self) -> Address {
        self.address
    }

    /// Chain the contract lives on
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Address writes are sent from, if writable
    pub fn signer_address(&self) -> Option<Address> {
        self.writer.as_ref().map(|writer| writer.client().signer().address())
    }
}

fn map_contract_error<M: Middleware>(action: &str, err: ContractError<M>) -> ClientError {
    let message = err.to_string();
    if is_user_rejection(&message) {
        return ClientError::SignatureDeclined;
    }
    ClientError::Transport(format!("Failed to {}: {}", action, message))
}

#[async_trait]
impl KvBackend for ContractBackend {
    async fn is_available(&self) -> Result<bool> {
        self.reader
            .is_available()
            .call()
            .await
            .map_err(|e| map_contract_error("check availability", e))
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        let value = self.reader
            .get_data(key.to_string())
            .call()
            .await
            .map_err(|e| map_contract_error("read data", e))?;
        Ok(value.to_vec())
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TransactionAck> {
        let writer = self.writer.as_ref().ok_or(ClientError::NotAuthenticated)?;

        let call = writer.set_data(key.to_string(), Bytes::from(value));
        let pending_tx = call
            .send()
            .await
            .map_err(|e| map_contract_error("send transaction", e))?;

        let tx_hash = format!("{:?}", pending_tx.tx_hash());
        debug!("setData({}) sent in {}", key, tx_hash);

        let receipt = pending_tx
            .confirmations(self.config.confirmations)
            .await
            .map_err(|e| ClientError::Transport(format!("Transaction {} failed: {}", tx_hash, e)))?;

        let block_number = match receipt {
            Some(receipt) => receipt.block_number.map(|block| block.as_u64()),
            None => {
                warn!("Transaction {} dropped from the mempool", tx_hash);
                return Err(ClientError::Transport(format!("Transaction {} dropped", tx_hash)));
            }
        };

        Ok(TransactionAck {
            tx_hash: Some(tx_hash),
            block_number,
        })
    }
}
