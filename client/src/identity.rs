//! Caller identity and signing
//!
//! An identity knows whether it is connected, which address it speaks for,
//! and can be asked to sign a message. Declining is a normal outcome and
//! is reported as `SignatureOutcome::Declined`, not as an error.

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Signature};
use log::debug;

use crate::error::{ClientError, Result};

/// Result of a signature request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureOutcome {
    /// The identity produced a signature
    Signed(Signature),

    /// The user declined to sign
    Declined,
}

/// A connected (or disconnected) signing identity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Identity: Send + Sync {
    /// Address of the identity, if connected
    fn address(&self) -> Option<Address>;

    /// Whether the identity is connected
    fn is_connected(&self) -> bool {
        self.address().is_some()
    }

    /// Ask the identity to sign `message`
    async fn sign(&self, message: &str) -> Result<SignatureOutcome>;
}

/// Identity backed by a local private key
///
/// Signs every request unless told to decline, which lets callers model a
/// user who refuses the prompt.
#[derive(Debug, Clone)]
pub struct WalletIdentity {
    wallet: LocalWallet,
    decline: bool,
}

impl WalletIdentity {
    /// Wrap a wallet
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet, decline: false }
    }

    /// Create an identity with a fresh random key
    pub fn random() -> Self {
        Self::new(LocalWallet::new(&mut ethers::core::rand::thread_rng()))
    }

    /// Decline every future signature request
    pub fn declining(mut self) -> Self {
        self.decline = true;
        self
    }

    /// The underlying wallet
    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }
}

#[async_trait]
impl Identity for WalletIdentity {
    fn address(&self) -> Option<Address> {
        Some(self.wallet.address())
    }

    async fn sign(&self, message: &str) -> Result<SignatureOutcome> {
        if self.decline {
            debug!("Declining signature request for {:?}", self.wallet.address());
            return Ok(SignatureOutcome::Declined);
        }

        let signature = self.wallet
            .sign_message(message)
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        Ok(SignatureOutcome::Signed(signature))
    }
}

/// Identity with no wallet connected
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

#[async_trait]
impl Identity for Disconnected {
    fn address(&self) -> Option<Address> {
        None
    }

    async fn sign(&self, _message: &str) -> Result<SignatureOutcome> {
        Err(ClientError::NotAuthenticated)
    }
}
