//! Backend availability probe

use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::backend::KvBackend;

/// Outcome of an availability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// The backend accepts operations
    Available,

    /// The backend answered that it does not accept operations
    Unavailable,

    /// The probe itself could not reach the backend
    ProbeError(String),
}

impl Availability {
    /// Whether operations can proceed
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "Contract is available and ready to process your mood"),
            Availability::Unavailable => write!(f, "Contract is currently unavailable"),
            Availability::ProbeError(reason) => write!(f, "Error checking contract availability: {}", reason),
        }
    }
}

/// Ask the backend whether it is available
///
/// Never mutates backend state.
pub async fn check_availability<B: KvBackend + ?Sized>(backend: &B) -> Availability {
    match backend.is_available().await {
        Ok(true) => {
            info!("Backend is available");
            Availability::Available
        }
        Ok(false) => {
            info!("Backend reports unavailable");
            Availability::Unavailable
        }
        Err(e) => {
            warn!("Availability probe failed: {}", e);
            Availability::ProbeError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    #[tokio::test]
    async fn test_available() {
        let backend = InMemoryBackend::new();
        assert_eq!(check_availability(&backend).await, Availability::Available);
    }

    #[tokio::test]
    async fn test_unavailable_is_not_a_probe_error() {
        let backend = InMemoryBackend::new();
        backend.set_available(false).await;

        let outcome = check_availability(&backend).await;
        assert_eq!(outcome, Availability::Unavailable);
        assert!(!outcome.is_available());
    }

    #[tokio::test]
    async fn test_transport_failure_is_probe_error() {
        let backend = InMemoryBackend::new();
        backend.fail_probe(true).await;

        assert!(matches!(check_availability(&backend).await, Availability::ProbeError(_)));
        assert_eq!(backend.write_count().await, 0);
    }
}
