//! Client library for the mood museum
//!
//! This library stores encoded moods and their exhibit recommendations on
//! a flat key/value backend, and reveals stored payloads to a caller that
//! proves control of its identity by signing a challenge.

pub mod backend;
pub mod client;
pub mod error;
pub mod identity;
pub mod probe;
pub mod reveal;
pub mod session;
pub mod store;
pub mod submission;

pub use backend::{ContractBackend, ContractConfig, InMemoryBackend, KvBackend, SqliteBackend, TransactionAck};
pub use client::MuseumClient;
pub use error::{ClientError, Result};
pub use identity::{Disconnected, Identity, SignatureOutcome, WalletIdentity};
pub use probe::{check_availability, Availability};
pub use reveal::{RevealOutcome, RevealWorkflow};
pub use session::SessionContext;
pub use store::{read_exhibits, read_moods, KeyedCollectionStore, KvCollectionStore};
pub use submission::{MoodSubmission, SubmissionReport, SubmissionState, SubmissionWorkflow};
