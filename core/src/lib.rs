//! # Mood Museum Core
//!
//! Core data structures for Mood Museum: the payload codec, the record
//! models and their key/value layout, the recommendation table and the
//! reveal challenge message.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod challenge;
pub mod codec;
pub mod config;
pub mod error;
pub mod id;
pub mod models;
pub mod recommend;

/// Re-export common types for ease of use
pub use challenge::ChallengeMessage;
pub use config::MuseumConfig;
pub use error::{CoreError, Result};
pub use models::{Collection, ExhibitRecord, MoodRecord, MoodSnapshot, Record};
pub use recommend::{recommend, Emotion, ExhibitSeed};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
