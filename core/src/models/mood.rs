//! Mood snapshots and mood records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{CoreError, Result};
use super::record::{Collection, Record};

/// Lowest accepted intensity
pub const MIN_INTENSITY: u8 = 1;

/// Highest accepted intensity
pub const MAX_INTENSITY: u8 = 10;

/// A self-reported emotional state
///
/// This is the plaintext that gets encoded into mood payloads and into the
/// payload of every exhibit derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSnapshot {
    /// Emotion tag
    pub emotion: String,

    /// Intensity in `[1, 10]`
    pub intensity: u8,

    /// When the mood was reported
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl MoodSnapshot {
    /// Create a validated snapshot
    pub fn new(emotion: impl Into<String>, intensity: u8, timestamp: DateTime<Utc>) -> Result<Self> {
        let snapshot = Self {
            emotion: emotion.into(),
            intensity,
            timestamp,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the snapshot's invariants
    pub fn validate(&self) -> Result<()> {
        if self.emotion.trim().is_empty() {
            return Err(CoreError::ValidationError("emotion must not be empty".to_string()));
        }
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&self.intensity) {
            return Err(CoreError::ValidationError(format!(
                "intensity {} outside [{}, {}]",
                self.intensity, MIN_INTENSITY, MAX_INTENSITY
            )));
        }
        Ok(())
    }

    /// JSON plaintext form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a JSON plaintext
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: MoodSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Encoded payload form
    pub fn encode(&self) -> Result<String> {
        Ok(codec::encode(&self.to_json()?))
    }
}

/// A record of the `mood` collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodRecord {
    /// Record id
    pub id: String,

    /// Encoded snapshot
    pub payload: String,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl MoodRecord {
    /// Build a record for a snapshot under `id`
    pub fn new(id: impl Into<String>, snapshot: &MoodSnapshot) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            payload: snapshot.encode()?,
            created_at: snapshot.timestamp,
        })
    }

    /// Decode the payload back into a snapshot
    pub fn decode(&self) -> Result<MoodSnapshot> {
        MoodSnapshot::from_json(&codec::decode(&self.payload))
    }

    /// The collection this record belongs to
    pub fn collection() -> Collection {
        Collection::Mood
    }
}

impl From<MoodRecord> for Record {
    fn from(mood: MoodRecord) -> Self {
        Record::new(mood.id, mood.payload, mood.created_at)
    }
}

impl TryFrom<Record> for MoodRecord {
    type Error = CoreError;

    fn try_from(record: Record) -> Result<Self> {
        if record.payload.is_empty() {
            return Err(CoreError::ParseError(format!("mood {} has an empty payload", record.id)));
        }
        Ok(Self {
            id: record.id,
            payload: record.payload,
            created_at: record.created_at,
        })
    }
}
