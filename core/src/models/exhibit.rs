//! Exhibit records derived from moods

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::recommend::ExhibitSeed;
use super::mood::MoodSnapshot;
use super::record::{attributes, Collection, Record};

/// A record of the `exhibit` collection
///
/// The plaintext fields are stored in the clear for listing. The payload
/// holds the encoded mood snapshot that triggered the recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitRecord {
    /// Record id
    pub id: String,

    /// Exhibit name
    pub name: String,

    /// Short description
    pub description: String,

    /// Emotion tag this exhibit was matched to
    pub emotion_match: String,

    /// Location in the museum
    pub location: String,

    /// Encoded originating mood snapshot
    pub payload: String,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl ExhibitRecord {
    /// Derive an exhibit record from a seed and the mood that produced it
    pub fn from_seed(
        id: impl Into<String>,
        seed: &ExhibitSeed,
        mood: &MoodSnapshot,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            emotion_match: mood.emotion.clone(),
            location: seed.location.to_string(),
            payload: mood.encode()?,
            created_at,
        })
    }

    /// The collection this record belongs to
    pub fn collection() -> Collection {
        Collection::Exhibit
    }
}

impl From<ExhibitRecord> for Record {
    fn from(exhibit: ExhibitRecord) -> Self {
        Record::new(exhibit.id, exhibit.payload, exhibit.created_at)
            .with_attribute(attributes::NAME, exhibit.name)
            .with_attribute(attributes::DESCRIPTION, exhibit.description)
            .with_attribute(attributes::EMOTION_MATCH, exhibit.emotion_match)
            .with_attribute(attributes::LOCATION, exhibit.location)
    }
}

impl TryFrom<Record> for ExhibitRecord {
    type Error = CoreError;

    fn try_from(mut record: Record) -> Result<Self> {
        let id = record.id;
        let mut take = |key: &str| {
            record
                .attributes
                .remove(key)
                .ok_or_else(|| CoreError::ParseError(format!("exhibit {} is missing '{}'", id, key)))
        };

        let name = take(attributes::NAME)?;
        let description = take(attributes::DESCRIPTION)?;
        let emotion_match = take(attributes::EMOTION_MATCH)?;
        let location = take(attributes::LOCATION)?;

        Ok(Self {
            id,
            name,
            description,
            emotion_match,
            location,
            payload: record.payload,
            created_at: record.created_at,
        })
    }
}

/// Count exhibits per lowercased emotion tag
pub fn emotion_distribution(exhibits: &[ExhibitRecord]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for exhibit in exhibits {
        *distribution.entry(exhibit.emotion_match.to_lowercase()).or_insert(0) += 1;
    }
    distribution
}
