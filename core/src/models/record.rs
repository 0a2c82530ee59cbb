//! Generic stored record and collection key layout
//!
//! A collection is realised in the flat key/value store as one index entry
//! (`<collection>_keys`, a JSON array of ids) plus one entry per member
//! (`<collection>_<id>`). This module owns that naming and the byte layout
//! of each collection's member entries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::id;

/// Attribute names carried by exhibit records
pub mod attributes {
    /// Exhibit display name
    pub const NAME: &str = "name";

    /// Exhibit description
    pub const DESCRIPTION: &str = "description";

    /// Emotion tag the exhibit was matched to
    pub const EMOTION_MATCH: &str = "emotionMatch";

    /// Where the exhibit is located in the museum
    pub const LOCATION: &str = "location";
}

/// A named group of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Encoded mood submissions
    Mood,

    /// Exhibit recommendations derived from moods
    Exhibit,
}

impl Collection {
    /// All known collections
    pub const ALL: [Collection; 2] = [Collection::Mood, Collection::Exhibit];

    /// Collection name as used in backend keys
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Mood => "mood",
            Collection::Exhibit => "exhibit",
        }
    }

    /// Key of the collection's index entry
    pub fn index_key(&self) -> String {
        format!("{}_keys", self.name())
    }

    /// Key of a member record entry
    pub fn record_key(&self, id: &str) -> String {
        format!("{}_{}", self.name(), id)
    }

    /// Generate a fresh member id (`<kind>-<millis>-<suffix>`)
    pub fn new_id(&self, suffix_len: usize) -> String {
        id::generate(self.name(), suffix_len)
    }

    /// Generate a member id carrying the wall time `at`
    pub fn new_id_at(&self, at: DateTime<Utc>, suffix_len: usize) -> String {
        id::generate_at(self.name(), at, suffix_len)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mood" => Ok(Collection::Mood),
            "exhibit" => Ok(Collection::Exhibit),
            other => Err(CoreError::ValidationError(format!("unknown collection '{}'", other))),
        }
    }
}

/// The atomic persisted unit of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Id, unique within the collection
    pub id: String,

    /// Codec output; never plaintext
    pub payload: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Plaintext projection fields stored beside the payload
    pub attributes: BTreeMap<String, String>,
}

/// On-the-wire shape of an exhibit entry
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExhibitEntry {
    name: String,
    description: String,
    emotion_match: String,
    location: String,
    data: String,
    timestamp: i64,
}

impl Record {
    /// Create a record without attributes
    pub fn new(id: impl Into<String>, payload: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
            created_at,
            attributes: BTreeMap::new(),
        }
    }

    /// Add a plaintext attribute
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Look up a plaintext attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Serialize the record as the value of its `<collection>_<id>` entry
    pub fn to_bytes(&self, collection: Collection) -> Result<Vec<u8>> {
        match collection {
            // Mood entries are the bare encoded payload
            Collection::Mood => Ok(self.payload.as_bytes().to_vec()),
            Collection::Exhibit => {
                let attr = |key: &str| self.attribute(key).unwrap_or_default().to_string();
                let entry = ExhibitEntry {
                    name: attr(attributes::NAME),
                    description: attr(attributes::DESCRIPTION),
                    emotion_match: attr(attributes::EMOTION_MATCH),
                    location: attr(attributes::LOCATION),
                    data: self.payload.clone(),
                    timestamp: self.created_at.timestamp_millis(),
                };
                Ok(serde_json::to_vec(&entry)?)
            }
        }
    }

    /// Parse the value of a `<collection>_<id>` entry
    pub fn from_bytes(collection: Collection, id: &str, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(CoreError::ParseError(format!("empty entry for {}", collection.record_key(id))));
        }

        let text = String::from_utf8(bytes.to_vec())?;

        match collection {
            Collection::Mood => {
                // The stored bytes carry no plaintext time, only the id does
                let created_at = id::created_at(id).unwrap_or_default();
                Ok(Record::new(id, text, created_at))
            }
            Collection::Exhibit => {
                let entry: ExhibitEntry = serde_json::from_str(&text)?;
                let created_at = Utc
                    .timestamp_millis_opt(entry.timestamp)
                    .single()
                    .ok_or_else(|| CoreError::ParseError(format!("timestamp {} out of range", entry.timestamp)))?;

                Ok(Record::new(id, entry.data, created_at)
                    .with_attribute(attributes::NAME, entry.name)
                    .with_attribute(attributes::DESCRIPTION, entry.description)
                    .with_attribute(attributes::EMOTION_MATCH, entry.emotion_match)
                    .with_attribute(attributes::LOCATION, entry.location))
            }
        }
    }
}

/// Parse the value of a `<collection>_keys` entry
///
/// Empty or whitespace-only input is an empty index.
pub fn parse_index(bytes: &[u8]) -> Result<Vec<String>> {
    let text = String::from_utf8(bytes.to_vec())?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&text)?)
}

/// Serialize an id list as the value of a `<collection>_keys` entry
pub fn encode_index(ids: &[String]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(ids)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(Collection::Mood.index_key(), "mood_keys");
        assert_eq!(Collection::Exhibit.index_key(), "exhibit_keys");
        assert_eq!(
            Collection::Mood.record_key("mood-1700000000000-ab12"),
            "mood_mood-1700000000000-ab12"
        );
        assert_eq!(Collection::Exhibit.record_key("x"), "exhibit_x");

        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = Collection::Mood.new_id_at(at, 4);
        assert!(id.starts_with("mood-1700000000123-"));
        assert_eq!(id::created_at(&id), Some(at));
        assert_eq!("exhibit".parse::<Collection>().unwrap(), Collection::Exhibit);
        assert!("moods".parse::<Collection>().is_err());
    }

    #[test]
    fn test_exhibit_entry_layout() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let record = Record::new("exhibit-1", "FHE-e30=", created_at)
            .with_attribute(attributes::NAME, "Zen Garden")
            .with_attribute(attributes::DESCRIPTION, "Traditional Japanese meditation garden")
            .with_attribute(attributes::EMOTION_MATCH, "calm")
            .with_attribute(attributes::LOCATION, "Outdoor Garden");

        let bytes = record.to_bytes(Collection::Exhibit).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["name"], "Zen Garden");
        assert_eq!(value["emotionMatch"], "calm");
        assert_eq!(value["location"], "Outdoor Garden");
        assert_eq!(value["data"], "FHE-e30=");
        assert_eq!(value["timestamp"], 1_700_000_000_000i64);

        let parsed = Record::from_bytes(Collection::Exhibit, "exhibit-1", &bytes).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_mood_entry_is_bare_payload() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let record = Record::new("mood-1700000000000-ab12", "FHE-e30=", created_at);

        let bytes = record.to_bytes(Collection::Mood).unwrap();
        assert_eq!(bytes, b"FHE-e30=");

        let parsed = Record::from_bytes(Collection::Mood, &record.id, &bytes).unwrap();
        assert_eq!(parsed.created_at, created_at);
        assert_eq!(parsed.payload, "FHE-e30=");
    }

    #[test]
    fn test_mood_entry_with_foreign_id_gets_epoch() {
        let parsed = Record::from_bytes(Collection::Mood, "legacy", b"FHE-e30=").unwrap();
        assert_eq!(parsed.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_malformed_entries() {
        assert!(Record::from_bytes(Collection::Exhibit, "x", b"").is_err());
        assert!(Record::from_bytes(Collection::Exhibit, "x", b"{not json").is_err());
        assert!(Record::from_bytes(Collection::Exhibit, "x", br#"{"name":"a"}"#).is_err());
        assert!(Record::from_bytes(Collection::Mood, "x", &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_index_parsing() {
        assert!(parse_index(b"").unwrap().is_empty());
        assert!(parse_index(b"  \n").unwrap().is_empty());
        assert_eq!(parse_index(br#"["a","b"]"#).unwrap(), vec!["a", "b"]);
        assert!(parse_index(b"[1,2]").is_err());
        assert!(parse_index(b"{").is_err());

        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(encode_index(&ids).unwrap(), br#"["a","b"]"#.to_vec());
    }
}
