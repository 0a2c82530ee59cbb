//! Data models for Mood Museum
//!
//! This module provides the generic stored record, the collection key
//! layout, and the typed mood and exhibit records built on top of it.

mod record;
mod mood;
mod exhibit;

pub use record::{attributes, encode_index, parse_index, Collection, Record};
pub use mood::{MoodRecord, MoodSnapshot, MAX_INTENSITY, MIN_INTENSITY};
pub use exhibit::{emotion_distribution, ExhibitRecord};
