//! Emotion-to-exhibit recommendation table
//!
//! Recommendations are a static lookup: each of the five supported emotion
//! tags maps to exactly three exhibit seeds. Anything else maps to nothing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Emotion tags the recommendation table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// Calm
    Calm,
    /// Happy
    Happy,
    /// Curious
    Curious,
    /// Contemplative
    Contemplative,
    /// Inspired
    Inspired,
}

impl Emotion {
    /// Every supported tag, in display order
    pub const ALL: [Emotion; 5] = [
        Emotion::Calm,
        Emotion::Happy,
        Emotion::Curious,
        Emotion::Contemplative,
        Emotion::Inspired,
    ];

    /// The wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Calm => "calm",
            Emotion::Happy => "happy",
            Emotion::Curious => "curious",
            Emotion::Contemplative => "contemplative",
            Emotion::Inspired => "inspired",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|emotion| emotion.as_str() == s)
            .ok_or_else(|| CoreError::ValidationError(format!("unknown emotion '{}'", s)))
    }
}

/// A candidate exhibit before it is tied to a mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExhibitSeed {
    /// Exhibit name
    pub name: &'static str,

    /// Short description
    pub description: &'static str,

    /// Location in the museum
    pub location: &'static str,
}

const fn seed(name: &'static str, description: &'static str, location: &'static str) -> ExhibitSeed {
    ExhibitSeed { name, description, location }
}

const CALM: [ExhibitSeed; 3] = [
    seed("Serene Landscapes", "A collection of tranquil nature scenes", "Gallery A"),
    seed("Zen Garden", "Traditional Japanese meditation garden", "Outdoor Garden"),
    seed("Water Reflections", "Photography exhibition of water surfaces", "Hall B"),
];

const HAPPY: [ExhibitSeed; 3] = [
    seed("Colorful Abstractions", "Vibrant abstract paintings", "Modern Wing"),
    seed("Children's Art", "Playful creations by young artists", "Family Gallery"),
    seed("Festival Masks", "Cultural masks from celebrations worldwide", "Cultural Hall"),
];

const CURIOUS: [ExhibitSeed; 3] = [
    seed("Scientific Discoveries", "Exhibit on groundbreaking scientific findings", "Science Wing"),
    seed("Ancient Mysteries", "Artifacts from lost civilizations", "History Hall"),
    seed("Interactive Light", "Interactive light and sound installation", "Innovation Lab"),
];

const CONTEMPLATIVE: [ExhibitSeed; 3] = [
    seed("Philosophical Art", "Works that provoke deep thought", "East Wing"),
    seed("Religious Icons", "Sacred art from various traditions", "Spirituality Room"),
    seed("Minimalist Sculptures", "Simple forms with profound meaning", "Sculpture Garden"),
];

const INSPIRED: [ExhibitSeed; 3] = [
    seed("Innovation Gallery", "Cutting-edge designs and inventions", "Future Wing"),
    seed("Visionary Artists", "Works by artists ahead of their time", "Modern Masters"),
    seed("Social Change", "Art that drives social transformation", "Activism Corner"),
];

/// Seeds for a known emotion
pub fn seeds_for(emotion: Emotion) -> &'static [ExhibitSeed] {
    match emotion {
        Emotion::Calm => &CALM,
        Emotion::Happy => &HAPPY,
        Emotion::Curious => &CURIOUS,
        Emotion::Contemplative => &CONTEMPLATIVE,
        Emotion::Inspired => &INSPIRED,
    }
}

/// Recommend exhibits for an emotion tag
///
/// Unknown tags yield an empty list.
pub fn recommend(emotion: &str) -> Vec<ExhibitSeed> {
    emotion
        .parse::<Emotion>()
        .map(|emotion| seeds_for(emotion).to_vec())
        .unwrap_or_default()
}
