//! Named scene boundaries and their per-unit frame data.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named scene boundary within an episode.
///
/// Variant order is the canonical processing order. `Ord` is derived from
/// it, so any `BTreeMap<SceneKey, _>` iterates in that order as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SceneKey {
    /// Opening credits.
    #[serde(rename = "op")]
    Opening,
    /// Recap/prologue after the opening.
    #[serde(rename = "prologue")]
    Prologue,
    /// Second half, after the eyecatch.
    #[serde(rename = "partB")]
    PartB,
    /// Ending credits.
    #[serde(rename = "ED")]
    Ending,
    /// Next episode preview.
    #[serde(rename = "NEP")]
    NextEpisode,
}

impl SceneKey {
    /// Every scene key, in the order corrections must be applied.
    pub const CANONICAL: [SceneKey; 5] = [
        SceneKey::Opening,
        SceneKey::Prologue,
        SceneKey::PartB,
        SceneKey::Ending,
        SceneKey::NextEpisode,
    ];

    /// Key as it appears in frame data files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKey::Opening => "op",
            SceneKey::Prologue => "prologue",
            SceneKey::PartB => "partB",
            SceneKey::Ending => "ED",
            SceneKey::NextEpisode => "NEP",
        }
    }
}

impl std::fmt::Display for SceneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no scene.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown scene key: {0}")]
pub struct SceneKeyParseError(pub String);

impl FromStr for SceneKey {
    type Err = SceneKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SceneKey::CANONICAL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SceneKeyParseError(s.to_string()))
    }
}

/// Correction for one scene, measured in the source stream's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetEntry {
    /// Frame in the source stream where the scene begins.
    pub frame: u64,
    /// Positive: extra source frames to remove. Negative: missing frames
    /// to fill with silence. Zero: nothing to do.
    pub offset: i64,
}

impl OffsetEntry {
    pub fn new(frame: u64, offset: i64) -> Self {
        Self { frame, offset }
    }

    /// Whether this entry leaves the stream untouched.
    pub fn is_noop(&self) -> bool {
        self.offset == 0
    }
}

/// Target-timeline frame at which each scene must begin.
pub type ChapterMap = BTreeMap<SceneKey, u64>;

/// Per-scene corrections for a unit.
pub type OffsetMap = BTreeMap<SceneKey, OffsetEntry>;
