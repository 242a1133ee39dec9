//! Descriptor for one unit of retiming work.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::scene::{ChapterMap, OffsetMap, SceneKey};

/// Identifier of an encoding bitrate in the silence library (e.g. `51_448`
/// for 5.1 channels at 448 kbps).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitrateId(String);

impl BitrateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BitrateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BitrateId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Everything the driver needs to retime one audio track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Display name, also used for the unit's log file.
    pub name: String,
    /// Target frame of each scene in the destination timeline.
    pub chapters: ChapterMap,
    /// Per-scene corrections to apply.
    pub offsets: OffsetMap,
    /// Bitrate of the source audio, used to pick a silent clip.
    pub bitrate: BitrateId,
    /// Audio to retime. Never modified.
    pub source_path: PathBuf,
    /// Where the retimed audio is written.
    pub dest_path: PathBuf,
}

impl UnitDescriptor {
    /// Scenes that will actually change the stream, in canonical order.
    pub fn pending_scenes(&self) -> Vec<SceneKey> {
        SceneKey::CANONICAL
            .into_iter()
            .filter(|key| self.offsets.get(key).is_some_and(|entry| !entry.is_noop()))
            .collect()
    }
}
