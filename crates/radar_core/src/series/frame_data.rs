//! Per-series frame data files.
//!
//! `<frame_data_dir>/<series>.json` maps each episode number to the
//! target-edition chapter frames and the per-scene corrections:
//!
//! ```json
//! {
//!   "1": {
//!     "r2_chapters": { "op": 0, "partA": 2158, "partB": 17282, "ED": 31842 },
//!     "offsets": {
//!       "op":    { "frame": 0,     "offset": -24 },
//!       "partB": { "frame": 17330, "offset": 48 }
//!     },
//!     "bitrate": "20_192"
//!   }
//! }
//! ```
//!
//! Chapter names that are not correction points (such as `partA`) are
//! ignored. `bitrate` is optional and overrides the configured default.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::{BitrateId, ChapterMap, OffsetEntry, OffsetMap, SceneKey};

use super::catalog::Series;

/// Errors from loading frame data.
#[derive(Error, Debug)]
pub enum FrameDataError {
    #[error("Failed to read frame data {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse frame data {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid episode key '{0}'")]
    InvalidEpisodeKey(String),

    #[error("Unknown scene '{key}' in offsets of episode {episode}")]
    UnknownScene { episode: u32, key: String },

    #[error("No frame data for episode {episode} of {series}")]
    MissingEpisode { series: Series, episode: u32 },
}

pub type FrameDataResult<T> = Result<T, FrameDataError>;

#[derive(Debug, Deserialize)]
struct RawEpisode {
    #[serde(default)]
    r2_chapters: BTreeMap<String, u64>,
    #[serde(default)]
    offsets: BTreeMap<String, OffsetEntry>,
    #[serde(default)]
    bitrate: Option<BitrateId>,
}

/// Frame data for one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeFrames {
    pub chapters: ChapterMap,
    pub offsets: OffsetMap,
    pub bitrate: Option<BitrateId>,
}

impl EpisodeFrames {
    fn from_raw(episode: u32, raw: RawEpisode) -> FrameDataResult<Self> {
        let chapters = raw
            .r2_chapters
            .into_iter()
            .filter_map(|(name, frame)| match name.parse::<SceneKey>() {
                Ok(key) => Some((key, frame)),
                Err(_) => {
                    tracing::trace!("Episode {}: ignoring chapter '{}'", episode, name);
                    None
                }
            })
            .collect();

        // Every offset must name a correction point.
        let offsets = raw
            .offsets
            .into_iter()
            .map(|(name, entry)| {
                name.parse::<SceneKey>()
                    .map(|key| (key, entry))
                    .map_err(|_| FrameDataError::UnknownScene { episode, key: name })
            })
            .collect::<FrameDataResult<OffsetMap>>()?;

        Ok(Self {
            chapters,
            offsets,
            bitrate: raw.bitrate,
        })
    }
}

/// All frame data for one series.
#[derive(Debug, Clone)]
pub struct FrameData {
    series: Series,
    episodes: BTreeMap<u32, EpisodeFrames>,
}

impl FrameData {
    /// Location of the data file for `series` under `dir`.
    pub fn path_for(dir: &Path, series: Series) -> PathBuf {
        dir.join(format!("{}.json", series))
    }

    /// Load `<dir>/<series>.json`.
    pub fn load(dir: &Path, series: Series) -> FrameDataResult<Self> {
        let path = Self::path_for(dir, series);
        tracing::debug!("Loading frame data from {}", path.display());

        let content = fs::read_to_string(&path).map_err(|source| FrameDataError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_json(series, &content).map_err(|e| match e {
            FrameDataError::Parse { source, .. } => FrameDataError::Parse { path, source },
            other => other,
        })
    }

    /// Parse frame data from a JSON string.
    pub fn from_json(series: Series, content: &str) -> FrameDataResult<Self> {
        let raw: BTreeMap<String, RawEpisode> =
            serde_json::from_str(content).map_err(|source| FrameDataError::Parse {
                path: PathBuf::new(),
                source,
            })?;

        let mut episodes = BTreeMap::new();
        for (key, raw_episode) in raw {
            let episode = key
                .trim()
                .parse::<u32>()
                .map_err(|_| FrameDataError::InvalidEpisodeKey(key.clone()))?;
            episodes.insert(episode, EpisodeFrames::from_raw(episode, raw_episode)?);
        }

        Ok(Self { series, episodes })
    }

    pub fn series(&self) -> Series {
        self.series
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Frame data for `episode`.
    pub fn episode(&self, episode: u32) -> FrameDataResult<&EpisodeFrames> {
        self.episodes
            .get(&episode)
            .ok_or(FrameDataError::MissingEpisode {
                series: self.series,
                episode,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "1": {
            "r2_chapters": { "op": 0, "partA": 2158, "partB": 17282, "ED": 31842 },
            "offsets": {
                "op": { "frame": 0, "offset": -24 },
                "partB": { "frame": 17330, "offset": 48 },
                "ED": { "frame": 31890, "offset": 0 }
            }
        },
        "002": {
            "r2_chapters": { "prologue": 2400 },
            "offsets": { "prologue": { "frame": 2410, "offset": 10 } },
            "bitrate": "20_192"
        }
    }"#;

    #[test]
    fn parses_episodes() {
        let data = FrameData::from_json(Series::DBZ, SAMPLE).unwrap();
        assert_eq!(data.len(), 2);

        let first = data.episode(1).unwrap();
        assert_eq!(first.chapters.len(), 3);
        assert_eq!(first.chapters[&SceneKey::PartB], 17282);
        assert_eq!(first.offsets[&SceneKey::Opening], OffsetEntry::new(0, -24));
        assert!(first.bitrate.is_none());

        let second = data.episode(2).unwrap();
        assert_eq!(second.bitrate, Some(BitrateId::new("20_192")));
    }

    #[test]
    fn missing_episode_is_reported() {
        let data = FrameData::from_json(Series::DB, SAMPLE).unwrap();
        match data.episode(7) {
            Err(FrameDataError::MissingEpisode { series, episode }) => {
                assert_eq!(series, Series::DB);
                assert_eq!(episode, 7);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_offset_scene_is_an_error() {
        let json = r#"{ "1": { "offsets": { "partA": { "frame": 10, "offset": 2 } } } }"#;
        assert!(matches!(
            FrameData::from_json(Series::DBZ, json),
            Err(FrameDataError::UnknownScene { episode: 1, .. })
        ));
    }

    #[test]
    fn bad_episode_key_is_an_error() {
        let json = r#"{ "one": {} }"#;
        assert!(matches!(
            FrameData::from_json(Series::DBZ, json),
            Err(FrameDataError::InvalidEpisodeKey(_))
        ));
    }

    #[test]
    fn load_reads_series_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("DBGT.json"), SAMPLE).unwrap();

        let data = FrameData::load(dir.path(), Series::DBGT).unwrap();
        assert_eq!(data.series(), Series::DBGT);
        assert!(data.episode(1).is_ok());
    }

    #[test]
    fn load_reports_path_on_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            FrameData::load(dir.path(), Series::DBM),
            Err(FrameDataError::Read { .. })
        ));

        fs::write(dir.path().join("DBM.json"), "{ not json").unwrap();
        match FrameData::load(dir.path(), Series::DBM) {
            Err(FrameDataError::Parse { path, .. }) => assert!(path.ends_with("DBM.json")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
