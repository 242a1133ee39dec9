//! On-disk layout of source and retimed audio.
//!
//! ```text
//! <source_folder>/<series>/<NNN>/R1/audio.ac3   (input)
//! <output_folder>/<series>/<NNN>/R2/audio.ac3   (retimed)
//! ```

use std::path::{Path, PathBuf};

use crate::models::{BitrateId, UnitDescriptor};

use super::catalog::{pad_episode, EpisodeRange, Series};
use super::frame_data::{FrameData, FrameDataError};

const AUDIO_FILE: &str = "audio.ac3";

/// Builds unit descriptors for the episodes of one series.
#[derive(Debug, Clone)]
pub struct SeriesLayout {
    series: Series,
    source_folder: PathBuf,
    output_folder: PathBuf,
    default_bitrate: BitrateId,
}

impl SeriesLayout {
    pub fn new(
        series: Series,
        source_folder: impl Into<PathBuf>,
        output_folder: impl Into<PathBuf>,
        default_bitrate: BitrateId,
    ) -> Self {
        Self {
            series,
            source_folder: source_folder.into(),
            output_folder: output_folder.into(),
            default_bitrate,
        }
    }

    pub fn series(&self) -> Series {
        self.series
    }

    pub fn source_path(&self, episode: u32) -> PathBuf {
        self.episode_dir(&self.source_folder, episode)
            .join("R1")
            .join(AUDIO_FILE)
    }

    pub fn dest_path(&self, episode: u32) -> PathBuf {
        self.episode_dir(&self.output_folder, episode)
            .join("R2")
            .join(AUDIO_FILE)
    }

    /// Display name of an episode, e.g. `DBZ 007`.
    pub fn unit_name(&self, episode: u32) -> String {
        format!("{} {}", self.series, pad_episode(episode))
    }

    /// Descriptor for one episode.
    pub fn unit(&self, frame_data: &FrameData, episode: u32) -> Result<UnitDescriptor, FrameDataError> {
        let frames = frame_data.episode(episode)?;
        Ok(UnitDescriptor {
            name: self.unit_name(episode),
            chapters: frames.chapters.clone(),
            offsets: frames.offsets.clone(),
            bitrate: frames
                .bitrate
                .clone()
                .unwrap_or_else(|| self.default_bitrate.clone()),
            source_path: self.source_path(episode),
            dest_path: self.dest_path(episode),
        })
    }

    /// Descriptors for every episode in `range`, paired with the episode
    /// number. Episodes without frame data yield an error in their slot.
    pub fn units(
        &self,
        frame_data: &FrameData,
        range: EpisodeRange,
    ) -> Vec<(u32, Result<UnitDescriptor, FrameDataError>)> {
        range
            .iter()
            .map(|episode| (episode, self.unit(frame_data, episode)))
            .collect()
    }

    fn episode_dir(&self, root: &Path, episode: u32) -> PathBuf {
        root.join(self.series.as_str()).join(pad_episode(episode))
    }
}
