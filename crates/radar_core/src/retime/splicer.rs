//! Trim, pad and rejoin the working stream for one scene correction.
//!
//! ```text
//! Leading:            [scene_start ..]
//! LeadingWithSilence: silence(insert) + [scene_start ..]
//! Join:               [0 .. prev] + [scene_start ..]
//! JoinWithSilence:    [0 .. prev] + silence(insert) + [scene_start ..]
//! ```
//!
//! Parts are written next to the working file and joined into a sibling
//! file that is renamed over the working file only once complete.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::models::BitrateId;

use super::errors::RetimeResult;
use super::stream::WorkingStream;
use super::timecode::CutPlan;
use super::tools::{remove_if_exists, AudioTools};

/// Shape of a splice, chosen from a [`CutPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceCase {
    /// Drop everything before the scene start.
    Leading,
    /// Drop everything before the scene start and prepend silence.
    LeadingWithSilence,
    /// Cut out the region between the previous boundary and the scene start.
    Join,
    /// Replace the region between the previous boundary and the scene start
    /// with silence.
    JoinWithSilence,
}

impl SpliceCase {
    pub fn for_plan(plan: &CutPlan) -> Self {
        match (plan.is_leading(), plan.needs_silence()) {
            (true, false) => SpliceCase::Leading,
            (true, true) => SpliceCase::LeadingWithSilence,
            (false, false) => SpliceCase::Join,
            (false, true) => SpliceCase::JoinWithSilence,
        }
    }
}

impl std::fmt::Display for SpliceCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpliceCase::Leading => write!(f, "leading trim"),
            SpliceCase::LeadingWithSilence => write!(f, "leading silence"),
            SpliceCase::Join => write!(f, "join"),
            SpliceCase::JoinWithSilence => write!(f, "join with silence"),
        }
    }
}

/// Intermediate files of one splice. Every file still present is deleted
/// when the guard is dropped.
struct PartFiles {
    lead: PathBuf,
    silence: PathBuf,
    tail: PathBuf,
    joined: PathBuf,
}

impl PartFiles {
    fn for_stream(stream: &Path) -> Self {
        let with_suffix = |suffix: &str| {
            let mut name: OsString = stream.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            lead: with_suffix(".part1"),
            silence: with_suffix(".part2"),
            tail: with_suffix(".part3"),
            joined: with_suffix(".spliced"),
        }
    }
}

impl Drop for PartFiles {
    fn drop(&mut self) {
        for path in [&self.lead, &self.silence, &self.tail, &self.joined] {
            if let Err(e) = remove_if_exists(path) {
                tracing::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

/// Applies cut plans to a working stream through an [`AudioTools`]
/// implementation.
pub struct Splicer<'a> {
    tools: &'a dyn AudioTools,
}

impl<'a> Splicer<'a> {
    pub fn new(tools: &'a dyn AudioTools) -> Self {
        Self { tools }
    }

    /// Apply `plan` to `stream`.
    ///
    /// On error the working file still holds its pre-splice contents and no
    /// part files remain.
    pub fn splice(
        &self,
        stream: WorkingStream,
        plan: &CutPlan,
        bitrate: &BitrateId,
    ) -> RetimeResult<WorkingStream> {
        let case = SpliceCase::for_plan(plan);
        let parts = PartFiles::for_stream(stream.path());
        let input = stream.path();

        tracing::debug!(
            "Splicing {} ({}): prev={}ms start={}ms insert={}ms",
            input.display(),
            case,
            plan.prev_boundary_ms,
            plan.scene_start_ms,
            plan.insert_ms
        );

        match case {
            SpliceCase::Leading => {
                self.tools
                    .trim(input, &parts.joined, plan.scene_start_ms, None)?;
            }
            SpliceCase::LeadingWithSilence => {
                let clip = self.silence_clip(bitrate)?;
                self.tools
                    .trim(&clip, &parts.silence, 0, Some(plan.insert_ms))?;
                self.tools
                    .trim(input, &parts.tail, plan.scene_start_ms, None)?;
                self.tools
                    .concat(&[&parts.silence, &parts.tail], &parts.joined)?;
            }
            SpliceCase::Join => {
                self.tools
                    .trim(input, &parts.lead, 0, Some(plan.prev_boundary_ms))?;
                self.tools
                    .trim(input, &parts.tail, plan.scene_start_ms, None)?;
                self.tools
                    .concat(&[&parts.lead, &parts.tail], &parts.joined)?;
            }
            SpliceCase::JoinWithSilence => {
                let clip = self.silence_clip(bitrate)?;
                self.tools
                    .trim(input, &parts.lead, 0, Some(plan.prev_boundary_ms))?;
                self.tools
                    .trim(&clip, &parts.silence, 0, Some(plan.insert_ms))?;
                self.tools
                    .trim(input, &parts.tail, plan.scene_start_ms, None)?;
                self.tools.concat(
                    &[&parts.lead, &parts.silence, &parts.tail],
                    &parts.joined,
                )?;
            }
        }

        stream.replace_with(&parts.joined)
    }

    /// Resolve the silent clip for `bitrate` before anything is cut.
    fn silence_clip(&self, bitrate: &BitrateId) -> RetimeResult<PathBuf> {
        let clip = self.tools.silence_clip(bitrate)?;
        tracing::debug!("Using {} kbps blank clip {}", bitrate, clip.display());
        Ok(clip)
    }
}
