//! Per-unit retiming driver.
//!
//! Walks a unit's scenes in canonical order, applying each correction to a
//! private working copy of the source audio, and moves the result to the
//! destination only once every scene has been applied.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::logging::{LogConfig, UnitLogger};
use crate::models::{SceneKey, ScaleRate, UnitDescriptor};

use super::errors::{RetimeError, RetimeResult};
use super::splicer::{SpliceCase, Splicer};
use super::stream::WorkingStream;
use super::timecode::{convert, CutPlan};
use super::tools::AudioTools;

/// A resolved correction for one scene.
#[derive(Debug, Clone, Serialize)]
pub struct ScenePlan {
    pub key: SceneKey,
    /// Frame in the target timeline where the scene begins.
    pub target_frame: u64,
    /// Signed frame correction.
    pub offset: i64,
    pub cut: CutPlan,
}

impl ScenePlan {
    pub fn case(&self) -> SpliceCase {
        SpliceCase::for_plan(&self.cut)
    }
}

/// Resolve every pending scene of `unit` into a cut plan, in canonical
/// order. Zero offsets are left out; an offset without a target chapter is
/// an error.
pub fn plan_scenes(unit: &UnitDescriptor, rate: ScaleRate) -> RetimeResult<Vec<ScenePlan>> {
    unit.pending_scenes()
        .into_iter()
        .filter_map(|key| unit.offsets.get(&key).map(|entry| (key, entry.offset)))
        .map(|(key, offset)| {
            let target_frame = *unit
                .chapters
                .get(&key)
                .ok_or(RetimeError::MissingChapter(key))?;
            Ok(ScenePlan {
                key,
                target_frame,
                offset,
                cut: convert(target_frame, offset, rate),
            })
        })
        .collect()
}

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct RetimeReport {
    /// Where the retimed audio was written.
    pub dest_path: PathBuf,
    /// Corrections applied, in order.
    pub applied: Vec<ScenePlan>,
    /// Scenes present with a zero offset.
    pub unchanged: Vec<SceneKey>,
    /// Size of the written file in bytes.
    pub final_len: u64,
}

/// Result of retiming one unit.
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    /// Audio was retimed and written.
    Success(RetimeReport),
    /// Nothing was done (e.g. the source file is missing).
    Skipped(String),
    /// The unit was aborted before the destination was written.
    Failed(String),
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Success(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, UnitOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UnitOutcome::Failed(_))
    }

    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            UnitOutcome::Success(_) => "success",
            UnitOutcome::Skipped(_) => "skipped",
            UnitOutcome::Failed(_) => "failed",
        }
    }
}

/// Retimes units with a fixed rate and tool set.
///
/// # Example
///
/// ```ignore
/// let tools = DelayCutTools::new("/usr/bin/delaycut", SilenceLibrary::new("ac3"));
/// let retimer = Retimer::new(tools, ScaleRate::NTSC, ".temp");
///
/// match retimer.retime(&unit) {
///     UnitOutcome::Success(report) => println!("wrote {}", report.dest_path.display()),
///     other => println!("{}", other.label()),
/// }
/// ```
pub struct Retimer<T> {
    tools: T,
    rate: ScaleRate,
    temp_root: PathBuf,
    log_dir: Option<PathBuf>,
    log_config: LogConfig,
}

impl<T: AudioTools> Retimer<T> {
    /// Create a retimer. Each unit gets its own working directory under
    /// `temp_root`.
    pub fn new(tools: T, rate: ScaleRate, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            rate,
            temp_root: temp_root.into(),
            log_dir: None,
            log_config: LogConfig::default(),
        }
    }

    /// Write a log file per unit into `log_dir`.
    pub fn with_unit_logs(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn with_log_config(mut self, config: LogConfig) -> Self {
        self.log_config = config;
        self
    }

    pub fn rate(&self) -> ScaleRate {
        self.rate
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Cut plans for `unit` at this retimer's rate. See [`plan_scenes`].
    pub fn plan_unit(&self, unit: &UnitDescriptor) -> RetimeResult<Vec<ScenePlan>> {
        plan_scenes(unit, self.rate)
    }

    /// Retime one unit.
    ///
    /// A missing source is reported as [`UnitOutcome::Skipped`] and leaves
    /// the destination untouched. Any other problem aborts the unit with
    /// [`UnitOutcome::Failed`]; temporary files are removed either way.
    pub fn retime(&self, unit: &UnitDescriptor) -> UnitOutcome {
        let logger = self.unit_logger(unit);
        logger.phase(&format!("Retiming {}", unit.name));

        if !unit.source_path.is_file() {
            let reason = format!("{} not found", unit.source_path.display());
            logger.warn(&format!("{}. Skipping...", reason));
            return UnitOutcome::Skipped(reason);
        }
        logger.debug(&format!(
            "{} found! Proceeding with retiming...",
            unit.source_path.display()
        ));

        match self.run(unit, &logger) {
            Ok(report) => {
                logger.success(&format!(
                    "{}: {} correction(s) applied, written to {}",
                    unit.name,
                    report.applied.len(),
                    report.dest_path.display()
                ));
                UnitOutcome::Success(report)
            }
            Err(e) => {
                logger.error(&format!("{} failed: {}", unit.name, e));
                UnitOutcome::Failed(e.to_string())
            }
        }
    }

    fn run(&self, unit: &UnitDescriptor, logger: &UnitLogger) -> RetimeResult<RetimeReport> {
        let plans = self.plan_unit(unit)?;
        let unchanged: Vec<SceneKey> = unit
            .offsets
            .iter()
            .filter(|(_, entry)| entry.is_noop())
            .map(|(key, _)| *key)
            .collect();

        fs::create_dir_all(&self.temp_root).map_err(|e| {
            RetimeError::filesystem(format!("create {}", self.temp_root.display()), e)
        })?;
        let work_dir = tempfile::Builder::new()
            .prefix("radar-")
            .tempdir_in(&self.temp_root)
            .map_err(|e| RetimeError::filesystem("create work dir", e))?;
        logger.debug(&format!("Audio temp folder: {}", work_dir.path().display()));

        let mut stream = WorkingStream::copy_from(&unit.source_path, work_dir.path())?;
        let splicer = Splicer::new(&self.tools);

        for scene in &plans {
            logger.section(scene.key.as_str());
            let before = stream.len()?;
            logger.info(&format!(
                "frame {} offset {:+}: {} (keep ..{}ms, resume at {}ms, drop {}ms, insert {}ms)",
                scene.target_frame,
                scene.offset,
                scene.case(),
                scene.cut.prev_boundary_ms,
                scene.cut.scene_start_ms,
                scene.cut.discarded_ms(),
                scene.cut.insert_ms
            ));

            stream = stream.apply(&scene.cut, &splicer, &unit.bitrate)?;
            logger.debug(&format!("{} -> {} bytes", before, stream.len()?));
        }
        for key in &unchanged {
            logger.debug(&format!("{}: offset 0, left as is", key));
        }

        let final_len = stream.len()?;
        logger.info("Writing retimed audio...");
        let dest_path = stream.commit(&unit.dest_path)?;

        remove_work_dir(work_dir, logger);

        Ok(RetimeReport {
            dest_path,
            applied: plans,
            unchanged,
            final_len,
        })
    }

    fn unit_logger(&self, unit: &UnitDescriptor) -> UnitLogger {
        match &self.log_dir {
            Some(dir) => UnitLogger::new(&unit.name, Some(dir.as_path()), self.log_config.clone())
                .unwrap_or_else(|e| {
                    tracing::warn!("Could not open log file for {}: {}", unit.name, e);
                    UnitLogger::tracing_only(&unit.name, self.log_config.clone())
                }),
            None => UnitLogger::tracing_only(&unit.name, self.log_config.clone()),
        }
    }
}

/// Remove a unit's work dir after commit. The destination is already
/// written, so a leftover folder is only warned about.
fn remove_work_dir(work_dir: tempfile::TempDir, logger: &UnitLogger) {
    let path = work_dir.path().to_path_buf();
    if let Err(e) = work_dir.close() {
        logger.warn(&format!(
            "Could not remove audio temp folder {}: {}",
            path.display(),
            e
        ));
    }
}
