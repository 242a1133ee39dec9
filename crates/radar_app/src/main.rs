//! Dragon Radar command line front end.
//!
//! Usage:
//!   dragon-radar audio --series DBZ --episode 1:10 [--jobs 4] [--verbose]
//!
//! Exit status is 0 when every episode succeeded or was skipped, 1 when any
//! failed, and 130 after Ctrl+C or SIGTERM.

mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use radar_core::batch::{BatchProcessor, BatchSummary, CancelHandle};
use radar_core::config::{ConfigManager, Settings};
use radar_core::logging::{init_tracing, LogLevel};
use radar_core::models::{ScaleRate, UnitDescriptor};
use radar_core::retime::{plan_scenes, DelayCutTools, Retimer, SilenceLibrary, UnitOutcome};
use radar_core::series::{FrameData, SeriesLayout};

use cli::{AudioArgs, Cli, Command};

/// Exit status after Ctrl+C (128 + SIGINT).
const INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns the process exit status of a finished run.
fn run(cli: Cli) -> Result<u8> {
    let config_existed = cli.config.exists();
    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let mut settings = config.settings().clone();
    if cli.verbose {
        settings.logging.level = LogLevel::Debug;
    }
    init_tracing(settings.logging.level);

    if !config_existed {
        tracing::info!("Created default config at {}", cli.config.display());
    }
    tracing::debug!("radar_core {}", radar_core::version());

    match cli.command {
        Command::Audio(args) => run_audio(&config, settings, args),
    }
}

fn run_audio(config: &ConfigManager, mut settings: Settings, args: AudioArgs) -> Result<u8> {
    if let Some(jobs) = args.jobs {
        settings.retime.jobs = jobs.max(1);
    }
    if let Some(rate) = args.frame_rate {
        settings.retime.frame_rate = rate;
    }

    let frame_data = FrameData::load(Path::new(&settings.paths.frame_data_dir), args.series)
        .context("loading series frame data")?;
    let layout = SeriesLayout::new(
        args.series,
        &settings.paths.source_folder,
        &settings.paths.output_folder,
        settings.retime.bitrate.clone(),
    );

    let mut summary = BatchSummary::new();
    let mut units: Vec<UnitDescriptor> = Vec::new();
    for (episode, unit) in layout.units(&frame_data, args.episode) {
        match unit {
            Ok(unit) => units.push(unit),
            Err(e) => {
                tracing::error!("{}", e);
                summary.record(layout.unit_name(episode), UnitOutcome::Failed(e.to_string()));
            }
        }
    }

    if args.dry_run {
        print_plans(settings.retime.frame_rate, &units);
        return Ok(exit_status(&summary, false));
    }

    // Pre-check: nothing runs without the trimmer.
    let tools = DelayCutTools::new(settings.delaycut(), SilenceLibrary::new(settings.silence_dir()));
    tools
        .validate()
        .with_context(|| {
            format!(
                "DelayCut not usable at {} (check [tools] delaycut in {})",
                tools.executable().display(),
                config.path().display()
            )
        })?;

    config.ensure_dirs_exist().context("creating working folders")?;
    let run_dir = tempfile::Builder::new()
        .prefix("run-")
        .tempdir_in(settings.temp_root())
        .context("creating run temp folder")?;
    tracing::debug!("Run temp folder: {}", run_dir.path().display());

    let mut retimer = Retimer::new(tools, settings.retime.frame_rate, run_dir.path())
        .with_log_config(settings.logging.log_config());
    if settings.logging.unit_logs {
        retimer = retimer.with_unit_logs(settings.logs_folder());
    }

    tracing::info!(
        "Retiming {} {} at {} fps ({} episode(s))",
        layout.series(),
        args.episode,
        settings.retime.frame_rate,
        units.len()
    );

    let processor = BatchProcessor::new(retimer, settings.retime.jobs);
    install_interrupt_handler(processor.cancel_handle(), run_dir.path().to_path_buf())?;

    summary.merge(processor.process(&units));
    run_dir.close().context("removing run temp folder")?;

    println!("{}", summary);
    Ok(exit_status(&summary, processor.is_cancelled()))
}

fn exit_status(summary: &BatchSummary, interrupted: bool) -> u8 {
    if interrupted {
        INTERRUPTED
    } else if summary.has_failures() {
        1
    } else {
        0
    }
}

/// Ctrl+C (or SIGTERM) stops new units from starting and lets running ones
/// finish. A second signal removes the run's temp folder and exits at once.
fn install_interrupt_handler(cancel: CancelHandle, run_dir: PathBuf) -> Result<()> {
    ctrlc::set_handler(move || {
        if on_interrupt(&cancel, &run_dir) {
            std::process::exit(i32::from(INTERRUPTED));
        }
    })
    .context("installing Ctrl+C handler")
}

/// Returns `true` when the process should exit immediately.
fn on_interrupt(cancel: &CancelHandle, run_dir: &Path) -> bool {
    if !cancel.is_cancelled() {
        cancel.cancel();
        tracing::warn!("Interrupted, finishing running episode(s). Press Ctrl+C again to abort");
        return false;
    }

    tracing::warn!("Aborting, cleaning up {}", run_dir.display());
    if let Err(e) = fs::remove_dir_all(run_dir) {
        tracing::warn!("Failed to remove {}: {}", run_dir.display(), e);
    }
    true
}

fn print_plans(rate: ScaleRate, units: &[UnitDescriptor]) {
    for unit in units {
        println!("{} ({})", unit.name, unit.source_path.display());
        match plan_scenes(unit, rate) {
            Ok(plans) if plans.is_empty() => println!("  nothing to do"),
            Ok(plans) => {
                for scene in plans {
                    println!(
                        "  {:<8} frame {:>6} offset {:+5}  {:<17} keep ..{}ms, resume {}ms, insert {}ms",
                        scene.key.as_str(),
                        scene.target_frame,
                        scene.offset,
                        scene.case().to_string(),
                        scene.cut.prev_boundary_ms,
                        scene.cut.scene_start_ms,
                        scene.cut.insert_ms
                    );
                }
            }
            Err(e) => println!("  error: {}", e),
        }
    }
}
