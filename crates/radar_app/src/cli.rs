//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use radar_core::config::ConfigManager;
use radar_core::models::ScaleRate;
use radar_core::series::{EpisodeRange, Series};

#[derive(Debug, Parser)]
#[command(name = "dragon-radar")]
#[command(version, about = "Retime R1 audio to the R2 Dragon Box chapter layout")]
pub struct Cli {
    /// Config file, created with defaults if missing.
    #[arg(long, global = true, default_value = ConfigManager::DEFAULT_FILE)]
    pub config: PathBuf,

    /// More descriptive output.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync R1 English AC3 audio to the R2 Dragon Box.
    Audio(AudioArgs),
}

#[derive(Debug, Args)]
pub struct AudioArgs {
    /// Series to process [DB, DBZ, DBoxZ, DBGT, DBM].
    #[arg(long, value_name = "SERIES")]
    pub series: Series,

    /// Episodes to process, `first:last` or a single number.
    #[arg(long, value_name = "FIRST:LAST")]
    pub episode: EpisodeRange,

    /// Episodes retimed in parallel (overrides `retime.jobs`).
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Frame rate, e.g. `30000/1001`, `23.976` or `25` (overrides
    /// `retime.frame_rate`).
    #[arg(long, value_name = "RATE")]
    pub frame_rate: Option<ScaleRate>,

    /// Print the cut plan of every episode without touching any audio.
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_audio_command() {
        let cli = Cli::try_parse_from([
            "dragon-radar",
            "audio",
            "--series",
            "DBZ",
            "--episode",
            "1:5",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("dragon-radar.toml"));
        let Command::Audio(args) = cli.command;
        assert_eq!(args.series, Series::DBZ);
        assert_eq!(args.episode, EpisodeRange::new(1, 5).unwrap());
        assert_eq!(args.jobs, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "dragon-radar",
            "--config",
            "alt.toml",
            "audio",
            "--series",
            "DBoxZ",
            "--episode",
            "12",
            "--jobs",
            "4",
            "--frame-rate",
            "23.976",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        let Command::Audio(args) = cli.command;
        assert_eq!(args.episode, EpisodeRange::single(12).unwrap());
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.frame_rate, Some(ScaleRate::NTSC_FILM));
        assert!(args.dry_run);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_series =
            Cli::try_parse_from(["dragon-radar", "audio", "--series", "DBS", "--episode", "1"]);
        assert!(bad_series.is_err());

        let bad_range =
            Cli::try_parse_from(["dragon-radar", "audio", "--series", "DB", "--episode", "4:2"]);
        assert!(bad_range.is_err());

        let missing = Cli::try_parse_from(["dragon-radar", "audio", "--series", "DB"]);
        assert!(missing.is_err());
    }
}
