//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Harvest bibliographic records from a search/retrieve catalog.
///
/// Pages through the catalog listing, fetches every record and writes it to
/// the search index, JSON files and CSV link export enabled in the config.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the JSON run configuration
    #[arg(long, default_value = "./config.json")]
    pub config: PathBuf,

    /// Directory for JSON files and the CSV export
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Cap on records to harvest (overrides downloadListMaxsize)
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_downloads: Option<u64>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default log filter when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["harvester"]).unwrap();
        assert_eq!(args.config, PathBuf::from("./config.json"));
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert_eq!(args.max_downloads, None);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["harvester", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["harvester", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["harvester", "--verbose", "--verbose"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["harvester", "-q"]).unwrap();
        assert!(args.quiet);

        let args = Args::try_parse_from(["harvester", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_default_log_level_follows_flags() {
        let level = |argv: &[&str]| Args::try_parse_from(argv).unwrap().default_log_level();
        assert_eq!(level(&["harvester"]), "info");
        assert_eq!(level(&["harvester", "-v"]), "debug");
        assert_eq!(level(&["harvester", "-vvv"]), "trace");
        assert_eq!(level(&["harvester", "-q", "-v"]), "error");
    }

    #[test]
    fn test_cli_config_and_output_dir_flags() {
        let args = Args::try_parse_from([
            "harvester",
            "--config",
            "/etc/harvester.json",
            "--output-dir",
            "/tmp/out",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/harvester.json"));
        assert_eq!(args.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_cli_max_downloads_flag() {
        let args = Args::try_parse_from(["harvester", "--max-downloads", "250"]).unwrap();
        assert_eq!(args.max_downloads, Some(250));

        let args = Args::try_parse_from(["harvester", "-m", "7"]).unwrap();
        assert_eq!(args.max_downloads, Some(7));
    }

    #[test]
    fn test_cli_max_downloads_zero_rejected() {
        let result = Args::try_parse_from(["harvester", "--max-downloads", "0"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["harvester", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["harvester", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["harvester", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
