//! Command-line argument parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;

use crate::params::{SessionConfig, DEFAULT_MINUTES};
use crate::pidfile::default_pid_path;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "zen-timer")]
#[command(about = "A gentle water-level timer overlay", long_about = None)]
pub struct Args {
    /// Session length in minutes (default 45), or `stop` to end a running timer
    #[arg(value_name = "MINUTES|stop", allow_negative_numbers = true)]
    pub target: Option<String>,

    /// Render one frame to a PNG instead of opening the overlay
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Elapsed session time of the snapshot frame
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    pub at: f64,

    /// Snapshot resolution in pixels per point
    #[arg(long, value_name = "FACTOR", default_value = "2")]
    pub scale: f32,

    /// PID file location
    #[arg(long, value_name = "PATH")]
    pub pid_file: Option<PathBuf>,
}

/// Largest snapshot resolution in pixels per point
pub const MAX_SNAPSHOT_SCALE: f32 = 8.0;

/// What the process was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Terminate the running timer recorded in the PID file
    Stop,

    /// Write a single frame and exit
    Snapshot {
        config: SessionConfig,
        path: PathBuf,
        at_secs: f64,
        scale: f32,
    },

    /// Show the overlay for a session
    Run(SessionConfig),
}

impl Args {
    /// Parse `argv`, never failing on bad input
    ///
    /// Help output still exits. Any other parse error (unknown flags, stray
    /// extra arguments) keeps only the first argument as the target, like a
    /// plain `argv[1]` lookup would.
    pub fn parse_lenient<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        match Self::try_parse_from(&argv) {
            Ok(args) => args,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                debug!("Ignoring arguments: {}", e.kind());
                Self {
                    target: argv.get(1).map(|a| a.to_string_lossy().into_owned()),
                    snapshot: None,
                    at: 0.0,
                    scale: 2.0,
                    pid_file: None,
                }
            }
        }
    }

    pub fn invocation(&self) -> Invocation {
        if self.target.as_deref() == Some("stop") {
            return Invocation::Stop;
        }

        let config = SessionConfig::from_minutes(parse_minutes(self.target.as_deref()));
        match &self.snapshot {
            Some(path) => Invocation::Snapshot {
                config,
                path: path.clone(),
                at_secs: self.at.max(0.0),
                scale: if self.scale.is_finite() && self.scale > 0.0 {
                    self.scale.min(MAX_SNAPSHOT_SCALE)
                } else {
                    1.0
                },
            },
            None => Invocation::Run(config),
        }
    }

    pub fn pid_path(&self) -> PathBuf {
        self.pid_file.clone().unwrap_or_else(default_pid_path)
    }
}

/// Session minutes from the positional argument
///
/// Anything that is not a finite, positive number falls back to the default
/// without complaint.
pub fn parse_minutes(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|m| m.is_finite() && *m > 0.0)
        .unwrap_or(DEFAULT_MINUTES)
}

/// Line printed when the overlay starts
pub fn status_line(config: &SessionConfig) -> String {
    format!(
        "zen-timer: {}m - `zen-timer stop` to end",
        format_minutes(config.minutes())
    )
}

fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{}", minutes as i64)
    } else {
        format!("{:.1}", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Invocation {
        Args::try_parse_from(argv).unwrap().invocation()
    }

    #[test]
    fn test_minutes_argument() {
        let Invocation::Run(config) = parse(&["zen-timer", "30"]) else {
            panic!("expected run");
        };
        assert_eq!(config.duration_secs, 1800.0);
    }

    #[test]
    fn test_invalid_minutes_fall_back_to_default() {
        for argv in [
            vec!["zen-timer", "abc"],
            vec!["zen-timer"],
            vec!["zen-timer", "-5"],
            vec!["zen-timer", "0"],
            vec!["zen-timer", "NaN"],
            vec!["zen-timer", "inf"],
        ] {
            let Invocation::Run(config) = parse(&argv) else {
                panic!("expected run for {:?}", argv);
            };
            assert_eq!(config.duration_secs, 2700.0, "argv {:?}", argv);
        }
    }

    #[test]
    fn test_fractional_minutes() {
        let Invocation::Run(config) = parse(&["zen-timer", "0.5"]) else {
            panic!("expected run");
        };
        assert_eq!(config.duration_secs, 30.0);
    }

    #[test]
    fn test_stray_arguments_are_ignored() {
        let run = |argv: &[&str]| match Args::parse_lenient(argv).invocation() {
            Invocation::Run(config) => config.duration_secs,
            other => panic!("expected run for {:?}, got {:?}", argv, other),
        };
        assert_eq!(run(&["zen-timer", "30", "extra"]), 1800.0);
        assert_eq!(run(&["zen-timer", "--bogus"]), 2700.0);
        assert_eq!(run(&["zen-timer", "-x"]), 2700.0);
        assert_eq!(run(&["zen-timer", "10", "--snapshot"]), 600.0);
    }

    #[test]
    fn test_stop_with_extra_arguments() {
        assert_eq!(
            Args::parse_lenient(["zen-timer", "stop", "now"]).invocation(),
            Invocation::Stop
        );
    }

    #[test]
    fn test_lenient_parse_matches_strict_on_valid_input() {
        let args = Args::parse_lenient(["zen-timer", "5", "--pid-file", "/tmp/x.pid"]);
        assert_eq!(args.target.as_deref(), Some("5"));
        assert_eq!(args.pid_path(), PathBuf::from("/tmp/x.pid"));
    }

    #[test]
    fn test_snapshot_scale_is_bounded() {
        let scale_of = |value: &str| {
            match parse(&["zen-timer", "--snapshot", "f.png", "--scale", value]) {
                Invocation::Snapshot { scale, .. } => scale,
                other => panic!("expected snapshot, got {:?}", other),
            }
        };
        assert_eq!(scale_of("2000"), MAX_SNAPSHOT_SCALE);
        assert_eq!(scale_of("3"), 3.0);
        assert_eq!(scale_of("0"), 1.0);
    }

    #[test]
    fn test_stop() {
        assert_eq!(parse(&["zen-timer", "stop"]), Invocation::Stop);
    }

    #[test]
    fn test_snapshot() {
        let invocation = parse(&[
            "zen-timer", "10", "--snapshot", "frame.png", "--at", "300",
        ]);
        let Invocation::Snapshot {
            config,
            path,
            at_secs,
            scale,
        } = invocation
        else {
            panic!("expected snapshot");
        };
        assert_eq!(config.duration_secs, 600.0);
        assert_eq!(path, PathBuf::from("frame.png"));
        assert_eq!(at_secs, 300.0);
        assert_eq!(scale, 2.0);
    }

    #[test]
    fn test_pid_path_override() {
        let args = Args::try_parse_from(["zen-timer", "--pid-file", "/tmp/other.pid"]).unwrap();
        assert_eq!(args.pid_path(), PathBuf::from("/tmp/other.pid"));

        let args = Args::try_parse_from(["zen-timer"]).unwrap();
        assert_eq!(args.pid_path(), default_pid_path());
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            status_line(&SessionConfig::from_minutes(45.0)),
            "zen-timer: 45m - `zen-timer stop` to end"
        );
        assert!(status_line(&SessionConfig::from_minutes(2.5)).starts_with("zen-timer: 2.5m"));
    }
}
