// skybar entry point.
// Parses the command line, sets up logging and prints one Waybar record per invocation.

mod app;
mod cache;
mod config;
mod error;
mod location;
mod moon;
mod ui;
mod weather;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::ui::WaybarOutput;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SKYBAR_LOG";

#[derive(Debug, Parser)]
#[command(name = "skybar", version, about = "Moon phase, Ekadashi and weather modules for Waybar")]
pub struct Cli {
    /// Path to skybar.conf (defaults to the per-user config directory)
    #[arg(long, env = "SKYBAR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log more to stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current moon phase and next Ekadashi
    Moon {
        /// Observer latitude in degrees
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        /// Observer longitude in degrees
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
    },
    /// Current weather, forecast and moon summary
    Weather {
        /// Ignore the cached snapshot and fetch now
        #[arg(long)]
        refresh: bool,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        1 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };

    // stdout belongs to the bar
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = match app::run(cli).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("{}", e);
            WaybarOutput::error(&e)
        }
    };

    println!("{}", output.to_json());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moon_with_negative_coordinates() {
        let cli = Cli::try_parse_from(["skybar", "moon", "--lat", "-33.9", "--lon", "18.4"]).unwrap();
        match cli.command {
            Command::Moon { lat, lon } => {
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(18.4));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(Cli::try_parse_from(["skybar", "moon", "--lat", "10"]).is_err());
    }

    #[test]
    fn test_parse_weather_flags() {
        let cli =
            Cli::try_parse_from(["skybar", "-v", "weather", "--refresh", "--config", "/tmp/s.conf"])
                .unwrap();
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.conf")));
        assert!(matches!(cli.command, Command::Weather { refresh: true }));
    }
}
