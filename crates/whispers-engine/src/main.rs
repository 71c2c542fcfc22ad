//! Command-line runner for the Whispers simulation.
//!
//! Loads a configuration, runs the day cycle for the configured number of
//! days and writes the metrics report and final snapshot.
//!
//! # Usage
//!
//! ```text
//! whispers-engine [CONFIG] [--resume SNAPSHOT]
//! ```
//!
//! `CONFIG` defaults to `whispers-config.yaml`; when that file does not exist
//! the built-in defaults are used. With `--resume` the run continues from a
//! saved snapshot instead of seeding a new population.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration
//! 3. Initialize structured logging (tracing)
//! 4. Build the simulation, either seeded or restored from a snapshot
//! 5. Run until the configured day count
//! 6. Write the metrics report and final snapshot
//! 7. Log the summary

mod error;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use whispers_core::config::LoggingConfig;
use whispers_core::{Simulation, SimulationConfig, snapshot};

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "whispers-config.yaml";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "whispers-engine")]
#[command(version)]
#[command(about = "Seeded foraging and negotiation simulation")]
struct Cli {
    /// Configuration file (YAML); `whispers-config.yaml` or defaults if omitted
    config: Option<PathBuf>,

    /// Snapshot to continue from instead of seeding a new population
    #[arg(long)]
    resume: Option<PathBuf>,
}

fn main() -> Result<(), EngineError> {
    // 1. Arguments.
    let cli = Cli::parse();

    // 2. Configuration.
    let (config, config_source) = load_config(cli.config.as_deref())?;

    // 3. Logging. RUST_LOG wins over the configured level.
    init_logging(&config.logging)?;
    info!(
        source = %config_source,
        seed = config.world.seed,
        days = config.world.days,
        "configuration loaded"
    );

    // 4. Simulation.
    let mut simulation = match cli.resume {
        Some(path) => {
            let saved = snapshot::load(&path)?;
            Simulation::restore(config.clone(), &saved)?
        }
        None => Simulation::new(config.clone())?,
    };
    info!(
        day = simulation.day(),
        population = simulation.live_count(),
        "simulation ready"
    );

    // 5. Run.
    let report = simulation.run();

    // 6. Outputs.
    if let Some(path) = config.output.metrics_path.as_deref() {
        report.write_json(Path::new(path))?;
        info!(path, "metrics written");
    }
    if let Some(path) = config.output.snapshot_path.as_deref() {
        snapshot::save(&simulation.snapshot(), Path::new(path))?;
    }

    // 7. Summary.
    for (key, value) in &report.summary {
        info!(%key, %value, "summary");
    }
    if simulation.live_count() == 0 {
        warn!(day = simulation.day(), "run ended with no survivors");
    }
    info!(day = simulation.day(), "run complete");
    Ok(())
}

/// Load configuration from an explicit path, or from `whispers-config.yaml`
/// when present, or fall back to defaults.
///
/// An explicit path that does not exist is an error. Returns the config and
/// a description of where it came from.
fn load_config(explicit: Option<&Path>) -> Result<(SimulationConfig, String), EngineError> {
    if let Some(path) = explicit {
        let config = SimulationConfig::from_file(path)?;
        return Ok((config, path.display().to_string()));
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = SimulationConfig::from_file(default_path)?;
        Ok((config, DEFAULT_CONFIG_PATH.to_owned()))
    } else {
        Ok((SimulationConfig::default(), "defaults".to_owned()))
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let installed = if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("whispers-engine").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_defaults() {
        let cli = parse(&[]);
        assert!(matches!(cli, Ok(Cli { config: None, resume: None })));
    }

    #[test]
    fn config_and_resume_are_parsed() {
        let cli = parse(&["run.yaml", "--resume", "snap.json"]);
        assert!(matches!(
            cli,
            Ok(Cli { config: Some(ref c), resume: Some(ref r) })
                if c == Path::new("run.yaml") && r == Path::new("snap.json")
        ));
    }

    #[test]
    fn resume_without_path_is_rejected() {
        assert!(parse(&["--resume"]).is_err());
    }

    #[test]
    fn unknown_options_and_extra_arguments_are_rejected() {
        assert!(parse(&["--fast"]).is_err());
        assert!(parse(&["a.yaml", "b.yaml"]).is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/whispers.yaml")));
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }
}
