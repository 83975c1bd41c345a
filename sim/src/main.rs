//! rewards-sim: replay a rewards hook scenario from a TOML file.

use anyhow::Context;
use clap::Parser;
use rewards_sim::{SimConfig, Simulator};
use rewards_utils::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rewards-sim", about = "Rewards hook scenario simulator")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the scenario file's value.
    #[arg(long, env = "REWARDS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Defaults to the scenario file's value.
    #[arg(long, env = "REWARDS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario and print the report.
    Run {
        /// Path to the scenario TOML file.
        #[arg(long, env = "REWARDS_SCENARIO")]
        scenario: PathBuf,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        report_json: bool,
    },
    /// Print an example scenario to start from.
    Example,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            scenario,
            report_json,
        } => {
            let config = SimConfig::from_toml_file(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;

            let format = cli.log_format.unwrap_or(config.log_format);
            let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
            rewards_utils::init_logging(format, level)?;
            tracing::info!(
                scenario = %scenario.display(),
                steps = config.steps.len(),
                "running scenario"
            );

            let mut sim = Simulator::new(config)?;
            let report = sim.run()?;
            if report_json {
                println!("{}", report.to_json()?);
            } else {
                println!("{report}");
            }
        }
        Command::Example => {
            print!("{}", SimConfig::example().to_toml_string()?);
        }
    }
    Ok(())
}
