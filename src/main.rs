mod cli;
mod error;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::cli::OutputOptions;
use crate::services::{DealEvaluator, FetchConfig, HomeCheck, DEFAULT_TIMEOUT_SECS, RAYS_SCHEDULE_URL};

#[derive(Parser)]
#[command(name = "strikeout-deal")]
#[command(about = "Checks whether the Rays strikeout food deal is currently active")]
struct Cli {
    /// Skip TLS certificate verification for the schedule request
    #[arg(long)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Schedule endpoint to query
    #[arg(long, default_value = RAYS_SCHEDULE_URL)]
    schedule_url: String,

    /// How the latest home game is recognised
    #[arg(long, value_enum, default_value_t = HomeCheckArg::FirstSlot)]
    home_check: HomeCheckArg,

    /// Print the deal terms and the game the decision was based on
    #[arg(long)]
    details: bool,

    /// Print a JSON report instead of the status line
    #[arg(long, conflicts_with = "details")]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum HomeCheckArg {
    /// First listed competitor is home
    FirstSlot,
    /// The Rays' own entry is home
    TargetTeam,
}

impl From<HomeCheckArg> for HomeCheck {
    fn from(arg: HomeCheckArg) -> Self {
        match arg {
            HomeCheckArg::FirstSlot  => HomeCheck::FirstSlot,
            HomeCheckArg::TargetTeam => HomeCheck::TargetTeam,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Diagnostics go to stderr; stdout carries only the status
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = FetchConfig {
        schedule_url: cli.schedule_url,
        timeout: Duration::from_secs(cli.timeout_secs),
        accept_invalid_certs: cli.insecure,
    };
    let evaluator = DealEvaluator::new(config).with_home_check(cli.home_check.into());

    cli::check_deal(&evaluator, OutputOptions { details: cli.details, json: cli.json }).await?;

    Ok(())
}
