//! mira-cli — Mira partner program simulator.
//!
//! Runs the month-by-month tier progression and settlement simulation for
//! an account and its downline, and inspects the tier table.

mod config;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mira_core::amount::{parse_amount, parse_percent, parse_points, LenientAmount};
use mira_core::scenario::{parse_start_month, ScenarioMonth};
use mira_core::tiers::{RateOverride, TierTable};

use crate::config::CliConfig;

/// Mira partner program tier and settlement simulator.
#[derive(Parser)]
#[command(name = "mira-cli")]
#[command(version, about = "Simulate Mira tier progression and rewards.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the account and its downline month by month.
    Simulate(SimulateArgs),
    /// List the tier table.
    Tiers(TiersArgs),
    /// Show next-tier progress for a points total.
    Progress(ProgressArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// Scenario JSON file (default: $MIRA_SCENARIO, then the config dir).
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Upline share ratio in percent.
    #[arg(long)]
    upline_share: Option<String>,

    /// Settlement ratio in percent.
    #[arg(long)]
    settlement_ratio: Option<String>,

    /// Tier rate override, `TIER=PCT` with a tier name or index. Repeatable.
    #[arg(long = "rate", value_name = "TIER=PCT")]
    rates: Vec<RateOverride>,

    /// Month recharges in yuan, `SELF:DOWNLINE`. Repeatable; replaces the
    /// scenario's months.
    #[arg(long = "month", value_name = "SELF:DOWNLINE")]
    months: Vec<String>,

    /// First calendar month, `YYYY-MM`.
    #[arg(long)]
    start_month: Option<String>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Print calculation traces.
    #[arg(long)]
    trace: bool,
}

#[derive(Args)]
struct TiersArgs {
    /// Tier rate override, `TIER=PCT`. Repeatable.
    #[arg(long = "rate", value_name = "TIER=PCT")]
    rates: Vec<RateOverride>,

    /// Print the table as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ProgressArgs {
    /// Status points held. Unparsable or negative input counts as 0.
    #[arg(long, allow_hyphen_values = true)]
    points: String,

    /// Points earned so far this month, for the retention check.
    #[arg(long, allow_hyphen_values = true)]
    month_points: Option<String>,
}

impl ProgressArgs {
    /// `(points, month_points)` after lenient coercion.
    fn coerced(&self) -> (u64, Option<u64>) {
        (
            parse_points(&self.points),
            self.month_points.as_deref().map(parse_points),
        )
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Tiers(args) => tiers(args),
        Commands::Progress(args) => progress(args),
    }
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = CliConfig::from_env();
    let mut scenario = config.load_scenario(args.scenario)?;

    if !args.months.is_empty() {
        scenario.months = args.months.iter().map(|m| parse_month_arg(m)).collect();
    }
    if let Some(start) = args.start_month {
        parse_start_month(&start).with_context(|| format!("invalid --start-month {start}"))?;
        scenario.start_month = Some(start);
    }
    if scenario.months.is_empty() {
        bail!("scenario has no months");
    }

    let mut params = scenario.params(config.base_params());
    if let Some(pct) = &args.upline_share {
        params.upline_share_bps = parse_percent(pct);
    }
    if let Some(pct) = &args.settlement_ratio {
        params.settlement_ratio_bps = parse_percent(pct);
    }

    let table = scenario
        .tier_table(&TierTable::default())?
        .with_overrides(&args.rates)
        .context("invalid --rate override")?;
    let months = scenario.month_inputs()?;

    let report = mira_engine::simulate_two_pass(&table, &months, &params);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::render_report(&report, args.trace));
    }
    Ok(())
}

fn tiers(args: TiersArgs) -> Result<()> {
    let table = TierTable::default()
        .with_overrides(&args.rates)
        .context("invalid --rate override")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        println!("{}", render::render_tiers(&table));
    }
    Ok(())
}

fn progress(args: ProgressArgs) -> Result<()> {
    let (points, month_points) = args.coerced();
    let table = TierTable::default();
    let progress = table.progress(points);
    let shortfall = month_points.map(|m| table.retention_shortfall(progress.current.index, m));
    println!("{}", render::render_progress(&progress, points, shortfall));
    Ok(())
}

/// Parse `SELF:DOWNLINE` yuan amounts. Either side may be blank or garbage
/// and counts as 0; a missing downline is 0.
fn parse_month_arg(s: &str) -> ScenarioMonth {
    let (own, team) = s.split_once(':').unwrap_or((s, ""));
    ScenarioMonth {
        self_recharge: LenientAmount(parse_amount(own)),
        downline_recharge: LenientAmount(parse_amount(team)),
        ..ScenarioMonth::default()
    }
}
