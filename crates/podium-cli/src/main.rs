//! Podium - gymnastics medal-outcome simulation CLI
//!
//! The `podium` command runs Monte Carlo medal simulations over a roster of
//! athletes and their predicted apparatus scores.
//!
//! ## Commands
//!
//! - `simulate`: Run trials and print the medal table
//! - `country`: Show one country's rows from a saved result
//! - `roster`: Validate a roster file and list its athletes

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use podium_core::{
    run_parallel, Apparatus, Athlete, CancelFlag, NoiseModel, RosterStore, SeedPolicy,
    Simulation, SimulationConfig, SimulationOutcome, Standing, DEFAULT_NOISE_STD_DEV, METRICS,
};

#[derive(Parser)]
#[command(name = "podium")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Monte Carlo medal-outcome simulation for gymnastics rosters", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate medal outcomes for a roster
    Simulate(SimulateArgs),

    /// Show one country's athletes from a saved simulation result
    Country {
        /// Simulation result written by `simulate --output`
        #[arg(short, long)]
        results: PathBuf,

        /// Country code (case-insensitive)
        #[arg(short, long)]
        country: String,

        /// Maximum number of rows to show
        #[arg(short, long, default_value = "5")]
        limit: usize,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Validate a roster file and list its athletes
    Roster {
        /// Roster file (JSON array of athletes)
        #[arg(short, long)]
        roster: PathBuf,
    },
}

#[derive(Args)]
#[command(group(ArgGroup::new("seed_policy").required(true).args(["seed", "entropy"])))]
struct SimulateArgs {
    /// Roster file (JSON array of athletes)
    #[arg(short, long)]
    roster: PathBuf,

    /// Number of trials
    #[arg(short, long, env = "PODIUM_TRIALS", default_value = "1000")]
    trials: u64,

    /// Comma-separated apparatus codes, simulated in this order
    #[arg(short, long, default_value = "BB,VT,FX,UB")]
    apparatus: String,

    /// Seed for a reproducible run
    #[arg(long, env = "PODIUM_SEED")]
    seed: Option<u64>,

    /// Draw the seed from system entropy (the seed is still reported)
    #[arg(long)]
    entropy: bool,

    /// Standard deviation of the per-score Gaussian noise
    #[arg(long, env = "PODIUM_NOISE_SD", default_value_t = DEFAULT_NOISE_STD_DEV)]
    noise_sd: f64,

    /// Number of blocking worker tasks
    #[arg(short, long, env = "PODIUM_WORKERS", default_value = "1")]
    workers: usize,

    /// Append an athlete before running: "First,Last,CTRY,BB=15.0,VT=14.2"
    #[arg(long = "add", value_name = "ATHLETE")]
    add: Vec<String>,

    /// Remove the most recently added athlete before running
    #[arg(long)]
    remove_last: bool,

    /// Only show athletes from this country
    #[arg(short, long)]
    country: Option<String>,

    /// Maximum number of rows to show
    #[arg(short, long)]
    limit: Option<usize>,

    /// Write the full result as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    podium_core::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Simulate(args) => cmd_simulate(args, &mut std::io::stdout()).await,
        Commands::Country {
            results,
            country,
            limit,
            format,
        } => cmd_country(&results, &country, limit, format),
        Commands::Roster { roster } => cmd_roster(&roster),
    };

    METRICS.flush();
    result
}

/// Run a simulation and write the table or JSON to `out`. Status messages go
/// to the log so that `out` only ever holds the result.
async fn cmd_simulate<W: Write>(args: SimulateArgs, out: &mut W) -> Result<()> {
    let mut store = load_roster(&args.roster)?;
    for arg in &args.add {
        let athlete = parse_athlete_arg(arg)?;
        let name = athlete.display_name();
        let country = athlete.country.clone();
        store
            .append(athlete)
            .with_context(|| format!("Failed to add athlete '{}'", arg))?;
        info!(athlete = %name, country = %country, "added athlete");
    }
    if args.remove_last {
        let removed = store
            .remove_last()
            .context("Cannot remove an athlete from an empty roster")?;
        info!(athlete = %removed.display_name(), "removed last athlete");
    }

    let seed = match args.seed {
        Some(seed) => SeedPolicy::Fixed(seed),
        None => SeedPolicy::Entropy,
    };
    let apparatus = Apparatus::parse_list(&args.apparatus)?;
    let config = SimulationConfig::new(args.trials, apparatus, seed)
        .with_noise(NoiseModel::new(args.noise_sd));
    let simulation = Simulation::new(config).context("Invalid simulation settings")?;

    let cancel = CancelFlag::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received; stopping after the current trial");
                cancel.cancel();
            }
        })
    };

    let snapshot = store.snapshot();
    let outcome = run_parallel(&simulation, &snapshot, args.workers, Some(cancel)).await;
    watcher.abort();
    let outcome = outcome?;

    if let Some(path) = &args.output {
        write_outcome(path, &outcome)?;
        info!(path = %path.display(), "wrote result");
    }

    let rows: Vec<&Standing> = match &args.country {
        Some(country) => outcome.for_country(country, args.limit),
        None => outcome
            .standings
            .iter()
            .take(args.limit.unwrap_or(usize::MAX))
            .collect(),
    };

    match args.format {
        OutputFormat::Json if args.country.is_none() && args.limit.is_none() => {
            writeln!(out, "{}", serde_json::to_string_pretty(&outcome)?)?
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&to_rows(&rows))?)?
        }
        OutputFormat::Table => {
            writeln!(out, "{}", render_summary(&outcome))?;
            writeln!(out, "{}", render_table(&rows))?;
        }
    }
    Ok(())
}

fn cmd_country(results: &Path, country: &str, limit: usize, format: OutputFormat) -> Result<()> {
    let outcome = load_outcome(results)?;
    let rows = outcome.for_country(country, Some(limit));
    if rows.is_empty() && format == OutputFormat::Table {
        println!("No athletes from '{}' in {:?}", country, results);
        return Ok(());
    }
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_rows(&rows))?),
        OutputFormat::Table => println!("{}", render_table(&rows)),
    }
    Ok(())
}

fn cmd_roster(path: &Path) -> Result<()> {
    let store = load_roster(path)?;
    let snapshot = store.snapshot();

    println!("{} athletes", snapshot.len());
    for athlete in snapshot.athletes() {
        let scores = athlete
            .scores
            .iter()
            .map(|(apparatus, score)| format!("{}={:.3}", apparatus, score))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {:<28} {:<4} {}",
            athlete.display_name(),
            athlete.country,
            scores
        );
    }
    println!("Countries: {}", snapshot.countries().join(", "));
    println!("Digest:    {}", snapshot.digest());
    Ok(())
}

fn load_roster(path: &Path) -> Result<RosterStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file: {:?}", path))?;
    RosterStore::from_json_str(&json)
        .with_context(|| format!("Invalid roster file: {:?}", path))
}

fn load_outcome(path: &Path) -> Result<SimulationOutcome> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file: {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid results file: {:?}", path))
}

fn write_outcome(path: &Path, outcome: &SimulationOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}

/// Parse `First,Last,CTRY[,CODE=score]...` into an athlete with a fresh id.
fn parse_athlete_arg(arg: &str) -> Result<Athlete> {
    let mut parts = arg.split(',').map(str::trim);
    let (Some(first), Some(last), Some(country)) = (parts.next(), parts.next(), parts.next())
    else {
        bail!(
            "Athlete must be given as First,Last,CTRY[,CODE=score]..., got '{}'",
            arg
        );
    };

    let mut athlete = Athlete::new(first, last, country);
    for entry in parts.filter(|p| !p.is_empty()) {
        let Some((code, score)) = entry.split_once('=') else {
            bail!("Expected CODE=score, got '{}'", entry);
        };
        let apparatus: Apparatus = code.parse()?;
        let score: f64 = score
            .trim()
            .parse()
            .with_context(|| format!("Invalid score for {}: '{}'", apparatus, score))?;
        athlete = athlete.with_score(apparatus, score);
    }
    Ok(athlete)
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    first_name: &'a str,
    last_name: &'a str,
    country: &'a str,
    gold: u64,
    silver: u64,
    bronze: u64,
}

fn to_rows<'a>(standings: &[&'a Standing]) -> Vec<Row<'a>> {
    standings
        .iter()
        .map(|s| Row {
            first_name: &s.athlete.first_name,
            last_name: &s.athlete.last_name,
            country: &s.athlete.country,
            gold: s.medals.gold,
            silver: s.medals.silver,
            bronze: s.medals.bronze,
        })
        .collect()
}

fn render_summary(outcome: &SimulationOutcome) -> String {
    let mut out = format!(
        "Run {} (seed {}): {}/{} trials {:?}",
        outcome.run_id,
        outcome.seed,
        outcome.trials_completed,
        outcome.trials_requested,
        outcome.status
    );
    for warning in &outcome.warnings {
        out.push_str(&format!(
            "\n  warning: {} had {} eligible athlete(s); {} podium places not awarded",
            warning.apparatus, warning.eligible, warning.positions_skipped
        ));
    }
    out
}

fn render_table(rows: &[&Standing]) -> String {
    let mut out = format!(
        "{:<28} {:<4} {:>7} {:>7} {:>7} {:>7}",
        "Athlete", "CTRY", "Gold", "Silver", "Bronze", "Total"
    );
    for row in rows {
        out.push_str(&format!(
            "\n{:<28} {:<4} {:>7} {:>7} {:>7} {:>7}",
            row.athlete.display_name(),
            row.athlete.country,
            row.medals.gold,
            row.medals.silver,
            row.medals.bronze,
            row.medals.total()
        ));
    }
    out
}
