//! MLB Betting CLI - train, score and backtest moneyline bets

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mlb_betting::backtesting::{analyze_by_odds_range, analyze_by_team, BettingResult, SyntheticSeason};
use mlb_betting::config::PipelineConfig;
use mlb_betting::data::{load_games, resolve_team};
use mlb_betting::model::ParameterSummary;
use mlb_betting::pipeline::{self, PipelineRun};
use mlb_betting::GameRecord;

#[derive(Parser)]
#[command(name = "mlb-betting")]
#[command(author, version, about = "MLB moneyline prediction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Where games come from, plus per-run overrides of the config file
#[derive(Args)]
struct RunArgs {
    /// Games CSV (date, home_team, away_team, scores, hits, errors, moneylines)
    #[arg(short, long, required_unless_present = "synthetic")]
    games: Option<PathBuf>,

    /// Use a generated three-team season instead of a CSV
    #[arg(long, conflicts_with = "games")]
    synthetic: bool,

    /// Rolling window in games
    #[arg(long)]
    window: Option<usize>,

    /// Minimum edge for a bet (strictly greater than)
    #[arg(long)]
    threshold: Option<f64>,

    /// Flat stake per bet
    #[arg(long)]
    stake: Option<f64>,

    /// Model artifact path
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Posterior draws per chain
    #[arg(long)]
    draws: Option<usize>,

    /// Tuning iterations per chain
    #[arg(long)]
    tune: Option<usize>,

    /// Number of chains
    #[arg(long)]
    chains: Option<usize>,

    /// Sampler seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train, score in-sample and simulate betting
    Run {
        #[command(flatten)]
        args: RunArgs,

        /// Number of rows in each breakdown table
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Train and save the model
    Train {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Score games with a saved model and simulate betting
    Predict {
        #[command(flatten)]
        args: RunArgs,

        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Resolve team names to canonical codes
    Teams {
        /// Names such as "Boston Red Sox" or "cleveland indians"
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => PipelineConfig::default(),
    };
    init_logging(&config.log_level)?;

    println!("{}", "MLB Betting CLI v0.1.0".cyan().bold());
    println!();

    match cli.command {
        Commands::Run { args, top } => {
            let config = apply_overrides(config, &args)?;
            let games = load_input(&args)?;
            let run = with_spinner("Training model and running backtest...", || {
                pipeline::run(&games, &config)
            })?
            .context("Pipeline run failed")?;
            print_summary_table(&run.summary);
            print_run(&run, top);
            println!("\n{}: {:?}", "Model saved".green(), config.model_path);
        }
        Commands::Train { args } => {
            let config = apply_overrides(config, &args)?;
            let games = load_input(&args)?;
            let (training, fitted) =
                with_spinner("Sampling posterior...", || pipeline::train(&games, &config))?
                    .context("Training failed")?;
            println!(
                "Trained on {} rows, {} posterior draws",
                training.rows.len(),
                fitted.posterior.num_samples()
            );
            print_summary_table(&fitted.summary());
            println!("\n{}: {:?}", "Model saved".green(), config.model_path);
        }
        Commands::Predict { args, top } => {
            let config = apply_overrides(config, &args)?;
            let games = load_input(&args)?;
            let run = pipeline::predict_with_saved_model(&games, &config)
                .with_context(|| format!("Prediction with {:?} failed", config.model_path))?;
            print_run(&run, top);
        }
        Commands::Teams { names } => {
            for name in names {
                match resolve_team(&name) {
                    Some(code) => println!("{:<28} {}", name, code.green()),
                    None => println!("{:<28} {}", name, "unknown".red()),
                }
            }
        }
    }

    Ok(())
}

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

fn apply_overrides(mut config: PipelineConfig, args: &RunArgs) -> Result<PipelineConfig> {
    if let Some(window) = args.window {
        config.window = window;
    }
    if let Some(threshold) = args.threshold {
        config.betting.threshold = threshold;
    }
    if let Some(stake) = args.stake {
        config.betting.stake = stake;
    }
    if let Some(ref path) = args.model_path {
        config.model_path = path.clone();
    }
    if let Some(draws) = args.draws {
        config.sampler.draws = draws;
    }
    if let Some(tune) = args.tune {
        config.sampler.tune = tune;
    }
    if let Some(chains) = args.chains {
        config.sampler.chains = chains;
    }
    if let Some(seed) = args.seed {
        config.sampler.seed = seed;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_input(args: &RunArgs) -> Result<Vec<GameRecord>> {
    if args.synthetic {
        println!("{}", "Using synthetic season".yellow());
        return Ok(SyntheticSeason::default().generate());
    }
    let path: &Path = args.games.as_deref().context("No games file given")?;
    let games =
        load_games(path).with_context(|| format!("Failed to load games from {:?}", path))?;
    println!("{} {} games from {:?}", "Loaded".green(), games.len(), path);
    Ok(games)
}

fn with_spinner<T>(message: &'static str, f: impl FnOnce() -> T) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    let out = f();
    pb.finish_and_clear();
    Ok(out)
}

fn print_summary_table(summary: &[ParameterSummary]) {
    println!("\n{}", "Posterior Summary:".yellow().bold());
    println!("{:<32} {:>10} {:>10}", "Parameter", "Mean", "SD");
    println!("{}", "-".repeat(54));
    for p in summary {
        println!("{:<32} {:>+10.4} {:>10.4}", p.name, p.mean, p.sd);
    }
}

fn print_run(run: &PipelineRun, top: usize) {
    println!(
        "\nScored {} rows (window {})",
        run.training.rows.len(),
        run.training.window
    );
    run.betting.print_summary();
    print_breakdowns(&run.betting, top);
}

fn print_breakdowns(result: &BettingResult, top: usize) {
    let bets: Vec<_> = result.bets().cloned().collect();
    if bets.is_empty() {
        println!("{}", "No bets placed.".yellow());
        return;
    }

    let sections = [
        ("Analysis by Team:", "Team", analyze_by_team(&bets)),
        ("Analysis by Odds Range:", "Range", analyze_by_odds_range(&bets)),
    ];
    for (title, label, analysis) in sections {
        println!("\n{}", title.yellow().bold());
        println!(
            "{:>26} {:>6} {:>6} {:>9} {:>12} {:>9}",
            label, "Bets", "Wins", "Hit Rate", "Profit", "ROI"
        );
        println!("{}", "-".repeat(72));
        for a in analysis.iter().take(top) {
            let profit = format!("{:+.2}", a.profit);
            let profit = if a.profit >= 0.0 {
                profit.green()
            } else {
                profit.red()
            };
            println!(
                "{:>26} {:>6} {:>6} {:>8.1}% {:>12} {:>8.1}%",
                a.key,
                a.bets,
                a.wins,
                a.hit_rate * 100.0,
                profit,
                a.roi
            );
        }
    }
}
