use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourney_engine::calculate::promotion;
use tourney_engine::calculate::resolver::{resolve_templates, ResolveContext};
use tourney_engine::calculate::standings;
use tourney_engine::calculate::tiebreak::TieBreakChain;
use tourney_engine::config::RuleConfig;
use tourney_engine::models::{Match, Team};
use tourney_engine::notify::LogSink;
use tourney_engine::pipeline::Pipeline;
use tourney_engine::storage::{FixtureData, Store};

#[derive(Parser)]
#[command(name = "tourney-engine")]
#[command(about = "Standings and bracket promotion engine for multi-stage tournaments")]
#[command(version)]
struct Cli {
    /// Path to rule configuration file
    #[arg(long, default_value = "./rules.toml")]
    config: String,

    /// Fixture directory with the tournament's JSONL files
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a block's current standings
    Standings {
        /// Block code (e.g., "A")
        #[arg(long)]
        block: String,
    },

    /// Report promotion issues without changing anything
    Validate,

    /// Apply safe promotion fixes and write the fixture back
    Fix,

    /// Run the full confirmation flow for a match and write the fixture back
    Confirm {
        /// Match code (e.g., "M3")
        #[arg(long = "match")]
        match_code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting tourney-engine v{}", env!("CARGO_PKG_VERSION"));

    let config_path = PathBuf::from(&cli.config);
    let config = if config_path.exists() {
        RuleConfig::from_file(&config_path).context("loading rule configuration")?
    } else {
        tracing::debug!("no config file at {:?}, using defaults", config_path);
        RuleConfig::default()
    };

    let data_dir = PathBuf::from(&cli.data_dir);
    let fixture = FixtureData::load(&data_dir).context("loading fixture directory")?;

    match cli.command {
        Commands::Standings { block } => {
            print_standings(&fixture, &config, &block)?;
        }

        Commands::Validate => {
            let ctx = ResolveContext {
                blocks: &fixture.blocks,
                snapshots: &fixture.snapshots,
                teams: &fixture.teams,
                matches: &fixture.matches,
                overrides: &fixture.overrides,
            };
            let resolved = resolve_templates(&fixture.templates, &ctx);
            let issues = promotion::validate(&resolved, &fixture.matches);

            if issues.is_empty() {
                println!("No promotion issues.");
            } else {
                for issue in &issues {
                    println!("[{}] {}", issue.severity, issue.message());
                }
                println!("{} issue(s) found.", issues.len());
            }
        }

        Commands::Fix => {
            let store = Arc::new(fixture.into_store().await);
            let pipeline = Pipeline::new(store.clone(), Arc::new(LogSink), config)?;

            let report = pipeline.revalidate_all().await?;
            println!(
                "Fixed {} slot(s), skipped {} confirmed mismatch(es), {} failure(s).",
                report.fixes.fixed.len(),
                report.fixes.skipped,
                report.fixes.failed.len()
            );

            save_store(&*store, &data_dir).await?;
        }

        Commands::Confirm { match_code } => {
            let store = Arc::new(fixture.into_store().await);

            let m = store
                .matches()
                .await?
                .into_iter()
                .find(|m| m.code == match_code);
            let Some(m) = m else {
                bail!("no match with code {match_code}");
            };

            let pipeline = Pipeline::new(store.clone(), Arc::new(LogSink), config)?;
            let report = pipeline.match_confirmed(&m.id).await?;

            println!(
                "Block {}: snapshot v{:?}, {} unresolved tie(s), {} slot(s) fixed, {} skipped.",
                report.block_id,
                report.snapshot_version,
                report.unresolved_ties,
                report.validation.fixes.fixed.len(),
                report.validation.fixes.skipped,
            );

            save_store(&*store, &data_dir).await?;
        }
    }

    Ok(())
}

/// Compute and print one block's standings from the fixture.
fn print_standings(fixture: &FixtureData, config: &RuleConfig, block_code: &str) -> Result<()> {
    let Some(block) = fixture.blocks.iter().find(|b| b.code == block_code) else {
        bail!("no block with code {block_code}");
    };

    let teams: Vec<Team> = fixture
        .teams
        .iter()
        .filter(|t| block.has_team(&t.id))
        .cloned()
        .collect();
    let matches: Vec<Match> = fixture
        .matches
        .iter()
        .filter(|m| m.block_id == block.id)
        .cloned()
        .collect();

    let chain = if config.tiebreak.is_empty() {
        None
    } else {
        Some(TieBreakChain::validate(
            &config.tiebreak,
            &config.sport_rules(),
        )?)
    };

    let outcome = standings::calculate(
        &teams,
        &matches,
        &config.points,
        &config.walkover,
        chain.as_ref(),
    );

    println!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4}",
        "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for standing in &outcome.standings {
        let name = teams
            .iter()
            .find(|t| t.id == standing.team_id)
            .map(|t| t.name.as_str())
            .unwrap_or("?");
        let pos = if standing.position == 0 {
            "-".to_string()
        } else {
            standing.position.to_string()
        };
        println!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4}",
            pos,
            name,
            standing.played,
            standing.wins,
            standing.draws,
            standing.losses,
            standing.goals_for,
            standing.goals_against,
            standing.goal_difference,
            standing.points,
        );
    }

    for group in &outcome.unresolved {
        println!(
            "Tie requires manual resolution: {} team(s) level after the full chain.",
            group.team_ids.len()
        );
    }

    Ok(())
}

/// Dump the store's current state back to the fixture directory.
async fn save_store(store: &dyn Store, data_dir: &PathBuf) -> Result<()> {
    let data = FixtureData {
        teams: store.teams().await?,
        blocks: store.blocks().await?,
        matches: store.matches().await?,
        templates: store.templates().await?,
        overrides: store.overrides().await?,
        snapshots: store.snapshots().await?,
    };
    data.save(data_dir).context("saving fixture directory")?;
    Ok(())
}
