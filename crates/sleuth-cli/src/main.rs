use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use sleuth_cli::config::TableConfig;
use sleuth_cli::logging::init_logging;
use sleuth_cli::{report, session};
use sleuth_core::AppInfo;
use sleuth_core::game::event::Event;

/// Deduction notebook for hidden-card mystery games.
#[derive(Debug, Parser)]
#[command(
    name = "sleuth",
    author,
    version,
    about = "Tracks who holds which card and narrows down the hidden solution"
)]
struct Cli {
    /// Path to the YAML table configuration.
    #[arg(short, long, value_name = "FILE", default_value = "table.yaml")]
    config: PathBuf,

    /// Override the configured tracing level.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate the configuration, then exit.
    Validate,
    /// Replay a game record and print the grid, constraints and solution.
    Replay {
        #[arg(long, value_name = "FILE")]
        log: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Explain why a single cell is settled.
    Explain {
        #[arg(long, value_name = "FILE")]
        log: PathBuf,
        #[arg(long, value_name = "NAME")]
        player: String,
        #[arg(long, value_name = "SLUG")]
        card: String,
    },
    /// Show what a hypothetical suggestion would settle, without recording it.
    WhatIf {
        #[arg(long, value_name = "FILE")]
        log: PathBuf,
        #[arg(long, value_name = "NAME")]
        asker: String,
        /// Suspect, weapon and room, comma separated.
        #[arg(long, value_name = "SLUGS", value_delimiter = ',')]
        triple: Vec<String>,
        #[arg(long, value_name = "NAME")]
        responder: Option<String>,
        #[arg(long, value_name = "SLUG")]
        revealed: Option<String>,
    },
    /// Deal a hidden game, record an honest event stream and check the result.
    Simulate {
        #[arg(long, value_name = "SEED", default_value_t = 0)]
        seed: u64,
        #[arg(long, value_name = "TURNS", default_value_t = 40)]
        turns: usize,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = TableConfig::from_path(&cli.config)?;

    if let Some(level) = cli.log_level {
        config.logging.tracing_level = level;
        config.validate()?;
    }

    let _logging_guard = init_logging(&config.logging)?;

    match cli.command {
        Command::Validate => {
            let setup = config.to_setup()?;
            println!(
                "{} {}: table with {} players, {} cards, observer '{}' ({:?} mode, {:?} on contradiction)",
                AppInfo::name(),
                AppInfo::version(),
                setup.roster().len(),
                setup.universe().len(),
                config.observer,
                setup.mode(),
                setup.policy()
            );
        }
        Command::Replay { log, format } => {
            let record = session::load_record(&log)?;
            let table = session::open_table(&config, &record)?;
            let rendered = match format {
                OutputFormat::Text => report::render_text(&table),
                OutputFormat::Json => report::render_json(&table).context("encoding report")?,
                OutputFormat::Markdown => report::render_markdown(&table),
            };
            println!("{rendered}");
        }
        Command::Explain { log, player, card } => {
            let record = session::load_record(&log)?;
            let table = session::open_table(&config, &record)?;
            let player = session::find_player(&table, &player)?;
            let card = session::find_card(&table, &card)?;
            println!("{}", table.describe(player, card));
        }
        Command::WhatIf {
            log,
            asker,
            triple,
            responder,
            revealed,
        } => {
            let record = session::load_record(&log)?;
            let table = session::open_table(&config, &record)?;
            let event = Event::Suggestion {
                asker: session::find_player(&table, &asker)?,
                triple: Some(session::parse_triple(&table, &triple)?),
                responder: responder
                    .map(|name| session::find_player(&table, &name))
                    .transpose()?,
                revealed: revealed
                    .map(|slug| session::find_card(&table, &slug))
                    .transpose()?,
            };
            let outcome = session::what_if(&table, event)?;
            println!(
                "Settled cells: {} -> {} (+{}); open constraints: {} -> {}",
                outcome.before.settled_cells,
                outcome.after.settled_cells,
                outcome.before.newly_settled(&outcome.after),
                outcome.before.open_constraints,
                outcome.after.open_constraints
            );
            for line in &outcome.newly_settled {
                println!("  {line}");
            }
        }
        Command::Simulate { seed, turns, out } => {
            let setup = config.to_setup()?;
            let outcome = session::simulate(&setup, seed, turns)?;
            session::save_record(&out, &outcome.table)?;
            let metrics = outcome.table.metrics();
            println!(
                "Simulated {turns} turns (seed {seed}) -> {}: {} settled, {} unknown",
                out.display(),
                metrics.settled_cells,
                metrics.unknown_cells
            );
            if outcome.disagreements.is_empty() {
                println!("Every settled cell agrees with the hidden deal.");
            } else {
                anyhow::bail!(
                    "{} settled cells disagree with the hidden deal",
                    outcome.disagreements.len()
                );
            }
        }
    }

    Ok(())
}
