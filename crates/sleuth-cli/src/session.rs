use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sleuth_core::belief::query::GridMetrics;
use sleuth_core::game::event::Event;
use sleuth_core::game::serialization::GameRecord;
use sleuth_core::game::setup::TableSetup;
use sleuth_core::game::simulate::HiddenDeal;
use sleuth_core::game::table::Table;
use sleuth_core::model::card::{CardId, Triple};
use sleuth_core::model::player::PlayerId;
use tracing::{info, warn};

use crate::config::TableConfig;

/// Every nth simulated turn is a failed accusation instead of a suggestion.
const ACCUSATION_EVERY: usize = 6;

pub fn load_record(path: &Path) -> Result<GameRecord> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading game record {}", path.display()))?;
    GameRecord::from_json(&json).with_context(|| format!("parsing game record {}", path.display()))
}

pub fn save_record(path: &Path, table: &Table) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    let json = GameRecord::to_json(table).context("encoding game record")?;
    fs::write(path, json).with_context(|| format!("writing game record {}", path.display()))
}

/// Replays a record. The record carries its own setup; a mismatch with the
/// configured table is reported but not fatal.
pub fn open_table(config: &TableConfig, record: &GameRecord) -> Result<Table> {
    if record.players != config.players || record.observer != config.observer {
        warn!(
            target: "sleuth_cli::session",
            record_players = ?record.players,
            config_players = ?config.players,
            "game record was made for a different table; using the record's setup"
        );
    }
    let table = record.restore().context("replaying game record")?;
    info!(
        target: "sleuth_cli::session",
        events = table.event_log().len(),
        settled = table.metrics().settled_cells,
        "replayed game record"
    );
    Ok(table)
}

pub fn find_player(table: &Table, name: &str) -> Result<PlayerId> {
    table
        .setup()
        .roster()
        .by_name(name)
        .ok_or_else(|| anyhow!("unknown player '{name}'"))
}

pub fn find_card(table: &Table, slug: &str) -> Result<CardId> {
    table
        .setup()
        .universe()
        .card(slug.trim())
        .ok_or_else(|| anyhow!("unknown card '{slug}'"))
}

/// Parses three slugs in suspect, weapon, room order.
pub fn parse_triple(table: &Table, slugs: &[String]) -> Result<Triple> {
    let [suspect, weapon, room] = slugs else {
        bail!("a suggestion needs exactly three cards, got {}", slugs.len());
    };
    let cards = [
        find_card(table, suspect)?,
        find_card(table, weapon)?,
        find_card(table, room)?,
    ];
    Triple::new(table.setup().universe(), cards).context("cards must be one suspect, one weapon and one room, in that order")
}

/// Outcome of a hypothetical event on a scratch copy.
#[derive(Debug, Clone)]
pub struct WhatIfOutcome {
    pub before: GridMetrics,
    pub after: GridMetrics,
    /// Descriptions of the cells the event would settle.
    pub newly_settled: Vec<String>,
}

pub fn what_if(table: &Table, event: Event) -> Result<WhatIfOutcome> {
    let scratch = table
        .what_if(event)
        .context("the hypothetical event cannot be applied")?;
    let grid = table.state().grid();
    let mut newly_settled = Vec::new();
    for player in grid.players() {
        for card in grid.cards() {
            if grid.is_unknown(player, card) && !scratch.state().grid().is_unknown(player, card) {
                newly_settled.push(scratch.describe(player, card));
            }
        }
    }
    Ok(WhatIfOutcome {
        before: table.metrics(),
        after: scratch.metrics(),
        newly_settled,
    })
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub table: Table,
    pub solution: Triple,
    pub disagreements: Vec<(PlayerId, CardId)>,
}

/// Deals a hidden game from `setup` and records an honest event stream as
/// seen by the observer, whose hand is replaced by the dealt one.
pub fn simulate(setup: &TableSetup, seed: u64, turns: usize) -> Result<SimulationOutcome> {
    let mut rng = StdRng::seed_from_u64(seed);
    let deal = HiddenDeal::deal(setup, &mut rng);
    let observed = deal
        .observer_setup(setup)
        .context("dealt hand does not fit the observer")?;
    let mut table = Table::from_setup(observed)?;

    for turn in 0..turns {
        let event = if turn % ACCUSATION_EVERY == ACCUSATION_EVERY - 1 {
            deal.random_failed_accusation(&mut rng)
                .unwrap_or_else(|| deal.random_turn(&mut rng))
        } else {
            deal.random_turn(&mut rng)
        };
        table
            .append(event)
            .with_context(|| format!("simulated turn {} was rejected", turn + 1))?;
    }

    let disagreements = deal.disagreements(table.state().grid());
    info!(
        target: "sleuth_cli::simulate",
        seed,
        turns,
        settled = table.metrics().settled_cells,
        disagreements = disagreements.len(),
        "simulated game"
    );
    Ok(SimulationOutcome {
        table,
        solution: deal.solution(),
        disagreements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(&["Ann", "Bob", "Cat"], "Ann", &[]).unwrap()
    }

    fn slugs(list: &[&str]) -> Vec<String> {
        list.iter().map(|slug| slug.to_string()).collect()
    }

    #[test]
    fn parse_triple_checks_count_and_order() {
        let table = table();
        assert!(parse_triple(&table, &slugs(&["col_mustard", "dagger", "hall"])).is_ok());
        assert!(parse_triple(&table, &slugs(&["col_mustard", "dagger"])).is_err());
        assert!(parse_triple(&table, &slugs(&["dagger", "col_mustard", "hall"])).is_err());
        assert!(parse_triple(&table, &slugs(&["col_mustard", "dagger", "spoon"])).is_err());
    }

    #[test]
    fn players_resolve_by_name_or_id() {
        let table = table();
        assert_eq!(find_player(&table, "Bob").unwrap(), PlayerId::from_index(1));
        assert_eq!(find_player(&table, "p2").unwrap(), PlayerId::from_index(2));
        assert!(find_player(&table, "Eve").is_err());
    }

    #[test]
    fn what_if_lists_new_cells_without_touching_the_table() {
        let table = table();
        let triple = parse_triple(&table, &slugs(&["col_mustard", "dagger", "hall"])).unwrap();
        let outcome = what_if(
            &table,
            Event::Suggestion {
                asker: PlayerId::from_index(0),
                triple: Some(triple),
                responder: None,
                revealed: None,
            },
        )
        .unwrap();
        assert_eq!(outcome.newly_settled.len(), 6);
        assert_eq!(outcome.before.newly_settled(&outcome.after), 6);
        assert!(table.event_log().is_empty());
    }

    #[test]
    fn simulation_is_seeded_and_sound() {
        let setup = TableSetup::classic(&["a", "b", "c", "d"], "a", &[]).unwrap();
        let first = simulate(&setup, 99, 30).unwrap();
        let second = simulate(&setup, 99, 30).unwrap();
        assert_eq!(first.table, second.table);
        assert_eq!(first.table.event_log().len(), 30);
        assert!(first.disagreements.is_empty());
        assert_eq!(first.table.setup().initial_hand().len(), 5);
    }
}
