use super::event::Event;
use super::setup::{ContradictionPolicy, DeductionMode, TableSetup, resolve_slugs};
use super::table::Table;
use crate::error::{DeductionError, SetupError};
use crate::model::card::CardSpec;
use crate::model::deck::CardUniverse;
use serde::{Deserialize, Serialize};

pub const RECORD_VERSION: u32 = 1;

/// Everything needed to rebuild a [`Table`]: the setup and the event log.
/// Derived state is never stored; restoring replays the events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub version: u32,
    pub players: Vec<String>,
    pub observer: String,
    pub initial_hand: Vec<String>,
    #[serde(default)]
    pub mode: DeductionMode,
    #[serde(default)]
    pub policy: ContradictionPolicy,
    /// Present only when the table does not use the classic deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<Vec<CardSpec>>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl GameRecord {
    pub fn capture(table: &Table) -> Self {
        let setup = table.setup();
        let universe = setup.universe();
        let deck = if *universe == CardUniverse::classic() {
            None
        } else {
            Some(universe.specs().to_vec())
        };
        GameRecord {
            version: RECORD_VERSION,
            players: setup
                .roster()
                .players()
                .iter()
                .map(|player| player.name.clone())
                .collect(),
            observer: setup.roster().name(setup.observer()).to_string(),
            initial_hand: setup
                .initial_hand()
                .iter()
                .map(|card| universe.slug(*card).to_string())
                .collect(),
            mode: setup.mode(),
            policy: setup.policy(),
            deck,
            events: table.event_log().as_slice().to_vec(),
        }
    }

    pub fn setup(&self) -> Result<TableSetup, SetupError> {
        if self.version > RECORD_VERSION {
            return Err(SetupError::UnsupportedVersion(self.version));
        }
        let universe = match &self.deck {
            Some(specs) => CardUniverse::from_specs(specs.clone())?,
            None => CardUniverse::classic(),
        };
        let hand: Vec<&str> = self.initial_hand.iter().map(String::as_str).collect();
        let hand = resolve_slugs(&universe, &hand)?;
        Ok(TableSetup::new(universe, &self.players, &self.observer, &hand)?
            .with_mode(self.mode)
            .with_policy(self.policy))
    }

    /// Rebuilds the table by replaying the recorded events.
    pub fn restore(&self) -> Result<Table, DeductionError> {
        Table::replay(self.setup()?, &self.events)
    }

    pub fn to_json(table: &Table) -> Result<String, DeductionError> {
        let record = Self::capture(table);
        Ok(serde_json::to_string_pretty(&record)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DeductionError> {
        Ok(serde_json::from_str(json)?)
    }
}
