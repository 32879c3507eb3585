use crate::belief::constraint::Constraint;
use crate::belief::contradiction::Contradiction;
use crate::belief::engine::{AppliedEffects, BeliefState, reduce};
use crate::belief::grid::{CellState, Explanation, Mark};
use crate::belief::query::{GridMetrics, SolutionReport, solution_status};
use crate::error::DeductionError;
use crate::game::event::{Event, EventId, EventLog};
use crate::game::setup::TableSetup;
use crate::model::card::{CardId, Triple};
use crate::model::deck::CardUniverse;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One deduction session: the static setup, the event log, and the belief
/// state derived from them. The state is always the result of replaying the
/// log from the setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    setup: TableSetup,
    state: BeliefState,
    log: EventLog,
}

impl Table {
    /// Table over the classic deck.
    pub fn new<S: AsRef<str>>(
        names: &[S],
        observer: &str,
        initial_cards: &[CardId],
    ) -> Result<Self, DeductionError> {
        let setup = TableSetup::new(CardUniverse::classic(), names, observer, initial_cards)?;
        Self::from_setup(setup)
    }

    pub fn from_setup(setup: TableSetup) -> Result<Self, DeductionError> {
        let state = BeliefState::initial(&setup)?;
        Ok(Self {
            setup,
            state,
            log: EventLog::new(),
        })
    }

    /// Builds a table by reprocessing `events` in order.
    pub fn replay(setup: TableSetup, events: &[Event]) -> Result<Self, DeductionError> {
        let mut table = Self::from_setup(setup)?;
        for event in events {
            table.append(event.clone())?;
        }
        Ok(table)
    }

    /// Validates and applies `event`. On error the table is unchanged.
    /// Repeated manual-claim cards are collapsed before the event is logged.
    pub fn append(&mut self, event: Event) -> Result<AppliedEffects, DeductionError> {
        let event = event.normalized();
        let id = self.log.next_id();
        let (state, effects) = reduce(&self.setup, &self.state, &event, id)?;
        self.state = state;
        self.log.push(event);
        Ok(effects)
    }

    pub fn submit_suggestion(
        &mut self,
        asker: PlayerId,
        triple: Option<Triple>,
        responder: Option<PlayerId>,
        revealed: Option<CardId>,
    ) -> Result<AppliedEffects, DeductionError> {
        self.append(Event::Suggestion {
            asker,
            triple,
            responder,
            revealed,
        })
    }

    pub fn submit_accusation_failure(
        &mut self,
        accuser: PlayerId,
        triple: Triple,
    ) -> Result<AppliedEffects, DeductionError> {
        self.append(Event::AccusationFailure { accuser, triple })
    }

    /// Repeated cards are dropped, keeping the first occurrence.
    pub fn submit_manual_claim(
        &mut self,
        player: PlayerId,
        cards: &[CardId],
        asserts_possession: bool,
    ) -> Result<AppliedEffects, DeductionError> {
        self.append(Event::ManualClaim {
            player,
            cards: cards.to_vec(),
            asserts_possession,
        })
    }

    /// Records a single-cell observation as a one-card claim. Only an
    /// `Unknown` cell accepts an assertion; use [`Table::undo`] to revisit a
    /// settled one.
    pub fn assert_cell(
        &mut self,
        player: PlayerId,
        card: CardId,
        mark: Mark,
    ) -> Result<AppliedEffects, DeductionError> {
        self.check_cell(player, card)?;
        if !self.state.grid().is_unknown(player, card) {
            return Err(DeductionError::MalformedEvent {
                event_type: "manual_claim",
                message: format!(
                    "{} / {} is already settled; undo the event that settled it instead",
                    self.setup.roster().name(player),
                    self.setup.universe().slug(card)
                ),
            });
        }
        self.append(Event::ManualClaim {
            player,
            cards: vec![card],
            asserts_possession: mark == Mark::Has,
        })
    }

    /// Replaces the log with `events` and rebuilds the state from scratch.
    /// Atomic: on failure the table keeps its previous log and state.
    pub fn restore_from_log(&mut self, events: &[Event]) -> Result<(), DeductionError> {
        let rebuilt = Self::replay(self.setup.clone(), events)?;
        debug!(
            target: "sleuth_core::table",
            events = rebuilt.log.len(),
            settled = rebuilt.state.grid().settled_cells(),
            "restored table from log"
        );
        *self = rebuilt;
        Ok(())
    }

    /// Drops the last event by replaying everything before it.
    pub fn undo(&mut self) -> Result<Option<Event>, DeductionError> {
        let Some((last, rest)) = self.log.as_slice().split_last() else {
            return Ok(None);
        };
        let last = last.clone();
        let rest = rest.to_vec();
        self.restore_from_log(&rest)?;
        debug!(target: "sleuth_core::table", kind = last.event_type(), "undid event");
        Ok(Some(last))
    }

    /// Applies `event` to a copy of the table. `self` is never touched.
    pub fn what_if(&self, event: Event) -> Result<Table, DeductionError> {
        let mut scratch = self.clone();
        scratch.append(event)?;
        Ok(scratch)
    }

    pub fn setup(&self) -> &TableSetup {
        &self.setup
    }

    pub fn state(&self) -> &BeliefState {
        &self.state
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn grid_snapshot(&self) -> GridSnapshot {
        GridSnapshot::capture(&self.setup, &self.state)
    }

    pub fn constraints_snapshot(&self) -> Vec<Constraint> {
        self.state.constraints().as_slice().to_vec()
    }

    pub fn solution_status(&self) -> SolutionReport {
        solution_status(&self.setup, &self.state)
    }

    pub fn metrics(&self) -> GridMetrics {
        GridMetrics::capture(&self.state)
    }

    pub fn contradictions(&self) -> &[Contradiction] {
        self.state.contradictions()
    }

    /// Why a cell is settled. `None` while it is unknown or out of range.
    pub fn explain(&self, player: PlayerId, card: CardId) -> Option<&Explanation> {
        self.check_cell(player, card).ok()?;
        self.state.grid().state(player, card).explanation()
    }

    /// One sentence about a cell, suitable for showing to a player.
    pub fn describe(&self, player: PlayerId, card: CardId) -> String {
        if self.check_cell(player, card).is_err() {
            return format!("{player} / {card} is not on this table");
        }
        let name = self.setup.roster().name(player);
        let slug = self.setup.universe().slug(card);
        match self.state.grid().state(player, card) {
            CellState::Unknown => format!("whether {name} holds {slug} is not yet known"),
            CellState::Has(explanation) => format!("{name} holds {slug}: {explanation}"),
            CellState::Lacks(explanation) => {
                format!("{name} does not hold {slug}: {explanation}")
            }
        }
    }

    /// Turn history for one player.
    pub fn events_involving(&self, player: PlayerId) -> Vec<(EventId, &Event)> {
        self.log
            .iter()
            .filter(|(_, event)| event.involves(player))
            .collect()
    }

    /// Every logged event as "turn_n: summary".
    pub fn history(&self) -> Vec<String> {
        self.log
            .iter()
            .map(|(id, event)| format!("{id}: {}", event.describe(&self.setup)))
            .collect()
    }

    fn check_cell(&self, player: PlayerId, card: CardId) -> Result<(), DeductionError> {
        if !self.setup.roster().contains(player) {
            return Err(DeductionError::UnknownPlayer(player));
        }
        if !self.setup.universe().contains(card) {
            return Err(DeductionError::UnknownCard(card));
        }
        Ok(())
    }
}

/// Serializable copy of the grid with player and card names attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub cards: Vec<String>,
    pub rows: Vec<SnapshotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub player: String,
    pub hand_size: usize,
    pub cells: Vec<CellState>,
}

impl GridSnapshot {
    pub fn capture(setup: &TableSetup, state: &BeliefState) -> Self {
        let grid = state.grid();
        let cards = setup
            .universe()
            .specs()
            .iter()
            .map(|spec| spec.slug.clone())
            .collect();
        let rows = setup
            .roster()
            .players()
            .iter()
            .map(|player| SnapshotRow {
                player: player.name.clone(),
                hand_size: player.hand_size,
                cells: grid.row(player.id).map(|(_, cell)| cell.clone()).collect(),
            })
            .collect();
        Self { cards, rows }
    }
}
