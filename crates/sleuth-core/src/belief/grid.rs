//! Tri-state ownership grid with per-cell provenance.

use super::contradiction::Contradiction;
use crate::game::event::EventId;
use crate::model::card::CardId;
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Settled polarity of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Has,
    Lacks,
}

impl Mark {
    pub const fn as_str(self) -> &'static str {
        match self {
            Mark::Has => "has",
            Mark::Lacks => "lacks",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule or event kind that settled a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    InitialHand,
    ManualClaim,
    Revealed,
    PassedSuggestion,
    NobodyResponded,
    ConstraintForced,
    CrossExclusion,
    HandFull,
    HandExhausted,
    SolutionExcluded,
    CategorySolved,
}

impl Reason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Reason::InitialHand => "initial_hand",
            Reason::ManualClaim => "manual_claim",
            Reason::Revealed => "revealed",
            Reason::PassedSuggestion => "passed_suggestion",
            Reason::NobodyResponded => "nobody_responded",
            Reason::ConstraintForced => "constraint_forced",
            Reason::CrossExclusion => "cross_exclusion",
            Reason::HandFull => "hand_full",
            Reason::HandExhausted => "hand_exhausted",
            Reason::SolutionExcluded => "solution_excluded",
            Reason::CategorySolved => "category_solved",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Explanation {
    pub reason: Reason,
    pub origin: Option<EventId>,
    pub text: String,
}

impl Explanation {
    pub fn new(reason: Reason, origin: Option<EventId>, text: impl Into<String>) -> Self {
        Self {
            reason,
            origin,
            text: text.into(),
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Some(origin) => write!(f, "{} [{}, {}]", self.text, self.reason, origin),
            None => write!(f, "{} [{}]", self.text, self.reason),
        }
    }
}

/// A settled cell always carries its explanation; `Unknown` never does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Unknown,
    Has(Explanation),
    Lacks(Explanation),
}

impl CellState {
    pub fn settled(mark: Mark, explanation: Explanation) -> Self {
        match mark {
            Mark::Has => CellState::Has(explanation),
            Mark::Lacks => CellState::Lacks(explanation),
        }
    }

    pub fn mark(&self) -> Option<Mark> {
        match self {
            CellState::Unknown => None,
            CellState::Has(_) => Some(Mark::Has),
            CellState::Lacks(_) => Some(Mark::Lacks),
        }
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        match self {
            CellState::Unknown => None,
            CellState::Has(explanation) | CellState::Lacks(explanation) => Some(explanation),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CellState::Unknown)
    }

    pub fn is(&self, mark: Mark) -> bool {
        self.mark() == Some(mark)
    }
}

/// Outcome of a successful [`BeliefGrid::set_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Settled,
    Unchanged,
}

/// Player × card grid. Cells only move forward along
/// `Unknown -> {Has, Lacks}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeliefGrid {
    players: usize,
    cards: usize,
    cells: Vec<CellState>,
}

impl BeliefGrid {
    pub fn new(players: usize, cards: usize) -> Self {
        Self {
            players,
            cards,
            cells: vec![CellState::Unknown; players * cards],
        }
    }

    pub fn player_count(&self) -> usize {
        self.players
    }

    pub fn card_count(&self) -> usize {
        self.cards
    }

    fn offset(&self, player: PlayerId, card: CardId) -> usize {
        debug_assert!(player.index() < self.players && card.index() < self.cards);
        player.index() * self.cards + card.index()
    }

    pub fn state(&self, player: PlayerId, card: CardId) -> &CellState {
        &self.cells[self.offset(player, card)]
    }

    pub fn mark(&self, player: PlayerId, card: CardId) -> Option<Mark> {
        self.state(player, card).mark()
    }

    pub fn is_unknown(&self, player: PlayerId, card: CardId) -> bool {
        self.state(player, card).is_unknown()
    }

    /// Settles a cell. Setting the mark it already has is a no-op and keeps
    /// the first explanation; asking for the opposite mark is a contradiction
    /// and leaves the cell untouched.
    pub fn set_state(
        &mut self,
        player: PlayerId,
        card: CardId,
        mark: Mark,
        explanation: Explanation,
    ) -> Result<Transition, Contradiction> {
        let offset = self.offset(player, card);
        match self.cells[offset].mark() {
            None => {
                self.cells[offset] = CellState::settled(mark, explanation);
                Ok(Transition::Settled)
            }
            Some(current) if current == mark => Ok(Transition::Unchanged),
            Some(current) => Err(Contradiction::CellConflict {
                player,
                card,
                held: current,
                requested: mark,
            }),
        }
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.players).map(|index| PlayerId::from_index(index as u8))
    }

    pub fn cards(&self) -> impl Iterator<Item = CardId> {
        (0..self.cards).map(|index| CardId::from_index(index as u8))
    }

    pub fn row(&self, player: PlayerId) -> impl Iterator<Item = (CardId, &CellState)> + '_ {
        let start = player.index() * self.cards;
        self.cells[start..start + self.cards]
            .iter()
            .enumerate()
            .map(|(index, state)| (CardId::from_index(index as u8), state))
    }

    pub fn count(&self, player: PlayerId, mark: Mark) -> usize {
        self.row(player).filter(|(_, state)| state.is(mark)).count()
    }

    pub fn unknown_count(&self, player: PlayerId) -> usize {
        self.row(player).filter(|(_, state)| state.is_unknown()).count()
    }

    pub fn unknown_cards(&self, player: PlayerId) -> Vec<CardId> {
        self.row(player)
            .filter(|(_, state)| state.is_unknown())
            .map(|(card, _)| card)
            .collect()
    }

    pub fn holders(&self, card: CardId) -> Vec<PlayerId> {
        self.players()
            .filter(|player| self.state(*player, card).is(Mark::Has))
            .collect()
    }

    /// Players not known to lack `card`.
    pub fn possible_holders(&self, card: CardId) -> Vec<PlayerId> {
        self.players()
            .filter(|player| !self.state(*player, card).is(Mark::Lacks))
            .collect()
    }

    pub fn all_lack(&self, card: CardId) -> bool {
        self.players()
            .all(|player| self.state(player, card).is(Mark::Lacks))
    }

    pub fn settled_cells(&self) -> usize {
        self.cells.iter().filter(|state| !state.is_unknown()).count()
    }

    pub fn unknown_cells(&self) -> usize {
        self.cells.len() - self.settled_cells()
    }
}
