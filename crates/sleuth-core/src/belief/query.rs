//! Read-only views over a [`BeliefState`]: solution status and progress
//! metrics. Nothing here mutates state, so every query is repeatable.

use super::engine::BeliefState;
use super::grid::BeliefGrid;
use crate::game::event::{EventId, RefutedTriple};
use crate::game::setup::TableSetup;
use crate::model::card::{CardId, Category, Triple};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionVerdict {
    /// Every player lacks the card.
    ConfirmedIn,
    /// Someone holds it, or it cannot be part of the solution.
    ConfirmedOut,
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardVerdict {
    pub card: CardId,
    pub category: Category,
    pub verdict: SolutionVerdict,
}

/// Verdict for every card of the universe, in deck order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionReport {
    cards: Vec<CardVerdict>,
}

impl SolutionReport {
    pub fn verdict(&self, card: CardId) -> Option<SolutionVerdict> {
        self.cards
            .iter()
            .find(|entry| entry.card == card)
            .map(|entry| entry.verdict)
    }

    /// The category's solution card, once confirmed.
    pub fn confirmed(&self, category: Category) -> Option<CardId> {
        self.in_category(category)
            .find(|entry| entry.verdict == SolutionVerdict::ConfirmedIn)
            .map(|entry| entry.card)
    }

    /// Cards of `category` that may still be the solution.
    pub fn candidates(&self, category: Category) -> Vec<CardId> {
        self.in_category(category)
            .filter(|entry| entry.verdict != SolutionVerdict::ConfirmedOut)
            .map(|entry| entry.card)
            .collect()
    }

    /// The full solution once every category is confirmed.
    pub fn solved(&self) -> Option<[CardId; 3]> {
        Some([
            self.confirmed(Category::Suspect)?,
            self.confirmed(Category::Weapon)?,
            self.confirmed(Category::Room)?,
        ])
    }

    pub fn entries(&self) -> &[CardVerdict] {
        &self.cards
    }

    fn in_category(&self, category: Category) -> impl Iterator<Item = &CardVerdict> {
        self.cards
            .iter()
            .filter(move |entry| entry.category == category)
    }
}

pub fn solution_status(setup: &TableSetup, state: &BeliefState) -> SolutionReport {
    let grid = state.grid();
    let universe = setup.universe();
    let excluded: Vec<CardId> = accusation_exclusions(grid, state.refuted())
        .into_iter()
        .map(|exclusion| exclusion.card)
        .collect();
    let in_solution = solution_cards(grid);

    let cards = universe
        .specs()
        .iter()
        .zip(universe.ids())
        .map(|(spec, card)| {
            let category_solved = setup.mode().category_closure()
                && in_solution
                    .iter()
                    .any(|other| *other != card && universe.category(*other) == Some(spec.category));
            let verdict = if grid.all_lack(card) {
                SolutionVerdict::ConfirmedIn
            } else if !grid.holders(card).is_empty() || excluded.contains(&card) || category_solved
            {
                SolutionVerdict::ConfirmedOut
            } else {
                SolutionVerdict::Undetermined
            };
            CardVerdict {
                card,
                category: spec.category,
                verdict,
            }
        })
        .collect();
    SolutionReport { cards }
}

/// Cards every player is known to lack.
pub fn solution_cards(grid: &BeliefGrid) -> Vec<CardId> {
    grid.cards().filter(|card| grid.all_lack(*card)).collect()
}

/// A card ruled out of the solution by a failed accusation whose other two
/// cards are in the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusion {
    pub card: CardId,
    pub triple: Triple,
    pub origin: EventId,
}

pub fn accusation_exclusions(grid: &BeliefGrid, refuted: &[RefutedTriple]) -> Vec<Exclusion> {
    refuted
        .iter()
        .filter_map(|entry| {
            let open: Vec<CardId> = entry
                .triple
                .iter()
                .filter(|card| !grid.all_lack(*card))
                .collect();
            match open.as_slice() {
                [card] => Some(Exclusion {
                    card: *card,
                    triple: entry.triple,
                    origin: entry.origin,
                }),
                _ => None,
            }
        })
        .collect()
}

/// Failed accusations whose three cards are all in the solution.
pub fn refuted_solutions(grid: &BeliefGrid, refuted: &[RefutedTriple]) -> Vec<Triple> {
    refuted
        .iter()
        .filter(|entry| entry.triple.iter().all(|card| grid.all_lack(card)))
        .map(|entry| entry.triple)
        .collect()
}

/// Progress summary of a belief state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridMetrics {
    pub unknown_cells: usize,
    pub settled_cells: usize,
    pub open_constraints: usize,
    pub confirmed_solution_cards: usize,
}

impl GridMetrics {
    pub fn capture(state: &BeliefState) -> Self {
        let grid = state.grid();
        Self {
            unknown_cells: grid.unknown_cells(),
            settled_cells: grid.settled_cells(),
            open_constraints: state.constraints().open_count(),
            confirmed_solution_cards: solution_cards(grid).len(),
        }
    }

    /// Cells settled between `self` and a later snapshot.
    pub fn newly_settled(&self, later: &GridMetrics) -> usize {
        later.settled_cells.saturating_sub(self.settled_cells)
    }
}
