//! Disjunctive "holds at least one of" clauses.

use super::contradiction::Contradiction;
use super::grid::{BeliefGrid, Explanation, Mark, Reason};
use crate::game::event::EventId;
use crate::game::setup::TableSetup;
use crate::model::card::CardId;
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintId(u32);

impl ConstraintId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConstraintStatus {
    Open,
    /// A candidate was already held.
    Satisfied { card: CardId },
    /// Only one candidate remained and was forced.
    Forced { card: CardId },
    /// Every candidate is missing.
    Contradicted,
}

/// `player` holds at least one card of `cards`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    pub player: PlayerId,
    pub cards: Vec<CardId>,
    /// Subset of `cards` not yet known to be missing.
    pub candidates: Vec<CardId>,
    pub status: ConstraintStatus,
    pub origin: EventId,
}

impl Constraint {
    pub fn resolved(&self) -> bool {
        self.status != ConstraintStatus::Open
    }
}

/// What one tightening pass did to a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tightening {
    Satisfied {
        constraint: ConstraintId,
        card: CardId,
    },
    Forced {
        constraint: ConstraintId,
        player: PlayerId,
        card: CardId,
    },
    Contradicted {
        constraint: ConstraintId,
        contradiction: Contradiction,
    },
}

impl Tightening {
    pub fn constraint(&self) -> ConstraintId {
        match self {
            Tightening::Satisfied { constraint, .. }
            | Tightening::Forced { constraint, .. }
            | Tightening::Contradicted { constraint, .. } => *constraint,
        }
    }
}

/// Arena of constraints indexed by [`ConstraintId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConstraintStore {
    entries: Vec<Constraint>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        player: PlayerId,
        cards: impl IntoIterator<Item = CardId>,
        origin: EventId,
    ) -> ConstraintId {
        let mut cards: Vec<CardId> = cards.into_iter().collect();
        cards.sort();
        cards.dedup();
        let id = ConstraintId(self.entries.len() as u32);
        self.entries.push(Constraint {
            id,
            player,
            candidates: cards.clone(),
            cards,
            status: ConstraintStatus::Open,
            origin,
        });
        id
    }

    pub fn get(&self, id: ConstraintId) -> Option<&Constraint> {
        self.entries.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.iter()
    }

    pub fn open(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.iter().filter(|constraint| !constraint.resolved())
    }

    pub fn open_count(&self) -> usize {
        self.open().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Constraint] {
        &self.entries
    }

    /// Re-evaluates every open constraint against `grid`. Forced candidates
    /// are written through the grid setter. The result does not depend on
    /// the order constraints are visited in.
    pub fn tighten(&mut self, grid: &mut BeliefGrid, setup: &TableSetup) -> Vec<Tightening> {
        let mut outcomes = Vec::new();
        for index in 0..self.entries.len() {
            if self.entries[index].resolved() {
                continue;
            }
            let current = self.entries[index].clone();
            let (updated, outcome) = evaluate(&current, grid);

            if let Some(Tightening::Forced { player, card, .. }) = outcome {
                let explanation = forced_explanation(&current, card, setup);
                if let Err(contradiction) = grid.set_state(player, card, Mark::Has, explanation) {
                    self.entries[index] = Constraint {
                        status: ConstraintStatus::Contradicted,
                        ..updated
                    };
                    outcomes.push(Tightening::Contradicted {
                        constraint: current.id,
                        contradiction,
                    });
                    continue;
                }
            }

            self.entries[index] = updated;
            outcomes.extend(outcome);
        }
        outcomes
    }
}

fn evaluate(constraint: &Constraint, grid: &BeliefGrid) -> (Constraint, Option<Tightening>) {
    let player = constraint.player;
    if let Some(card) = constraint
        .cards
        .iter()
        .copied()
        .find(|card| grid.mark(player, *card) == Some(Mark::Has))
    {
        let updated = Constraint {
            status: ConstraintStatus::Satisfied { card },
            ..constraint.clone()
        };
        return (
            updated,
            Some(Tightening::Satisfied {
                constraint: constraint.id,
                card,
            }),
        );
    }

    let candidates: Vec<CardId> = constraint
        .candidates
        .iter()
        .copied()
        .filter(|card| grid.mark(player, *card) != Some(Mark::Lacks))
        .collect();

    match candidates.len() {
        0 => {
            let updated = Constraint {
                candidates,
                status: ConstraintStatus::Contradicted,
                ..constraint.clone()
            };
            let contradiction = Contradiction::ExhaustedConstraint {
                constraint: constraint.id,
                player,
            };
            (
                updated,
                Some(Tightening::Contradicted {
                    constraint: constraint.id,
                    contradiction,
                }),
            )
        }
        1 => {
            let card = candidates[0];
            let updated = Constraint {
                candidates,
                status: ConstraintStatus::Forced { card },
                ..constraint.clone()
            };
            (
                updated,
                Some(Tightening::Forced {
                    constraint: constraint.id,
                    player,
                    card,
                }),
            )
        }
        _ => (
            Constraint {
                candidates,
                ..constraint.clone()
            },
            None,
        ),
    }
}

fn forced_explanation(constraint: &Constraint, card: CardId, setup: &TableSetup) -> Explanation {
    let others: Vec<&str> = constraint
        .cards
        .iter()
        .filter(|other| **other != card)
        .map(|other| setup.universe().slug(*other))
        .collect();
    Explanation::new(
        Reason::ConstraintForced,
        Some(constraint.origin),
        format!(
            "{} must hold one of [{}] from {} and is known to lack {}",
            setup.roster().name(constraint.player),
            constraint
                .cards
                .iter()
                .map(|c| setup.universe().slug(*c))
                .collect::<Vec<_>>()
                .join(", "),
            constraint.origin,
            others.join(", ")
        ),
    )
}
