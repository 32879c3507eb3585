use super::constraint::ConstraintId;
use super::grid::Mark;
use crate::model::card::{CardId, Category, Triple};
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Evidence that the event stream is inconsistent with a single hidden deal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contradiction {
    /// A settled cell was asked to take the opposite mark.
    CellConflict {
        player: PlayerId,
        card: CardId,
        held: Mark,
        requested: Mark,
    },
    /// Every candidate of a disjunction is known to be missing.
    ExhaustedConstraint {
        constraint: ConstraintId,
        player: PlayerId,
    },
    /// More than one player holds the same card.
    SharedCard { card: CardId, holders: Vec<PlayerId> },
    /// A player's settled cells no longer fit their hand size.
    HandSize {
        player: PlayerId,
        hand_size: usize,
        has: usize,
        unknown: usize,
    },
    /// A failed accusation names three cards that are all in the solution.
    RefutedSolution { triple: Triple },
    /// A category has no possible solution card, or more than one.
    CategoryConflict {
        category: Category,
        solution_cards: Vec<CardId>,
    },
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contradiction::CellConflict {
                player,
                card,
                held,
                requested,
            } => write!(
                f,
                "{player} already {held} {card}; cannot record that they {requested} it"
            ),
            Contradiction::ExhaustedConstraint { constraint, player } => write!(
                f,
                "{player} must hold one card of {constraint} but lacks all of them"
            ),
            Contradiction::SharedCard { card, holders } => {
                write!(f, "{card} is held by {} players", holders.len())
            }
            Contradiction::HandSize {
                player,
                hand_size,
                has,
                unknown,
            } => write!(
                f,
                "{player} holds {hand_size} cards but has {has} known and {unknown} open cells"
            ),
            Contradiction::RefutedSolution { triple } => {
                let [a, b, c] = triple.cards();
                write!(f, "failed accusation [{a}, {b}, {c}] is entirely in the solution")
            }
            Contradiction::CategoryConflict {
                category,
                solution_cards,
            } => write!(
                f,
                "{category} category resolves to {} solution cards",
                solution_cards.len()
            ),
        }
    }
}
