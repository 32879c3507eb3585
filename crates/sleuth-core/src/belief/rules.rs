//! Rule families run by the fixpoint driver. Each returns whether it made
//! progress: a cell settled or a constraint resolved.

use super::constraint::Tightening;
use super::contradiction::Contradiction;
use super::engine::Propagation;
use super::grid::{Explanation, Mark, Reason};
use super::query::{accusation_exclusions, refuted_solutions, solution_cards};
use crate::error::DeductionError;
use crate::model::card::{CardId, Category};
use crate::model::player::PlayerId;
use tracing::trace;

/// Rule A: re-evaluate open constraints against the grid.
pub(super) fn tighten_constraints(prop: &mut Propagation<'_>) -> Result<bool, DeductionError> {
    let outcomes = prop
        .state
        .constraints
        .tighten(&mut prop.state.grid, prop.setup);
    let progress = !outcomes.is_empty();
    for outcome in outcomes {
        prop.record_resolved(outcome.constraint());
        match outcome {
            Tightening::Satisfied { constraint, card } => {
                trace!(
                    target: "sleuth_core::inference",
                    %constraint,
                    card = prop.setup.universe().slug(card),
                    "constraint satisfied"
                );
            }
            Tightening::Forced {
                constraint,
                player,
                card,
            } => {
                trace!(
                    target: "sleuth_core::inference",
                    %constraint,
                    %player,
                    card = prop.setup.universe().slug(card),
                    "constraint forced"
                );
                prop.record_settled(player, card, Mark::Has, Reason::ConstraintForced);
            }
            Tightening::Contradicted { contradiction, .. } => prop.contradict(contradiction)?,
        }
    }
    Ok(progress)
}

/// Rule B: a card held by one player is lacked by everyone else.
pub(super) fn cross_exclusion(prop: &mut Propagation<'_>) -> Result<bool, DeductionError> {
    let mut progress = false;
    let cards: Vec<CardId> = prop.state.grid.cards().collect();
    for card in cards {
        let holders = prop.state.grid.holders(card);
        match holders.as_slice() {
            [] => {}
            [holder] => {
                let holder = *holder;
                let origin = prop
                    .state
                    .grid
                    .state(holder, card)
                    .explanation()
                    .and_then(|explanation| explanation.origin);
                let text = format!(
                    "{} holds {}",
                    prop.name(holder),
                    prop.setup.universe().slug(card)
                );
                for player in open_players(prop, card) {
                    let explanation = Explanation::new(Reason::CrossExclusion, origin, text.clone());
                    progress |= prop.settle(player, card, Mark::Lacks, explanation)?;
                }
            }
            _ => prop.contradict(Contradiction::SharedCard { card, holders })?,
        }
    }
    Ok(progress)
}

/// Rule C: hand-size counting in both directions.
pub(super) fn hand_counting(prop: &mut Propagation<'_>) -> Result<bool, DeductionError> {
    let mut progress = false;
    let players: Vec<PlayerId> = prop.setup.roster().ids().collect();
    for player in players {
        let hand_size = prop.setup.roster().hand_size(player);
        let has = prop.state.grid.count(player, Mark::Has);
        let unknown = prop.state.grid.unknown_count(player);

        if has > hand_size || has + unknown < hand_size {
            prop.contradict(Contradiction::HandSize {
                player,
                hand_size,
                has,
                unknown,
            })?;
            continue;
        }
        if unknown == 0 {
            continue;
        }

        let (mark, reason, text) = if has == hand_size {
            (
                Mark::Lacks,
                Reason::HandFull,
                format!(
                    "all {hand_size} of {}'s cards are already known",
                    prop.name(player)
                ),
            )
        } else if has + unknown == hand_size {
            (
                Mark::Has,
                Reason::HandExhausted,
                format!(
                    "{} holds {hand_size} cards and only {unknown} open cells remain",
                    prop.name(player)
                ),
            )
        } else {
            continue;
        };

        for card in prop.state.grid.unknown_cards(player) {
            let explanation = Explanation::new(reason, prop.origin, text.clone());
            progress |= prop.settle(player, card, mark, explanation)?;
        }
    }
    Ok(progress)
}

/// Rule D: failed accusations with two solution cards rule out the third,
/// and a ruled-out card with a single possible holder is held by them.
pub(super) fn solution_deduction(prop: &mut Propagation<'_>) -> Result<bool, DeductionError> {
    for triple in refuted_solutions(&prop.state.grid, &prop.state.refuted) {
        prop.contradict(Contradiction::RefutedSolution { triple })?;
    }

    let mut progress = false;
    for exclusion in accusation_exclusions(&prop.state.grid, &prop.state.refuted) {
        let listed = prop.slugs(exclusion.triple.iter());
        let text = format!(
            "[{listed}] is not the solution and only {} is left open, so someone holds it",
            prop.setup.universe().slug(exclusion.card)
        );
        let explanation = Explanation::new(Reason::SolutionExcluded, Some(exclusion.origin), text);
        progress |= force_sole_holder(prop, exclusion.card, explanation)?;
    }
    Ok(progress)
}

/// Rule E: each category has exactly one solution card.
pub(super) fn category_closure(prop: &mut Propagation<'_>) -> Result<bool, DeductionError> {
    let mut progress = false;
    let in_solution = solution_cards(&prop.state.grid);
    let excluded: Vec<CardId> = accusation_exclusions(&prop.state.grid, &prop.state.refuted)
        .into_iter()
        .map(|exclusion| exclusion.card)
        .collect();

    for category in Category::ALL {
        let members: Vec<CardId> = prop.setup.universe().in_category(category).collect();
        let solved: Vec<CardId> = members
            .iter()
            .copied()
            .filter(|card| in_solution.contains(card))
            .collect();

        match solved.as_slice() {
            [] => {
                let open: Vec<CardId> = members
                    .iter()
                    .copied()
                    .filter(|card| {
                        prop.state.grid.holders(*card).is_empty() && !excluded.contains(card)
                    })
                    .collect();
                match open.as_slice() {
                    [] => prop.contradict(Contradiction::CategoryConflict {
                        category,
                        solution_cards: Vec::new(),
                    })?,
                    [card] => {
                        let card = *card;
                        let text = format!(
                            "every other {category} card is held or ruled out, so {} is the solution",
                            prop.setup.universe().slug(card)
                        );
                        for player in open_players(prop, card) {
                            let explanation =
                                Explanation::new(Reason::CategorySolved, prop.origin, text.clone());
                            progress |= prop.settle(player, card, Mark::Lacks, explanation)?;
                        }
                    }
                    _ => {}
                }
            }
            [solution] => {
                let solution = *solution;
                let origin = solution_origin(prop, solution);
                let text = format!(
                    "{} is the {category} solution, so every other {category} card is held",
                    prop.setup.universe().slug(solution)
                );
                for card in members.iter().copied().filter(|card| *card != solution) {
                    let explanation = Explanation::new(Reason::CategorySolved, origin, text.clone());
                    progress |= force_sole_holder(prop, card, explanation)?;
                }
            }
            _ => prop.contradict(Contradiction::CategoryConflict {
                category,
                solution_cards: solved,
            })?,
        }
    }
    Ok(progress)
}

/// A card known to be held by someone: if only one player may hold it, they do.
fn force_sole_holder(
    prop: &mut Propagation<'_>,
    card: CardId,
    explanation: Explanation,
) -> Result<bool, DeductionError> {
    match prop.state.grid.possible_holders(card).as_slice() {
        [player] if prop.state.grid.is_unknown(*player, card) => {
            prop.settle(*player, card, Mark::Has, explanation)
        }
        _ => Ok(false),
    }
}

fn open_players(prop: &Propagation<'_>, card: CardId) -> Vec<PlayerId> {
    prop.state
        .grid
        .players()
        .filter(|player| prop.state.grid.is_unknown(*player, card))
        .collect()
}

/// Latest event among the explanations that put `card` in the solution.
fn solution_origin(prop: &Propagation<'_>, card: CardId) -> Option<crate::game::event::EventId> {
    prop.state
        .grid
        .players()
        .filter_map(|player| {
            prop.state
                .grid
                .state(player, card)
                .explanation()
                .and_then(|explanation| explanation.origin)
        })
        .max()
}
