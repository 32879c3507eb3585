//! Event reducer and fixpoint driver.
//!
//! `reduce` is a pure function: it clones the incoming [`BeliefState`],
//! applies the event's direct consequences, then runs every rule family until
//! a full pass changes nothing. Replaying the same log from the same setup
//! always yields an equal state.

use super::constraint::{ConstraintId, ConstraintStore};
use super::contradiction::Contradiction;
use super::grid::{BeliefGrid, Explanation, Mark, Reason, Transition};
use super::rules;
use crate::error::{DeductionError, SetupError};
use crate::game::event::{Event, EventId, RefutedTriple};
use crate::game::setup::{ContradictionPolicy, TableSetup};
use crate::model::card::{CardId, Triple};
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Everything derived from the log: the grid, the constraints, the refuted
/// triples and any contradictions tolerated along the way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeliefState {
    pub(super) grid: BeliefGrid,
    pub(super) constraints: ConstraintStore,
    pub(super) refuted: Vec<RefutedTriple>,
    pub(super) contradictions: Vec<Contradiction>,
}

impl BeliefState {
    /// All-unknown grid plus the observer's initial hand, propagated.
    pub fn initial(setup: &TableSetup) -> Result<Self, DeductionError> {
        let blank = Self {
            grid: BeliefGrid::new(setup.roster().len(), setup.universe().len()),
            constraints: ConstraintStore::new(),
            refuted: Vec::new(),
            contradictions: Vec::new(),
        };
        let mut prop = Propagation::new(setup, blank, None);
        let observer = setup.observer();
        for card in setup.initial_hand() {
            let text = format!(
                "{} was dealt {}",
                setup.roster().name(observer),
                setup.universe().slug(*card)
            );
            prop.settle(
                observer,
                *card,
                Mark::Has,
                Explanation::new(Reason::InitialHand, None, text),
            )?;
        }
        run_fixpoint(&mut prop)?;
        Ok(prop.state)
    }

    pub fn grid(&self) -> &BeliefGrid {
        &self.grid
    }

    pub fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    pub fn refuted(&self) -> &[RefutedTriple] {
        &self.refuted
    }

    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }
}

/// One cell settled while applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledCell {
    pub player: PlayerId,
    pub card: CardId,
    pub mark: Mark,
    pub reason: Reason,
}

/// What a single event changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedEffects {
    pub event: EventId,
    pub settled: Vec<SettledCell>,
    pub constraints_added: Vec<ConstraintId>,
    pub constraints_resolved: Vec<ConstraintId>,
    pub contradictions: Vec<Contradiction>,
    pub passes: usize,
}

/// Applies `event` (already assigned `id`) to a copy of `state`.
pub fn reduce(
    setup: &TableSetup,
    state: &BeliefState,
    event: &Event,
    id: EventId,
) -> Result<(BeliefState, AppliedEffects), DeductionError> {
    event.validate(setup)?;

    let mut prop = Propagation::new(setup, state.clone(), Some(id));
    apply_direct(&mut prop, event, id)?;
    let passes = run_fixpoint(&mut prop)?;

    debug!(
        target: "sleuth_core::table",
        event = %id,
        kind = event.event_type(),
        settled = prop.settled.len(),
        constraints_added = prop.added.len(),
        constraints_resolved = prop.resolved.len(),
        passes,
        "applied event"
    );

    let effects = AppliedEffects {
        event: id,
        settled: prop.settled,
        constraints_added: prop.added,
        constraints_resolved: prop.resolved,
        contradictions: prop.tolerated,
        passes,
    };
    Ok((prop.state, effects))
}

/// Upper bound on fixpoint passes. Every pass that makes progress settles at
/// least one cell or resolves at least one constraint, and a final pass must
/// observe quiescence.
pub fn pass_limit(setup: &TableSetup, constraints: usize) -> usize {
    setup.roster().len() * setup.universe().len() + constraints + 1
}

/// Mutable working copy threaded through the direct consequences and rules.
pub(super) struct Propagation<'a> {
    pub(super) setup: &'a TableSetup,
    pub(super) state: BeliefState,
    pub(super) origin: Option<EventId>,
    settled: Vec<SettledCell>,
    added: Vec<ConstraintId>,
    resolved: Vec<ConstraintId>,
    tolerated: Vec<Contradiction>,
}

impl<'a> Propagation<'a> {
    fn new(setup: &'a TableSetup, state: BeliefState, origin: Option<EventId>) -> Self {
        Self {
            setup,
            state,
            origin,
            settled: Vec::new(),
            added: Vec::new(),
            resolved: Vec::new(),
            tolerated: Vec::new(),
        }
    }

    /// Settles a cell through the grid setter. Returns whether the cell moved.
    pub(super) fn settle(
        &mut self,
        player: PlayerId,
        card: CardId,
        mark: Mark,
        explanation: Explanation,
    ) -> Result<bool, DeductionError> {
        let reason = explanation.reason;
        match self.state.grid.set_state(player, card, mark, explanation) {
            Ok(Transition::Settled) => {
                trace!(
                    target: "sleuth_core::inference",
                    %player,
                    card = self.setup.universe().slug(card),
                    %mark,
                    %reason,
                    "cell settled"
                );
                self.record_settled(player, card, mark, reason);
                Ok(true)
            }
            Ok(Transition::Unchanged) => Ok(false),
            Err(contradiction) => {
                self.contradict(contradiction)?;
                Ok(false)
            }
        }
    }

    pub(super) fn record_settled(&mut self, player: PlayerId, card: CardId, mark: Mark, reason: Reason) {
        self.settled.push(SettledCell {
            player,
            card,
            mark,
            reason,
        });
    }

    pub(super) fn record_resolved(&mut self, constraint: ConstraintId) {
        self.resolved.push(constraint);
    }

    /// Rejects the event under [`ContradictionPolicy::Reject`]; otherwise
    /// records the contradiction once and lets propagation continue.
    pub(super) fn contradict(&mut self, contradiction: Contradiction) -> Result<(), DeductionError> {
        match self.setup.policy() {
            ContradictionPolicy::Reject => Err(match self.origin {
                Some(event) => DeductionError::Inconsistent {
                    event,
                    contradiction,
                },
                None => DeductionError::InvalidSetup(SetupError::Inconsistent(contradiction)),
            }),
            ContradictionPolicy::Tolerate => {
                if !self.state.contradictions.contains(&contradiction) {
                    warn!(
                        target: "sleuth_core::inference",
                        event = ?self.origin,
                        %contradiction,
                        "tolerating contradiction"
                    );
                    self.tolerated.push(contradiction.clone());
                    self.state.contradictions.push(contradiction);
                }
                Ok(())
            }
        }
    }

    pub(super) fn slugs(&self, cards: impl IntoIterator<Item = CardId>) -> String {
        cards
            .into_iter()
            .map(|card| self.setup.universe().slug(card))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(super) fn name(&self, player: PlayerId) -> &'a str {
        self.setup.roster().name(player)
    }
}

fn apply_direct(prop: &mut Propagation<'_>, event: &Event, id: EventId) -> Result<(), DeductionError> {
    match event {
        Event::Suggestion { triple: None, .. } => Ok(()),
        Event::Suggestion {
            asker,
            triple: Some(triple),
            responder: Some(responder),
            revealed,
        } => {
            let passers = prop.setup.roster().between(*asker, *responder);
            let listed = prop.slugs(triple.iter());
            for passer in passers {
                let text = format!("{} passed on the suggestion [{listed}]", prop.name(passer));
                mark_triple(prop, passer, triple, Mark::Lacks, Reason::PassedSuggestion, id, &text)?;
            }
            match revealed {
                Some(card) => {
                    let text = format!(
                        "{} showed {} in answer to {}",
                        prop.name(*responder),
                        prop.setup.universe().slug(*card),
                        prop.name(*asker)
                    );
                    prop.settle(
                        *responder,
                        *card,
                        Mark::Has,
                        Explanation::new(Reason::Revealed, Some(id), text),
                    )?;
                }
                None => {
                    let constraint = prop.state.constraints.add(*responder, triple.iter(), id);
                    prop.added.push(constraint);
                }
            }
            Ok(())
        }
        Event::Suggestion {
            asker,
            triple: Some(triple),
            responder: None,
            ..
        } => {
            let listed = prop.slugs(triple.iter());
            let text = format!(
                "nobody could answer {}'s suggestion [{listed}]",
                prop.name(*asker)
            );
            let others: Vec<PlayerId> = prop
                .setup
                .roster()
                .ids()
                .filter(|player| player != asker)
                .collect();
            for player in others {
                mark_triple(prop, player, triple, Mark::Lacks, Reason::NobodyResponded, id, &text)?;
            }
            Ok(())
        }
        Event::AccusationFailure { triple, .. } => {
            prop.state.refuted.push(RefutedTriple {
                triple: *triple,
                origin: id,
            });
            Ok(())
        }
        Event::ManualClaim {
            player,
            cards,
            asserts_possession: true,
        } if cards.len() == 1 => {
            let card = cards[0];
            let text = format!(
                "{} was recorded as holding {}",
                prop.name(*player),
                prop.setup.universe().slug(card)
            );
            prop.settle(
                *player,
                card,
                Mark::Has,
                Explanation::new(Reason::ManualClaim, Some(id), text),
            )?;
            Ok(())
        }
        Event::ManualClaim {
            player,
            cards,
            asserts_possession: true,
        } => {
            let constraint = prop.state.constraints.add(*player, cards.iter().copied(), id);
            prop.added.push(constraint);
            Ok(())
        }
        Event::ManualClaim {
            player,
            cards,
            asserts_possession: false,
        } => {
            for card in cards {
                let text = format!(
                    "{} was recorded as not holding {}",
                    prop.name(*player),
                    prop.setup.universe().slug(*card)
                );
                prop.settle(
                    *player,
                    *card,
                    Mark::Lacks,
                    Explanation::new(Reason::ManualClaim, Some(id), text),
                )?;
            }
            Ok(())
        }
    }
}

fn mark_triple(
    prop: &mut Propagation<'_>,
    player: PlayerId,
    triple: &Triple,
    mark: Mark,
    reason: Reason,
    id: EventId,
    text: &str,
) -> Result<(), DeductionError> {
    for card in triple.iter() {
        prop.settle(player, card, mark, Explanation::new(reason, Some(id), text))?;
    }
    Ok(())
}

/// Runs every rule family until a full pass makes no progress.
fn run_fixpoint(prop: &mut Propagation<'_>) -> Result<usize, DeductionError> {
    let limit = pass_limit(prop.setup, prop.state.constraints.len());
    for pass in 1..=limit {
        let mut progress = false;
        progress |= rules::tighten_constraints(prop)?;
        progress |= rules::cross_exclusion(prop)?;
        progress |= rules::hand_counting(prop)?;
        progress |= rules::solution_deduction(prop)?;
        if prop.setup.mode().category_closure() {
            progress |= rules::category_closure(prop)?;
        }
        if !progress {
            return Ok(pass);
        }
    }
    Err(DeductionError::NonConvergence { passes: limit })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(index: u8) -> PlayerId {
        PlayerId::from_index(index)
    }

    fn suggestion(
        setup: &TableSetup,
        asker: u8,
        slugs: [&str; 3],
        responder: Option<u8>,
    ) -> Event {
        let cards = setup.universe().cards_for(slugs).unwrap();
        Event::Suggestion {
            asker: p(asker),
            triple: Some(Triple::new(setup.universe(), cards).unwrap()),
            responder: responder.map(p),
            revealed: None,
        }
    }

    #[test]
    fn reduce_leaves_input_state_untouched() {
        let setup = TableSetup::classic(&["Ask", "Passer", "Shower"], "Ask", &[]).unwrap();
        let state = BeliefState::initial(&setup).unwrap();
        let event = suggestion(&setup, 0, ["col_mustard", "dagger", "hall"], Some(2));
        let (next, effects) = reduce(&setup, &state, &event, EventId::from_position(1)).unwrap();

        assert_eq!(state.grid().settled_cells(), 0);
        assert!(state.constraints().is_empty());
        assert_eq!(next.constraints().len(), 1);
        assert_eq!(effects.settled.len(), 3);
        assert!(
            effects
                .settled
                .iter()
                .all(|cell| cell.player == p(1) && cell.reason == Reason::PassedSuggestion)
        );
        assert_eq!(effects.constraints_added.len(), 1);
        assert!(effects.passes >= 1);
    }

    #[test]
    fn initial_full_hand_rules_out_everything_else() {
        let hand = ["miss_scarlett", "rope", "kitchen"];
        let setup =
            TableSetup::classic(&["a", "b", "c", "d", "e", "f"], "a", &hand).unwrap();
        let state = BeliefState::initial(&setup).unwrap();
        let grid = state.grid();
        assert_eq!(grid.count(p(0), Mark::Has), 3);
        assert_eq!(grid.count(p(0), Mark::Lacks), 18);
        let kitchen = setup.universe().card("kitchen").unwrap();
        for other in 1..6 {
            assert_eq!(grid.mark(p(other), kitchen), Some(Mark::Lacks));
        }
    }

    #[test]
    fn tolerated_contradiction_is_recorded_once() {
        let setup = TableSetup::classic(&["a", "b", "c"], "a", &[])
            .unwrap()
            .with_policy(ContradictionPolicy::Tolerate);
        let rope = setup.universe().card("rope").unwrap();
        let state = BeliefState::initial(&setup).unwrap();
        let claim = |asserts_possession| Event::ManualClaim {
            player: p(1),
            cards: vec![rope],
            asserts_possession,
        };
        let (state, _) = reduce(&setup, &state, &claim(true), EventId::from_position(1)).unwrap();
        let (state, effects) =
            reduce(&setup, &state, &claim(false), EventId::from_position(2)).unwrap();

        assert_eq!(state.grid().mark(p(1), rope), Some(Mark::Has));
        assert_eq!(effects.contradictions.len(), 1);
        assert_eq!(state.contradictions().len(), 1);
    }

    #[test]
    fn rejected_contradiction_names_the_event() {
        let setup = TableSetup::classic(&["a", "b", "c"], "a", &[]).unwrap();
        let rope = setup.universe().card("rope").unwrap();
        let state = BeliefState::initial(&setup).unwrap();
        let has = Event::ManualClaim {
            player: p(1),
            cards: vec![rope],
            asserts_possession: true,
        };
        let (state, _) = reduce(&setup, &state, &has, EventId::from_position(1)).unwrap();
        let also_has = Event::ManualClaim {
            player: p(2),
            cards: vec![rope],
            asserts_possession: true,
        };
        let err = reduce(&setup, &state, &also_has, EventId::from_position(2)).unwrap_err();
        assert!(matches!(
            err,
            DeductionError::Inconsistent { event, .. } if event == EventId::from_position(2)
        ));
    }

    #[test]
    fn pass_limit_scales_with_table() {
        let setup = TableSetup::classic(&["a", "b", "c"], "a", &[]).unwrap();
        assert_eq!(pass_limit(&setup, 4), 3 * 21 + 4 + 1);
    }
}
