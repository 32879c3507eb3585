//! Ground-truth deals for generating honest event streams.

use super::event::Event;
use super::setup::TableSetup;
use crate::belief::grid::{BeliefGrid, Mark};
use crate::error::SetupError;
use crate::model::card::{CardId, Category, Triple};
use crate::model::deck::CardUniverse;
use crate::model::player::{PlayerId, Roster};
use rand::Rng;

/// A concrete hidden deal: one solution card per category and every other
/// card in exactly one hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenDeal {
    universe: CardUniverse,
    roster: Roster,
    solution: Triple,
    owners: Vec<Option<PlayerId>>,
}

impl HiddenDeal {
    pub fn deal<R: Rng + ?Sized>(setup: &TableSetup, rng: &mut R) -> Self {
        let universe = setup.universe().clone();
        let roster = setup.roster().clone();
        let solution = Triple::from_cards_unchecked(random_cards(&universe, rng));

        let mut remaining = universe
            .shuffled(rng)
            .into_iter()
            .filter(|card| !solution.contains(*card));
        let mut owners = vec![None; universe.len()];
        for player in roster.ids() {
            for card in remaining.by_ref().take(roster.hand_size(player)) {
                owners[card.index()] = Some(player);
            }
        }

        Self {
            universe,
            roster,
            solution,
            owners,
        }
    }

    pub fn solution(&self) -> Triple {
        self.solution
    }

    pub fn holder(&self, card: CardId) -> Option<PlayerId> {
        self.owners.get(card.index()).copied().flatten()
    }

    pub fn hand(&self, player: PlayerId) -> Vec<CardId> {
        self.universe
            .ids()
            .filter(|card| self.holder(*card) == Some(player))
            .collect()
    }

    /// `setup` with the observer's hand replaced by the dealt one.
    pub fn observer_setup(&self, setup: &TableSetup) -> Result<TableSetup, SetupError> {
        setup.clone().with_initial_hand(&self.hand(setup.observer()))
    }

    /// The honest outcome of `asker` suggesting `triple`: the first player
    /// clockwise holding any of the cards answers. The card is revealed only
    /// when the observer asked or answered.
    pub fn suggestion(&self, asker: PlayerId, triple: Triple) -> Event {
        let observer = self.roster.observer();
        let mut player = self.roster.next(asker);
        while player != asker {
            if let Some(card) = triple.iter().find(|card| self.holder(*card) == Some(player)) {
                let revealed = (observer == asker || observer == player).then_some(card);
                return Event::Suggestion {
                    asker,
                    triple: Some(triple),
                    responder: Some(player),
                    revealed,
                };
            }
            player = self.roster.next(player);
        }
        Event::Suggestion {
            asker,
            triple: Some(triple),
            responder: None,
            revealed: None,
        }
    }

    /// A random player suggests a random triple.
    pub fn random_turn<R: Rng + ?Sized>(&self, rng: &mut R) -> Event {
        let asker = PlayerId::from_index(rng.gen_range(0..self.roster.len()) as u8);
        let triple = Triple::from_cards_unchecked(random_cards(&self.universe, rng));
        self.suggestion(asker, triple)
    }

    /// A random wrong accusation, or `None` if the draw hit the solution.
    pub fn random_failed_accusation<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Event> {
        let accuser = PlayerId::from_index(rng.gen_range(0..self.roster.len()) as u8);
        let triple = Triple::from_cards_unchecked(random_cards(&self.universe, rng));
        (triple != self.solution).then_some(Event::AccusationFailure { accuser, triple })
    }

    /// Settled cells that contradict the deal.
    pub fn disagreements(&self, grid: &BeliefGrid) -> Vec<(PlayerId, CardId)> {
        let mut wrong = Vec::new();
        for player in grid.players() {
            for card in grid.cards() {
                let holds = self.holder(card) == Some(player);
                match grid.mark(player, card) {
                    Some(Mark::Has) if !holds => wrong.push((player, card)),
                    Some(Mark::Lacks) if holds => wrong.push((player, card)),
                    _ => {}
                }
            }
        }
        wrong
    }

    pub fn agrees_with(&self, grid: &BeliefGrid) -> bool {
        self.disagreements(grid).is_empty()
    }
}

/// One uniformly chosen card per category, in category order.
fn random_cards<R: Rng + ?Sized>(universe: &CardUniverse, rng: &mut R) -> [CardId; 3] {
    Category::ALL.map(|category| {
        let members: Vec<CardId> = universe.in_category(category).collect();
        members[rng.gen_range(0..members.len())]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::table::Table;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn setup() -> TableSetup {
        TableSetup::classic(&["a", "b", "c", "d"], "b", &[]).unwrap()
    }

    #[test]
    fn deal_fills_every_hand_exactly() {
        let setup = setup();
        let mut rng = SmallRng::seed_from_u64(11);
        let deal = HiddenDeal::deal(&setup, &mut rng);
        for player in setup.roster().ids() {
            assert_eq!(deal.hand(player).len(), setup.roster().hand_size(player));
        }
        for card in deal.solution().iter() {
            assert_eq!(deal.holder(card), None);
        }
        let held = setup
            .universe()
            .ids()
            .filter(|card| deal.holder(*card).is_some())
            .count();
        assert_eq!(held, 18);
    }

    #[test]
    fn same_seed_same_deal() {
        let setup = setup();
        let a = HiddenDeal::deal(&setup, &mut SmallRng::seed_from_u64(5));
        let b = HiddenDeal::deal(&setup, &mut SmallRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn suggesting_the_solution_gets_no_answer() {
        let setup = setup();
        let deal = HiddenDeal::deal(&setup, &mut SmallRng::seed_from_u64(3));
        let event = deal.suggestion(PlayerId::from_index(0), deal.solution());
        assert!(matches!(
            event,
            Event::Suggestion {
                responder: None,
                revealed: None,
                ..
            }
        ));
    }

    #[test]
    fn revealed_cards_only_reach_the_observer() {
        let setup = setup();
        let mut rng = SmallRng::seed_from_u64(21);
        let deal = HiddenDeal::deal(&setup, &mut rng);
        for _ in 0..200 {
            if let Event::Suggestion {
                asker,
                responder: Some(responder),
                revealed,
                ..
            } = deal.random_turn(&mut rng)
            {
                let observer_involved = asker == setup.observer() || responder == setup.observer();
                assert_eq!(revealed.is_some(), observer_involved);
                if let Some(card) = revealed {
                    assert_eq!(deal.holder(card), Some(responder));
                }
            }
        }
    }

    #[test]
    fn observer_table_agrees_with_the_deal() {
        let setup = setup();
        let mut rng = SmallRng::seed_from_u64(8);
        let deal = HiddenDeal::deal(&setup, &mut rng);
        let mut table = Table::from_setup(deal.observer_setup(&setup).unwrap()).unwrap();
        for _ in 0..30 {
            table.append(deal.random_turn(&mut rng)).unwrap();
        }
        assert!(deal.agrees_with(table.state().grid()));
        assert!(table.contradictions().is_empty());
    }
}
