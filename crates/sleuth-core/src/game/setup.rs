use crate::error::SetupError;
use crate::model::card::CardId;
use crate::model::deck::CardUniverse;
use crate::model::player::{PlayerId, Roster};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which rule families the fixpoint runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMode {
    /// Constraint tightening, cross-exclusion, hand counting and solution
    /// deduction from failed accusations.
    #[default]
    Classic,
    /// Classic plus category closure: each category has exactly one
    /// solution card.
    Extended,
}

impl DeductionMode {
    pub const fn category_closure(self) -> bool {
        matches!(self, DeductionMode::Extended)
    }
}

/// What happens when an event contradicts what is already known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionPolicy {
    /// Reject the event and leave the table untouched.
    #[default]
    Reject,
    /// Record the contradiction, keep the earlier fact, and continue.
    Tolerate,
}

/// Static facts fixed when a table is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSetup {
    universe: CardUniverse,
    roster: Roster,
    initial_hand: Vec<CardId>,
    mode: DeductionMode,
    policy: ContradictionPolicy,
}

impl TableSetup {
    pub fn new<S: AsRef<str>>(
        universe: CardUniverse,
        names: &[S],
        observer: &str,
        initial_hand: &[CardId],
    ) -> Result<Self, SetupError> {
        let roster = Roster::deal(names, observer, universe.dealt_count())?;
        check_hand(&universe, &roster, initial_hand)?;

        Ok(Self {
            universe,
            roster,
            initial_hand: initial_hand.to_vec(),
            mode: DeductionMode::default(),
            policy: ContradictionPolicy::default(),
        })
    }

    /// Classic 21-card deck, with the observer's hand given as slugs.
    pub fn classic<S: AsRef<str>>(
        names: &[S],
        observer: &str,
        hand: &[&str],
    ) -> Result<Self, SetupError> {
        let universe = CardUniverse::classic();
        let hand = resolve_slugs(&universe, hand)?;
        Self::new(universe, names, observer, &hand)
    }

    /// Same table with a different observer hand.
    pub fn with_initial_hand(mut self, hand: &[CardId]) -> Result<Self, SetupError> {
        check_hand(&self.universe, &self.roster, hand)?;
        self.initial_hand = hand.to_vec();
        Ok(self)
    }

    pub fn with_mode(mut self, mode: DeductionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: ContradictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn universe(&self) -> &CardUniverse {
        &self.universe
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn observer(&self) -> PlayerId {
        self.roster.observer()
    }

    pub fn initial_hand(&self) -> &[CardId] {
        &self.initial_hand
    }

    pub fn mode(&self) -> DeductionMode {
        self.mode
    }

    pub fn policy(&self) -> ContradictionPolicy {
        self.policy
    }
}

fn check_hand(universe: &CardUniverse, roster: &Roster, hand: &[CardId]) -> Result<(), SetupError> {
    let hand_size = roster.hand_size(roster.observer());
    if hand.len() > hand_size {
        return Err(SetupError::HandTooLarge {
            hand_size,
            given: hand.len(),
        });
    }
    let mut seen = HashSet::new();
    for card in hand {
        if !universe.contains(*card) {
            return Err(SetupError::UnknownHandCard(card.to_string()));
        }
        if !seen.insert(*card) {
            return Err(SetupError::DuplicateHandCard(universe.slug(*card).to_string()));
        }
    }
    Ok(())
}

pub fn resolve_slugs(universe: &CardUniverse, slugs: &[&str]) -> Result<Vec<CardId>, SetupError> {
    slugs
        .iter()
        .map(|slug| {
            universe
                .card(slug)
                .ok_or_else(|| SetupError::UnknownHandCard(slug.to_string()))
        })
        .collect()
}
