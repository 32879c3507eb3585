//! Domain events: the only way belief state changes.
//!
//! Events are immutable once appended. The belief grid, constraint store and
//! refuted triples are all a pure function of the ordered log plus the
//! observer's initial hand.

use crate::error::DeductionError;
use crate::game::setup::TableSetup;
use crate::model::card::{CardId, Triple};
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// 1-based position of an event in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u32);

impl EventId {
    pub const fn from_position(position: u32) -> Self {
        Self(position)
    }

    pub const fn position(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// `asker` proposed `triple`; players after the asker passed until
    /// `responder` showed a card. `triple == None` is a turn without a
    /// suggestion; `responder == None` means nobody could respond. `revealed`
    /// is only set when the observer saw the card.
    Suggestion {
        asker: PlayerId,
        #[serde(default)]
        triple: Option<Triple>,
        #[serde(default)]
        responder: Option<PlayerId>,
        #[serde(default)]
        revealed: Option<CardId>,
    },
    /// `triple` is publicly known not to be the solution.
    AccusationFailure { accuser: PlayerId, triple: Triple },
    /// Out-of-band fact: `player` holds at least one of `cards`, or none of
    /// them when `asserts_possession` is false.
    ManualClaim {
        player: PlayerId,
        cards: Vec<CardId>,
        asserts_possession: bool,
    },
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Suggestion { .. } => "suggestion",
            Event::AccusationFailure { .. } => "accusation_failure",
            Event::ManualClaim { .. } => "manual_claim",
        }
    }

    /// Players named by the event.
    pub fn players(&self) -> Vec<PlayerId> {
        match self {
            Event::Suggestion {
                asker, responder, ..
            } => std::iter::once(*asker).chain(*responder).collect(),
            Event::AccusationFailure { accuser, .. } => vec![*accuser],
            Event::ManualClaim { player, .. } => vec![*player],
        }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.players().contains(&player)
    }

    /// Collapses repeated manual-claim cards, keeping first occurrences.
    /// Every other event is returned as is.
    pub fn normalized(self) -> Self {
        match self {
            Event::ManualClaim {
                player,
                cards,
                asserts_possession,
            } => {
                let mut unique: Vec<CardId> = Vec::with_capacity(cards.len());
                for card in cards {
                    if !unique.contains(&card) {
                        unique.push(card);
                    }
                }
                Event::ManualClaim {
                    player,
                    cards: unique,
                    asserts_possession,
                }
            }
            other => other,
        }
    }

    /// Rejects events that reference ids outside the table or are malformed.
    /// Runs before any state is touched.
    pub fn validate(&self, setup: &TableSetup) -> Result<(), DeductionError> {
        let roster = setup.roster();
        let universe = setup.universe();
        let check_player = |player: PlayerId| -> Result<(), DeductionError> {
            if roster.contains(player) {
                Ok(())
            } else {
                Err(DeductionError::UnknownPlayer(player))
            }
        };
        let check_card = |card: CardId| -> Result<(), DeductionError> {
            if universe.contains(card) {
                Ok(())
            } else {
                Err(DeductionError::UnknownCard(card))
            }
        };
        let check_triple = |triple: &Triple| -> Result<(), DeductionError> {
            for card in triple.iter() {
                check_card(card)?;
            }
            triple
                .check(universe)
                .map_err(|err| DeductionError::malformed(self, err.to_string()))
        };

        match self {
            Event::Suggestion {
                asker,
                triple,
                responder,
                revealed,
            } => {
                check_player(*asker)?;
                if let Some(responder) = responder {
                    check_player(*responder)?;
                    if responder == asker {
                        return Err(DeductionError::malformed(
                            self,
                            "the asker cannot answer their own suggestion",
                        ));
                    }
                }
                if let Some(card) = revealed {
                    check_card(*card)?;
                }
                match triple {
                    Some(triple) => {
                        check_triple(triple)?;
                        if let Some(card) = revealed {
                            if responder.is_none() {
                                return Err(DeductionError::malformed(
                                    self,
                                    "a revealed card needs a responder",
                                ));
                            }
                            if !triple.contains(*card) {
                                return Err(DeductionError::malformed(
                                    self,
                                    "the revealed card is not part of the suggestion",
                                ));
                            }
                        }
                    }
                    None => {
                        if responder.is_some() || revealed.is_some() {
                            return Err(DeductionError::malformed(
                                self,
                                "a turn without a suggestion cannot have a response",
                            ));
                        }
                    }
                }
                Ok(())
            }
            Event::AccusationFailure { accuser, triple } => {
                check_player(*accuser)?;
                check_triple(triple)
            }
            Event::ManualClaim { player, cards, .. } => {
                check_player(*player)?;
                if cards.is_empty() {
                    return Err(DeductionError::malformed(
                        self,
                        "a manual claim must name at least one card",
                    ));
                }
                for (index, card) in cards.iter().enumerate() {
                    check_card(*card)?;
                    if cards[..index].contains(card) {
                        return Err(DeductionError::malformed(
                            self,
                            "a manual claim lists the same card twice",
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    /// One-line human summary, e.g. for a turn history view.
    pub fn describe(&self, setup: &TableSetup) -> String {
        let name = |player: PlayerId| setup.roster().name(player).to_string();
        let slugs = |cards: &mut dyn Iterator<Item = CardId>| {
            cards
                .map(|card| setup.universe().slug(card))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Event::Suggestion {
                asker,
                triple: None,
                ..
            } => format!("{} made no suggestion", name(*asker)),
            Event::Suggestion {
                asker,
                triple: Some(triple),
                responder,
                revealed,
            } => {
                let mut line = format!("{} asked [{}]", name(*asker), slugs(&mut triple.iter()));
                match responder {
                    Some(responder) => line.push_str(&format!("; {} showed a card", name(*responder))),
                    None => line.push_str("; nobody could respond"),
                }
                if let Some(card) = revealed {
                    line.push_str(&format!(" ({})", setup.universe().slug(*card)));
                }
                line
            }
            Event::AccusationFailure { accuser, triple } => format!(
                "{} accused [{}] and was wrong",
                name(*accuser),
                slugs(&mut triple.iter())
            ),
            Event::ManualClaim {
                player,
                cards,
                asserts_possession,
            } => {
                let verb = match (*asserts_possession, cards.len()) {
                    (true, 1) => "holds",
                    (true, _) => "holds one of",
                    (false, _) => "holds none of",
                };
                format!(
                    "{} {verb} [{}]",
                    name(*player),
                    slugs(&mut cards.iter().copied())
                )
            }
        }
    }
}

/// A failed accusation: this triple is not the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefutedTriple {
    pub triple: Triple,
    pub origin: EventId,
}

/// Append-only ordered record of events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next appended event will receive.
    pub fn next_id(&self) -> EventId {
        EventId::from_position(self.events.len() as u32 + 1)
    }

    pub fn push(&mut self, event: Event) -> EventId {
        let id = self.next_id();
        self.events.push(event);
        id
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        let index = (id.position() as usize).checked_sub(1)?;
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| (EventId::from_position(index as u32 + 1), event))
    }
}
