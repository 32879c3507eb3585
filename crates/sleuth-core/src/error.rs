use crate::belief::Contradiction;
use crate::game::event::{Event, EventId};
use crate::model::card::CardId;
use crate::model::deck::DeckError;
use crate::model::player::{PlayerId, RosterError};
use thiserror::Error;

/// Errors raised while building a table or applying events to it.
#[derive(Debug, Error)]
pub enum DeductionError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("unknown card {0}")]
    UnknownCard(CardId),
    #[error("malformed {event_type} event: {message}")]
    MalformedEvent {
        event_type: &'static str,
        message: String,
    },
    #[error("invalid table setup: {0}")]
    InvalidSetup(#[from] SetupError),
    #[error("{event} is inconsistent with earlier facts: {contradiction}")]
    Inconsistent {
        event: EventId,
        contradiction: Contradiction,
    },
    #[error("inference did not reach a fixpoint within {passes} passes")]
    NonConvergence { passes: usize },
    #[error("failed to encode or decode game record: {0}")]
    Record(#[from] serde_json::Error),
}

impl DeductionError {
    pub(crate) fn malformed(event: &Event, message: impl Into<String>) -> Self {
        DeductionError::MalformedEvent {
            event_type: event.event_type(),
            message: message.into(),
        }
    }

    /// The contradiction behind an [`DeductionError::Inconsistent`] rejection.
    pub fn contradiction(&self) -> Option<&Contradiction> {
        match self {
            DeductionError::Inconsistent { contradiction, .. } => Some(contradiction),
            DeductionError::InvalidSetup(SetupError::Inconsistent(contradiction)) => {
                Some(contradiction)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{0}")]
    Deck(#[from] DeckError),
    #[error("{0}")]
    Roster(#[from] RosterError),
    #[error("unknown card '{0}' in the observer's hand")]
    UnknownHandCard(String),
    #[error("observer holds {hand_size} cards but {given} were supplied")]
    HandTooLarge { hand_size: usize, given: usize },
    #[error("observer's hand lists {0} twice")]
    DuplicateHandCard(String),
    #[error("unsupported game record version {0}")]
    UnsupportedVersion(u32),
    #[error("initial hand is inconsistent: {0}")]
    Inconsistent(Contradiction),
}
