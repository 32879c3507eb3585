use crate::model::deck::CardUniverse;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three disjoint card categories. Exactly one card of each
/// category forms the hidden solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Category {
    Suspect = 0,
    Weapon = 1,
    Room = 2,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Suspect, Category::Weapon, Category::Room];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Category::Suspect),
            1 => Some(Category::Weapon),
            2 => Some(Category::Room),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Suspect => "suspect",
            Category::Weapon => "weapon",
            Category::Room => "room",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a card inside its [`CardUniverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u8);

impl CardId {
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Static description of one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    pub slug: String,
    pub label: String,
    pub category: Category,
}

impl CardSpec {
    pub fn new(slug: impl Into<String>, label: impl Into<String>, category: Category) -> Self {
        Self {
            slug: slug.into(),
            label: label.into(),
            category,
        }
    }
}

/// A proposal of one card per category, stored in [`Category::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Triple([CardId; 3]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TripleError {
    #[error("card {0} is not in the universe")]
    UnknownCard(CardId),
    #[error("triple slot {position} expects a {expected} card but got a {found}")]
    WrongCategory {
        position: usize,
        expected: Category,
        found: Category,
    },
}

impl Triple {
    pub fn new(universe: &CardUniverse, cards: [CardId; 3]) -> Result<Self, TripleError> {
        let triple = Self(cards);
        triple.check(universe)?;
        Ok(triple)
    }

    /// Builds a triple without checking it; events carrying it are validated
    /// before they reach the engine.
    pub const fn from_cards_unchecked(cards: [CardId; 3]) -> Self {
        Self(cards)
    }

    pub fn check(&self, universe: &CardUniverse) -> Result<(), TripleError> {
        for (position, (card, expected)) in self.0.iter().zip(Category::ALL).enumerate() {
            let found = universe
                .category(*card)
                .ok_or(TripleError::UnknownCard(*card))?;
            if found != expected {
                return Err(TripleError::WrongCategory {
                    position,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    pub fn cards(&self) -> [CardId; 3] {
        self.0
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.0.contains(&card)
    }

    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.0.iter().copied()
    }
}
