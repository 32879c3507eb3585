use crate::model::card::{CardId, CardSpec, Category};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

const CLASSIC_SUSPECTS: [(&str, &str); 6] = [
    ("miss_scarlett", "Miss Scarlett"),
    ("col_mustard", "Col. Mustard"),
    ("mrs_peacock", "Mrs. Peacock"),
    ("prof_plum", "Prof. Plum"),
    ("rev_green", "Rev. Green"),
    ("dr_orchid", "Dr. Orchid"),
];

const CLASSIC_WEAPONS: [(&str, &str); 6] = [
    ("rope", "Rope"),
    ("dagger", "Dagger"),
    ("wrench", "Wrench"),
    ("revolver", "Revolver"),
    ("candlestick", "Candlestick"),
    ("lead_pipe", "Lead Pipe"),
];

const CLASSIC_ROOMS: [(&str, &str); 9] = [
    ("kitchen", "Kitchen"),
    ("dining_room", "Dining Room"),
    ("lounge", "Lounge"),
    ("hall", "Hall"),
    ("study", "Study"),
    ("library", "Library"),
    ("billiard_room", "Billiard Room"),
    ("conservatory", "Conservatory"),
    ("ballroom", "Ballroom"),
];

const MAX_CARDS: usize = u8::MAX as usize;

/// The fixed card universe of a table. Cards are grouped by category in
/// [`Category::ALL`] order and addressed by [`CardId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardUniverse {
    cards: Vec<CardSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("category {0} needs at least one card")]
    EmptyCategory(Category),
    #[error("card slugs must not be empty")]
    EmptySlug,
    #[error("card slug '{0}' is defined twice")]
    DuplicateSlug(String),
    #[error("{0} cards exceeds the limit of {max}", max = MAX_CARDS)]
    TooManyCards(usize),
}

impl CardUniverse {
    /// The 21-card classic deck: 6 suspects, 6 weapons and 9 rooms.
    pub fn classic() -> Self {
        let mut cards = Vec::with_capacity(21);
        for (category, list) in [
            (Category::Suspect, &CLASSIC_SUSPECTS[..]),
            (Category::Weapon, &CLASSIC_WEAPONS[..]),
            (Category::Room, &CLASSIC_ROOMS[..]),
        ] {
            for (slug, label) in list {
                cards.push(CardSpec::new(*slug, *label, category));
            }
        }
        Self { cards }
    }

    pub fn custom(
        suspects: Vec<CardSpec>,
        weapons: Vec<CardSpec>,
        rooms: Vec<CardSpec>,
    ) -> Result<Self, DeckError> {
        let mut cards = Vec::with_capacity(suspects.len() + weapons.len() + rooms.len());
        for (category, list) in [
            (Category::Suspect, suspects),
            (Category::Weapon, weapons),
            (Category::Room, rooms),
        ] {
            if list.is_empty() {
                return Err(DeckError::EmptyCategory(category));
            }
            cards.extend(list.into_iter().map(|spec| CardSpec { category, ..spec }));
        }
        Self::from_specs(cards)
    }

    /// Rebuilds a universe from a flat list, e.g. a persisted record. Cards are
    /// regrouped by category so ids stay category-ordered.
    pub fn from_specs(mut cards: Vec<CardSpec>) -> Result<Self, DeckError> {
        if cards.len() > MAX_CARDS {
            return Err(DeckError::TooManyCards(cards.len()));
        }
        cards.sort_by_key(|spec| spec.category);
        for category in Category::ALL {
            if !cards.iter().any(|spec| spec.category == category) {
                return Err(DeckError::EmptyCategory(category));
            }
        }
        let mut seen = HashSet::new();
        for spec in &cards {
            if spec.slug.trim().is_empty() {
                return Err(DeckError::EmptySlug);
            }
            if !seen.insert(spec.slug.as_str()) {
                return Err(DeckError::DuplicateSlug(spec.slug.clone()));
            }
        }
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards dealt to players: everything except the three solution cards.
    pub fn dealt_count(&self) -> usize {
        self.cards.len().saturating_sub(Category::ALL.len())
    }

    pub fn contains(&self, card: CardId) -> bool {
        card.index() < self.cards.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        (0..self.cards.len()).map(|index| CardId::from_index(index as u8))
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = CardId> + '_ {
        self.ids()
            .filter(move |card| self.cards[card.index()].category == category)
    }

    pub fn spec(&self, card: CardId) -> Option<&CardSpec> {
        self.cards.get(card.index())
    }

    pub fn specs(&self) -> &[CardSpec] {
        &self.cards
    }

    pub fn category(&self, card: CardId) -> Option<Category> {
        self.spec(card).map(|spec| spec.category)
    }

    pub fn slug(&self, card: CardId) -> &str {
        self.spec(card).map(|spec| spec.slug.as_str()).unwrap_or("?")
    }

    pub fn card(&self, slug: &str) -> Option<CardId> {
        self.cards
            .iter()
            .position(|spec| spec.slug == slug)
            .map(|index| CardId::from_index(index as u8))
    }

    pub fn cards_for<const N: usize>(&self, slugs: [&str; N]) -> Option<[CardId; N]> {
        let mut out = [CardId::from_index(0); N];
        for (slot, slug) in out.iter_mut().zip(slugs) {
            *slot = self.card(slug)?;
        }
        Some(out)
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Vec<CardId> {
        let mut ids: Vec<CardId> = self.ids().collect();
        ids.shuffle(rng);
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::{CardUniverse, DeckError};
    use crate::model::card::{CardSpec, Category};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn classic_deck_has_21_cards_in_three_categories() {
        let universe = CardUniverse::classic();
        assert_eq!(universe.len(), 21);
        assert_eq!(universe.dealt_count(), 18);
        assert_eq!(universe.in_category(Category::Suspect).count(), 6);
        assert_eq!(universe.in_category(Category::Weapon).count(), 6);
        assert_eq!(universe.in_category(Category::Room).count(), 9);
    }

    #[test]
    fn slug_lookup_roundtrip() {
        let universe = CardUniverse::classic();
        let hall = universe.card("hall").expect("hall exists");
        assert_eq!(universe.slug(hall), "hall");
        assert_eq!(universe.category(hall), Some(Category::Room));
        assert!(universe.card("ballroom_dancer").is_none());
    }

    #[test]
    fn custom_deck_rejects_duplicates_and_empty_categories() {
        let card = |slug: &str| CardSpec::new(slug, slug, Category::Suspect);
        let err = CardUniverse::custom(vec![card("a")], vec![], vec![card("b")]).unwrap_err();
        assert_eq!(err, DeckError::EmptyCategory(Category::Weapon));

        let err =
            CardUniverse::custom(vec![card("a")], vec![card("a")], vec![card("b")]).unwrap_err();
        assert_eq!(err, DeckError::DuplicateSlug("a".to_string()));
        assert_eq!(err.to_string(), "card slug 'a' is defined twice");
    }

    #[test]
    fn custom_deck_forces_category_of_each_group() {
        let card = |slug: &str| CardSpec::new(slug, slug, Category::Suspect);
        let universe =
            CardUniverse::custom(vec![card("s")], vec![card("w")], vec![card("r1"), card("r2")])
                .unwrap();
        let r2 = universe.card("r2").unwrap();
        assert_eq!(universe.category(r2), Some(Category::Room));
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let universe = CardUniverse::classic();
        let seeded = |seed| universe.shuffled(&mut SmallRng::seed_from_u64(seed));
        assert_eq!(seeded(42), seeded(42));
        assert_ne!(seeded(1), seeded(2));
        assert_eq!(seeded(7).len(), 21);
    }
}
