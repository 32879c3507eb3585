use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Seat index in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand_size: usize,
    pub is_observer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("a table needs at least two players, got {0}")]
    TooFewPlayers(usize),
    #[error("{players} players cannot share {dealt} dealt cards")]
    TooManyPlayers { players: usize, dealt: usize },
    #[error("player names must not be empty")]
    EmptyName,
    #[error("player '{0}' is listed twice")]
    DuplicateName(String),
    #[error("observer '{0}' is not one of the players")]
    UnknownObserver(String),
}

/// Players in turn order with their fixed hand sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
    observer: PlayerId,
}

impl Roster {
    /// Seats `names` in the given order and splits `dealt` cards between them,
    /// the remainder going to the earliest players.
    pub fn deal<S: AsRef<str>>(names: &[S], observer: &str, dealt: usize) -> Result<Self, RosterError> {
        let count = names.len();
        if count < 2 {
            return Err(RosterError::TooFewPlayers(count));
        }
        if count > dealt || count > u8::MAX as usize {
            return Err(RosterError::TooManyPlayers {
                players: count,
                dealt,
            });
        }

        let base = dealt / count;
        let remainder = dealt % count;
        let mut seen = HashSet::new();
        let mut players = Vec::with_capacity(count);
        let mut observer_id = None;

        for (index, name) in names.iter().enumerate() {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(RosterError::EmptyName);
            }
            if !seen.insert(name.to_string()) {
                return Err(RosterError::DuplicateName(name.to_string()));
            }
            let id = PlayerId::from_index(index as u8);
            let is_observer = name == observer.trim();
            if is_observer {
                observer_id = Some(id);
            }
            players.push(Player {
                id,
                name: name.to_string(),
                hand_size: base + usize::from(index < remainder),
                is_observer,
            });
        }

        let observer = observer_id.ok_or_else(|| RosterError::UnknownObserver(observer.to_string()))?;
        Ok(Self { players, observer })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|player| player.id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        id.index() < self.players.len()
    }

    pub fn observer(&self) -> PlayerId {
        self.observer
    }

    pub fn hand_size(&self, id: PlayerId) -> usize {
        self.get(id).map(|player| player.hand_size).unwrap_or(0)
    }

    pub fn name(&self, id: PlayerId) -> &str {
        self.get(id).map(|player| player.name.as_str()).unwrap_or("?")
    }

    /// Exact names win; the `p{n}` seat id is only a fallback.
    pub fn by_name(&self, name: &str) -> Option<PlayerId> {
        let name = name.trim();
        self.players
            .iter()
            .find(|player| player.name == name)
            .or_else(|| self.players.iter().find(|player| player.id.to_string() == name))
            .map(|player| player.id)
    }

    pub fn next(&self, id: PlayerId) -> PlayerId {
        PlayerId::from_index(((id.index() + 1) % self.players.len()) as u8)
    }

    /// Players strictly after `from` and strictly before `to` in turn order,
    /// wrapping around the table.
    pub fn between(&self, from: PlayerId, to: PlayerId) -> Vec<PlayerId> {
        let mut seats = Vec::new();
        let mut current = self.next(from);
        while current != to && current != from {
            seats.push(current);
            current = self.next(current);
        }
        seats
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerId, Roster, RosterError};

    fn p(index: u8) -> PlayerId {
        PlayerId::from_index(index)
    }

    #[test]
    fn remainder_goes_to_earliest_players() {
        let roster = Roster::deal(&["a", "b", "c", "d"], "a", 18).unwrap();
        let sizes: Vec<_> = roster.players().iter().map(|pl| pl.hand_size).collect();
        assert_eq!(sizes, vec![5, 5, 4, 4]);
        assert_eq!(sizes.iter().sum::<usize>(), 18);
    }

    #[test]
    fn six_players_hold_three_cards_each() {
        let roster = Roster::deal(&["a", "b", "c", "d", "e", "f"], "c", 18).unwrap();
        assert!(roster.players().iter().all(|pl| pl.hand_size == 3));
        assert_eq!(roster.observer(), p(2));
        assert!(roster.get(p(2)).unwrap().is_observer);
    }

    #[test]
    fn between_wraps_around_the_table() {
        let roster = Roster::deal(&["a", "b", "c", "d"], "a", 18).unwrap();
        assert_eq!(roster.between(p(0), p(2)), vec![p(1)]);
        assert_eq!(roster.between(p(2), p(1)), vec![p(3), p(0)]);
        assert!(roster.between(p(1), p(2)).is_empty());
    }

    #[test]
    fn rejects_unknown_observer_and_duplicates() {
        assert_eq!(
            Roster::deal(&["a", "b"], "z", 18).unwrap_err(),
            RosterError::UnknownObserver("z".to_string())
        );
        assert_eq!(
            Roster::deal(&["a", "a"], "a", 18).unwrap_err(),
            RosterError::DuplicateName("a".to_string())
        );
        assert_eq!(
            Roster::deal(&["a"], "a", 18).unwrap_err(),
            RosterError::TooFewPlayers(1)
        );
        assert_eq!(
            Roster::deal(&["a", "b"], "z", 18).unwrap_err().to_string(),
            "observer 'z' is not one of the players"
        );
    }

    #[test]
    fn lookup_by_name_or_id() {
        let roster = Roster::deal(&["Ask", "Passer", "Shower"], "Ask", 18).unwrap();
        assert_eq!(roster.by_name("Shower"), Some(p(2)));
        assert_eq!(roster.by_name("p1"), Some(p(1)));
        assert_eq!(roster.by_name("nobody"), None);
    }

    #[test]
    fn names_shadow_seat_ids() {
        let roster = Roster::deal(&["p1", "p0", "Cat"], "Cat", 18).unwrap();
        assert_eq!(roster.by_name("p0"), Some(p(1)));
        assert_eq!(roster.by_name("p1"), Some(p(0)));
        assert_eq!(roster.by_name("p2"), Some(p(2)));
    }
}
