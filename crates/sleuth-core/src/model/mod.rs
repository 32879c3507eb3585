pub mod card;
pub mod deck;
pub mod player;

pub use card::{CardId, CardSpec, Category, Triple, TripleError};
pub use deck::{CardUniverse, DeckError};
pub use player::{Player, PlayerId, Roster, RosterError};
