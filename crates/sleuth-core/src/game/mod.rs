pub mod event;
pub mod serialization;
pub mod setup;
pub mod simulate;
pub mod table;

pub use event::{Event, EventId, EventLog, RefutedTriple};
pub use serialization::GameRecord;
pub use setup::{ContradictionPolicy, DeductionMode, TableSetup};
pub use simulate::HiddenDeal;
pub use table::{GridSnapshot, Table};
