#![deny(warnings)]
pub mod belief;
pub mod error;
pub mod game;
pub mod model;

pub use belief::{
    AppliedEffects, BeliefState, CellState, Contradiction, Explanation, GridMetrics, Mark, Reason,
    SolutionReport, SolutionVerdict,
};
pub use error::{DeductionError, SetupError};
pub use game::{
    ContradictionPolicy, DeductionMode, Event, EventId, GameRecord, HiddenDeal, Table, TableSetup,
};
pub use model::{CardId, CardSpec, CardUniverse, Category, PlayerId, Triple};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "sleuth"
    }

    pub const fn codename() -> &'static str {
        "Notebook"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
