pub mod drills;
pub mod state;
pub mod tally;

pub use state::{TrainingError, TrainingMode, TrainingState};
pub use tally::{DrillTally, TargetResult};
