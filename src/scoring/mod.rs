pub mod board;
pub mod checkout;
pub mod leg;
pub mod match_state;
pub mod types;
pub mod visit;

pub use board::{aim_point, dart_at};
pub use checkout::{is_finishable, suggest_checkout};
pub use leg::{three_dart_average, LegState, LegStatus, PlayerLegScore, VisitRecord};
pub use match_state::{evaluate_match, LegSummary, MatchProgress, MatchStatus, NextLeg};
pub use types::{Dart, MatchSettings, PlayerId, ScoringError, Visit};
pub use visit::{evaluate_visit, VisitOutcome, VisitResult};
