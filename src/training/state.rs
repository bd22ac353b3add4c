use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::drills::{AroundTheClock, Bobs27, CheckoutLadder, RingDrill, ScoreDrill};
use super::tally::DrillTally;
use crate::config::TrainingSettings;
use crate::scoring::{ScoringError, Visit};

const SCORE_TRAINING_TARGET: u8 = 20;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("training session is already finished")]
    Finished,
    #[error("unknown training mode '{0}'")]
    UnknownMode(String),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingMode {
    #[serde(rename = "doubles")]
    Doubles,
    #[serde(rename = "triples")]
    Triples,
    #[serde(rename = "around_the_clock")]
    AroundTheClock,
    #[serde(rename = "checkout_121")]
    Checkout121,
    #[serde(rename = "bobs_27")]
    Bobs27,
    #[serde(rename = "score_training")]
    ScoreTraining,
}

impl TrainingMode {
    pub const ALL: [TrainingMode; 6] = [
        TrainingMode::Doubles,
        TrainingMode::Triples,
        TrainingMode::AroundTheClock,
        TrainingMode::Checkout121,
        TrainingMode::Bobs27,
        TrainingMode::ScoreTraining,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMode::Doubles => "doubles",
            TrainingMode::Triples => "triples",
            TrainingMode::AroundTheClock => "around_the_clock",
            TrainingMode::Checkout121 => "checkout_121",
            TrainingMode::Bobs27 => "bobs_27",
            TrainingMode::ScoreTraining => "score_training",
        }
    }
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingMode {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrainingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| TrainingError::UnknownMode(s.to_string()))
    }
}

/// Live state of a drill, one variant per mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum TrainingState {
    #[serde(rename = "doubles")]
    Doubles(RingDrill),
    #[serde(rename = "triples")]
    Triples(RingDrill),
    #[serde(rename = "around_the_clock")]
    AroundTheClock(AroundTheClock),
    #[serde(rename = "checkout_121")]
    Checkout121(CheckoutLadder),
    #[serde(rename = "bobs_27")]
    Bobs27(Bobs27),
    #[serde(rename = "score_training")]
    ScoreTraining(ScoreDrill),
}

impl TrainingState {
    pub fn new(mode: TrainingMode, settings: &TrainingSettings) -> Self {
        match mode {
            TrainingMode::Doubles => TrainingState::Doubles(RingDrill::new(2, settings.doubles_rounds)),
            TrainingMode::Triples => TrainingState::Triples(RingDrill::new(3, settings.triples_rounds)),
            TrainingMode::AroundTheClock => {
                TrainingState::AroundTheClock(AroundTheClock::new(settings.around_the_clock_rounds))
            }
            TrainingMode::Checkout121 => TrainingState::Checkout121(CheckoutLadder::new(
                settings.checkout_121_start,
                settings.checkout_121_attempts,
            )),
            TrainingMode::Bobs27 => TrainingState::Bobs27(Bobs27::new()),
            TrainingMode::ScoreTraining => TrainingState::ScoreTraining(ScoreDrill::new(
                SCORE_TRAINING_TARGET,
                settings.score_training_rounds,
            )),
        }
    }

    pub fn mode(&self) -> TrainingMode {
        match self {
            TrainingState::Doubles(_) => TrainingMode::Doubles,
            TrainingState::Triples(_) => TrainingMode::Triples,
            TrainingState::AroundTheClock(_) => TrainingMode::AroundTheClock,
            TrainingState::Checkout121(_) => TrainingMode::Checkout121,
            TrainingState::Bobs27(_) => TrainingMode::Bobs27,
            TrainingState::ScoreTraining(_) => TrainingMode::ScoreTraining,
        }
    }

    pub fn apply_visit(&mut self, visit: &Visit) -> Result<(), TrainingError> {
        if self.is_finished() {
            return Err(TrainingError::Finished);
        }

        match self {
            TrainingState::Doubles(drill) | TrainingState::Triples(drill) => drill.apply(visit),
            TrainingState::AroundTheClock(drill) => drill.apply(visit),
            TrainingState::Checkout121(drill) => drill.apply(visit)?,
            TrainingState::Bobs27(drill) => drill.apply(visit),
            TrainingState::ScoreTraining(drill) => drill.apply(visit),
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        match self {
            TrainingState::Doubles(drill) | TrainingState::Triples(drill) => drill.finished,
            TrainingState::AroundTheClock(drill) => drill.finished,
            TrainingState::Checkout121(drill) => drill.finished,
            TrainingState::Bobs27(drill) => drill.finished,
            TrainingState::ScoreTraining(drill) => drill.finished,
        }
    }

    pub fn tally(&self) -> &DrillTally {
        match self {
            TrainingState::Doubles(drill) | TrainingState::Triples(drill) => &drill.tally,
            TrainingState::AroundTheClock(drill) => &drill.tally,
            TrainingState::Checkout121(drill) => &drill.tally,
            TrainingState::Bobs27(drill) => &drill.tally,
            TrainingState::ScoreTraining(drill) => &drill.tally,
        }
    }

    /// Mode-specific score: targets cleared, checkouts made, Bob's 27 points or total points
    pub fn score(&self) -> i64 {
        match self {
            TrainingState::Doubles(drill) | TrainingState::Triples(drill) => drill.cleared as i64,
            TrainingState::AroundTheClock(drill) => drill.cleared as i64,
            TrainingState::Checkout121(drill) => drill.successes as i64,
            TrainingState::Bobs27(drill) => drill.score as i64,
            TrainingState::ScoreTraining(drill) => drill.total_points as i64,
        }
    }

    /// Label of what the player should aim at next
    pub fn current_target(&self) -> Option<String> {
        if self.is_finished() {
            return None;
        }
        let target = match self {
            TrainingState::Doubles(drill) | TrainingState::Triples(drill) => drill.target_label(),
            TrainingState::AroundTheClock(drill) => drill.target_label(),
            TrainingState::Checkout121(drill) => drill.remaining.to_string(),
            TrainingState::Bobs27(drill) => crate::scoring::Dart::double(drill.target()).label(),
            TrainingState::ScoreTraining(drill) => drill.target.to_string(),
        };
        Some(target)
    }

    pub fn hit_rate(&self) -> f64 {
        self.tally().hit_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Dart;

    fn visit(darts: &[Dart]) -> Visit {
        Visit::new(darts.to_vec()).unwrap()
    }

    #[test]
    fn test_mode_round_trip_names() {
        for mode in TrainingMode::ALL {
            assert_eq!(mode.as_str().parse::<TrainingMode>().unwrap(), mode);
            let state = TrainingState::new(mode, &TrainingSettings::default());
            assert_eq!(state.mode(), mode);
        }
        assert!(matches!(
            "darts_golf".parse::<TrainingMode>(),
            Err(TrainingError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_state_serializes_with_mode_tag() {
        let state = TrainingState::new(TrainingMode::Bobs27, &TrainingSettings::default());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["mode"], "bobs_27");
        assert_eq!(json["score"], 27);

        let restored: TrainingState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_finished_session_rejects_visits() {
        let settings = TrainingSettings {
            score_training_rounds: 1,
            ..TrainingSettings::default()
        };
        let mut state = TrainingState::new(TrainingMode::ScoreTraining, &settings);
        state.apply_visit(&visit(&[Dart::treble(20)])).unwrap();
        assert!(state.is_finished());
        assert_eq!(state.current_target(), None);
        assert_eq!(
            state.apply_visit(&visit(&[Dart::treble(20)])),
            Err(TrainingError::Finished)
        );
    }

    #[test]
    fn test_checkout_ladder_through_state() {
        let mut state = TrainingState::new(TrainingMode::Checkout121, &TrainingSettings::default());
        let result = state.apply_visit(&visit(&[
            Dart::treble(20),
            Dart::treble(17),
            Dart::double(5),
        ]));
        assert!(result.is_ok());
        assert_eq!(state.score(), 1);

        let mut state = TrainingState::new(TrainingMode::Checkout121, &TrainingSettings::default());
        state.apply_visit(&visit(&[Dart::treble(20), Dart::treble(20)])).unwrap();
        assert_eq!(state.current_target(), Some("121".to_string()));
    }

    #[test]
    fn test_doubles_hit_rate() {
        let mut state = TrainingState::new(TrainingMode::Doubles, &TrainingSettings::default());
        state
            .apply_visit(&visit(&[Dart::double(1), Dart::miss(), Dart::miss()]))
            .unwrap();
        assert_eq!(state.current_target(), Some("D2".to_string()));
        assert!((state.hit_rate() - 100.0 / 3.0).abs() < 1e-9);
    }
}
