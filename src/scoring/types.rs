use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

pub type PlayerId = i64;

pub const BULL: u8 = 25;
pub const MAX_DARTS_PER_VISIT: usize = 3;

/// Errors raised while validating or applying a visit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("invalid segment {0}: expected 0-20 or 25")]
    InvalidSegment(u8),
    #[error("invalid multiplier {multiplier} for segment {segment}")]
    InvalidMultiplier { segment: u8, multiplier: u8 },
    #[error("a visit must contain between 1 and 3 darts, got {0}")]
    InvalidDartCount(usize),
    #[error("darts recorded after the checkout dart")]
    DartsAfterCheckout,
    #[error("it is player {expected}'s turn, not player {actual}'s")]
    NotPlayersTurn { expected: PlayerId, actual: PlayerId },
    #[error("player {0} is not part of this leg")]
    UnknownPlayer(PlayerId),
    #[error("leg is already finished")]
    LegFinished,
    #[error("match is already completed")]
    MatchCompleted,
    #[error("a match needs at least one player")]
    NoPlayers,
    #[error("player {0} appears twice in the rotation")]
    DuplicatePlayer(PlayerId),
    #[error("invalid match settings: {0}")]
    InvalidSettings(String),
}

impl ScoringError {
    /// Errors caused by the match being in the wrong state rather than bad input
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ScoringError::NotPlayersTurn { .. }
                | ScoringError::LegFinished
                | ScoringError::MatchCompleted
        )
    }
}

/// A single dart. Segment 0 is a recorded miss.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dart {
    pub segment: u8,
    pub multiplier: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Dart {
    pub fn new(segment: u8, multiplier: u8) -> Result<Self, ScoringError> {
        Self {
            segment,
            multiplier,
            x: None,
            y: None,
        }
        .validated()
    }

    pub fn miss() -> Self {
        Self {
            segment: 0,
            multiplier: 0,
            x: None,
            y: None,
        }
    }

    pub fn single(segment: u8) -> Self {
        Self::unchecked(segment, 1)
    }

    pub fn double(segment: u8) -> Self {
        Self::unchecked(segment, 2)
    }

    pub fn treble(segment: u8) -> Self {
        Self::unchecked(segment, 3)
    }

    pub fn bullseye() -> Self {
        Self::unchecked(BULL, 2)
    }

    fn unchecked(segment: u8, multiplier: u8) -> Self {
        Self {
            segment,
            multiplier,
            x: None,
            y: None,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Checks the segment/ring combination and normalizes misses to multiplier 0
    pub fn validated(self) -> Result<Self, ScoringError> {
        match (self.segment, self.multiplier) {
            (0, _) => Ok(Self {
                multiplier: 0,
                ..self
            }),
            (1..=20, 1..=3) | (BULL, 1..=2) => Ok(self),
            (1..=20, _) | (BULL, _) => Err(ScoringError::InvalidMultiplier {
                segment: self.segment,
                multiplier: self.multiplier,
            }),
            (segment, _) => Err(ScoringError::InvalidSegment(segment)),
        }
    }

    pub fn score(&self) -> u32 {
        self.segment as u32 * self.multiplier as u32
    }

    pub fn is_miss(&self) -> bool {
        self.segment == 0
    }

    pub fn is_double(&self) -> bool {
        self.segment != 0 && self.multiplier == 2
    }

    pub fn is_treble(&self) -> bool {
        self.segment != 0 && self.multiplier == 3
    }

    /// Key used to group darts on the heatmap, e.g. "20-3"
    pub fn heatmap_key(&self) -> String {
        format!("{}-{}", self.segment, self.multiplier)
    }

    /// Short board notation: "T20", "D16", "S5", "BULL", "25", "MISS"
    pub fn label(&self) -> String {
        match (self.segment, self.multiplier) {
            (0, _) => "MISS".to_string(),
            (BULL, 2) => "BULL".to_string(),
            (BULL, _) => "25".to_string(),
            (segment, 3) => format!("T{}", segment),
            (segment, 2) => format!("D{}", segment),
            (segment, _) => format!("S{}", segment),
        }
    }
}

// Serialized with its derived score; the score is ignored on input
impl Serialize for Dart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let fields = 3 + self.x.is_some() as usize + self.y.is_some() as usize;
        let mut state = serializer.serialize_struct("Dart", fields)?;
        state.serialize_field("segment", &self.segment)?;
        state.serialize_field("multiplier", &self.multiplier)?;
        state.serialize_field("score", &self.score())?;
        if let Some(x) = self.x {
            state.serialize_field("x", &x)?;
        }
        if let Some(y) = self.y {
            state.serialize_field("y", &y)?;
        }
        state.end()
    }
}

/// Up to three darts thrown by one player in one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    darts: Vec<Dart>,
}

impl Visit {
    pub fn new(darts: Vec<Dart>) -> Result<Self, ScoringError> {
        if darts.is_empty() || darts.len() > MAX_DARTS_PER_VISIT {
            return Err(ScoringError::InvalidDartCount(darts.len()));
        }

        let darts = darts
            .into_iter()
            .map(Dart::validated)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { darts })
    }

    pub fn darts(&self) -> &[Dart] {
        &self.darts
    }

    pub fn len(&self) -> usize {
        self.darts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.darts.is_empty()
    }

    pub fn sum(&self) -> u32 {
        self.darts.iter().map(Dart::score).sum()
    }
}

/// Rules of an X01 match, stored as JSON on the match row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchSettings {
    #[validate(range(min = 2, max = 10001))]
    pub starting_score: u32,
    pub double_in: bool,
    pub double_out: bool,
    #[validate(range(min = 1, max = 50))]
    pub legs_to_win: u32,
    #[validate(range(min = 1, max = 50))]
    pub sets_to_win: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            starting_score: 501,
            double_in: false,
            double_out: true,
            legs_to_win: 3,
            sets_to_win: 1,
        }
    }
}

impl MatchSettings {
    pub fn checked(self) -> Result<Self, ScoringError> {
        self.validate()
            .map_err(|e| ScoringError::InvalidSettings(e.to_string()))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dart_json_carries_score() {
        let json = serde_json::to_value(Dart::treble(19)).unwrap();
        assert_eq!(json, serde_json::json!({"segment": 19, "multiplier": 3, "score": 57}));

        let parsed: Dart = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, Dart::treble(19));
    }

    #[test]
    fn test_dart_scores() {
        assert_eq!(Dart::treble(20).score(), 60);
        assert_eq!(Dart::bullseye().score(), 50);
        assert_eq!(Dart::new(25, 1).unwrap().score(), 25);
        assert_eq!(Dart::miss().score(), 0);
    }

    #[test]
    fn test_dart_validation() {
        assert_eq!(Dart::new(21, 1), Err(ScoringError::InvalidSegment(21)));
        assert_eq!(
            Dart::new(25, 3),
            Err(ScoringError::InvalidMultiplier {
                segment: 25,
                multiplier: 3
            })
        );
        assert!(Dart::new(20, 0).is_err());
        assert!(Dart::new(20, 4).is_err());

        let miss = Dart::new(0, 2).unwrap();
        assert_eq!(miss.multiplier, 0);
        assert!(!miss.is_double());
    }

    #[test]
    fn test_visit_dart_count() {
        assert_eq!(Visit::new(vec![]), Err(ScoringError::InvalidDartCount(0)));
        assert_eq!(
            Visit::new(vec![Dart::miss(); 4]),
            Err(ScoringError::InvalidDartCount(4))
        );

        let visit = Visit::new(vec![Dart::treble(20); 3]).unwrap();
        assert_eq!(visit.sum(), 180);
    }

    #[test]
    fn test_labels_and_keys() {
        assert_eq!(Dart::treble(19).label(), "T19");
        assert_eq!(Dart::bullseye().label(), "BULL");
        assert_eq!(Dart::single(25).label(), "25");
        assert_eq!(Dart::double(16).heatmap_key(), "16-2");
    }

    #[test]
    fn test_settings_validation() {
        assert!(MatchSettings::default().checked().is_ok());

        let settings = MatchSettings {
            legs_to_win: 0,
            ..MatchSettings::default()
        };
        assert!(matches!(
            settings.checked(),
            Err(ScoringError::InvalidSettings(_))
        ));
    }
}
