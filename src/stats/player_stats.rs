use serde::{Deserialize, Serialize};

use crate::scoring::{three_dart_average, VisitRecord};

const NINE_DART_START: u32 = 501;
const NINE_DARTS: u32 = 9;
const FIRST_NINE_VISITS: u32 = 3;

/// Score bucket of a single visit, by raw visit sum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Below60,
    SixtyPlus,
    TonPlus,
    TonFortyPlus,
    TonSeventyOnePlus,
    Maximum,
}

impl ScoreBand {
    pub fn classify(visit_sum: u32) -> Self {
        match visit_sum {
            180 => ScoreBand::Maximum,
            171..=179 => ScoreBand::TonSeventyOnePlus,
            140..=170 => ScoreBand::TonFortyPlus,
            100..=139 => ScoreBand::TonPlus,
            60..=99 => ScoreBand::SixtyPlus,
            _ => ScoreBand::Below60,
        }
    }
}

/// Rolling per-player aggregate. Every field can be rebuilt by replaying
/// throws, legs, matches and training sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub legs_played: u32,
    pub legs_won: u32,
    pub total_darts: u32,
    pub total_points: u32,
    pub first_nine_points: u32,
    pub first_nine_darts: u32,
    pub checkout_attempts: u32,
    pub checkouts: u32,
    pub highest_checkout: u32,
    pub best_leg: Option<u32>,
    pub scores_60_plus: u32,
    pub scores_100_plus: u32,
    pub scores_140_plus: u32,
    pub scores_171_plus: u32,
    pub total_180s: u32,
    pub nine_dart_finishes: u32,
    pub training_sessions_completed: u32,
}

impl PlayerStats {
    pub fn record_visit(&mut self, visit: &VisitRecord) {
        let outcome = &visit.outcome;

        self.total_darts += visit.darts_thrown;
        self.total_points += outcome.scored;

        if visit.player_visit <= FIRST_NINE_VISITS {
            self.first_nine_points += outcome.scored;
            self.first_nine_darts += visit.darts_thrown;
        }

        if visit.checkout_attempt {
            self.checkout_attempts += 1;
        }
        if outcome.is_checkout() {
            self.checkouts += 1;
            self.highest_checkout = self.highest_checkout.max(outcome.remaining_before);
        }

        match ScoreBand::classify(outcome.visit_sum) {
            ScoreBand::Maximum => self.total_180s += 1,
            ScoreBand::TonSeventyOnePlus => self.scores_171_plus += 1,
            ScoreBand::TonFortyPlus => self.scores_140_plus += 1,
            ScoreBand::TonPlus => self.scores_100_plus += 1,
            ScoreBand::SixtyPlus => self.scores_60_plus += 1,
            ScoreBand::Below60 => {}
        }
    }

    /// Called once per finished leg for every player in it
    pub fn record_leg(&mut self, won: bool, darts: u32, starting_score: u32) {
        self.legs_played += 1;
        if !won {
            return;
        }

        self.legs_won += 1;
        self.best_leg = Some(self.best_leg.map_or(darts, |best| best.min(darts)));
        if darts == NINE_DARTS && starting_score == NINE_DART_START {
            self.nine_dart_finishes += 1;
        }
    }

    /// Called once per completed match for every player in it
    pub fn record_match(&mut self, won: bool) {
        self.games_played += 1;
        if won {
            self.games_won += 1;
        }
    }

    pub fn record_training_completed(&mut self) {
        self.training_sessions_completed += 1;
    }

    pub fn average(&self) -> f64 {
        three_dart_average(self.total_points, self.total_darts)
    }

    pub fn first_nine_average(&self) -> f64 {
        three_dart_average(self.first_nine_points, self.first_nine_darts)
    }

    pub fn checkout_percentage(&self) -> f64 {
        if self.checkout_attempts == 0 {
            return 0.0;
        }
        self.checkouts as f64 / self.checkout_attempts as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Dart, LegState, MatchSettings, Visit};

    fn visit(darts: &[Dart]) -> Visit {
        Visit::new(darts.to_vec()).unwrap()
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::classify(59), ScoreBand::Below60);
        assert_eq!(ScoreBand::classify(60), ScoreBand::SixtyPlus);
        assert_eq!(ScoreBand::classify(100), ScoreBand::TonPlus);
        assert_eq!(ScoreBand::classify(140), ScoreBand::TonFortyPlus);
        assert_eq!(ScoreBand::classify(170), ScoreBand::TonFortyPlus);
        assert_eq!(ScoreBand::classify(177), ScoreBand::TonSeventyOnePlus);
        assert_eq!(ScoreBand::classify(180), ScoreBand::Maximum);
    }

    #[test]
    fn test_maximum_counts_180() {
        let mut leg = LegState::new(MatchSettings::default(), &[1, 2], 1).unwrap();
        let record = leg.apply_visit(1, &visit(&[Dart::treble(20); 3])).unwrap();

        let mut stats = PlayerStats::default();
        stats.record_visit(&record);

        assert_eq!(stats.total_180s, 1);
        assert_eq!(stats.total_points, 180);
        assert_eq!(stats.total_darts, 3);
        assert!((stats.average() - 180.0).abs() < f64::EPSILON);
        assert!((stats.first_nine_average() - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nine_darter_leg() {
        let settings = MatchSettings::default();
        let visits = vec![
            (1, visit(&[Dart::treble(20); 3])),
            (2, visit(&[Dart::miss(); 3])),
            (1, visit(&[Dart::treble(20); 3])),
            (2, visit(&[Dart::miss(); 3])),
            (1, visit(&[Dart::treble(20), Dart::treble(19), Dart::double(12)])),
        ];
        let (leg, records) = LegState::replay(settings, &[1, 2], 1, visits).unwrap();

        let mut stats = PlayerStats::default();
        for record in records.iter().filter(|r| r.player_id == 1) {
            stats.record_visit(record);
        }
        let darts = leg.score_for(1).unwrap().darts_thrown;
        stats.record_leg(leg.winner() == Some(1), darts, 501);

        assert_eq!(stats.total_180s, 2);
        assert_eq!(stats.scores_140_plus, 1);
        assert_eq!(stats.checkouts, 1);
        assert_eq!(stats.checkout_attempts, 1);
        assert_eq!(stats.highest_checkout, 141);
        assert_eq!(stats.best_leg, Some(9));
        assert_eq!(stats.nine_dart_finishes, 1);
        assert!((stats.checkout_percentage() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bust_scores_nothing_but_is_classified() {
        let settings = MatchSettings {
            starting_score: 100,
            ..MatchSettings::default()
        };
        let mut leg = LegState::new(settings, &[1], 1).unwrap();
        let record = leg.apply_visit(1, &visit(&[Dart::treble(20); 3])).unwrap();
        assert!(record.outcome.is_bust());

        let mut stats = PlayerStats::default();
        stats.record_visit(&record);
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.total_darts, 3);
        assert_eq!(stats.total_180s, 1);
        assert_eq!(stats.checkout_attempts, 1);
    }

    #[test]
    fn test_match_and_leg_counters() {
        let mut stats = PlayerStats::default();
        stats.record_leg(true, 18, 501);
        stats.record_leg(true, 15, 501);
        stats.record_leg(false, 21, 501);
        stats.record_match(true);
        stats.record_match(false);

        assert_eq!(stats.legs_played, 3);
        assert_eq!(stats.legs_won, 2);
        assert_eq!(stats.best_leg, Some(15));
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.nine_dart_finishes, 0);
    }
}
