use serde::{Deserialize, Serialize};

use super::tally::DrillTally;
use crate::scoring::{evaluate_visit, Dart, MatchSettings, ScoringError, Visit};

const LAST_NUMBER: u8 = 20;
const BULL: u8 = 25;

/// Doubles or trebles practice: work through 1-20 on one ring, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingDrill {
    pub multiplier: u8,
    pub target: u8,
    pub cleared: u32,
    pub max_rounds: u32,
    pub finished: bool,
    pub tally: DrillTally,
}

impl RingDrill {
    pub fn new(multiplier: u8, max_rounds: u32) -> Self {
        Self {
            multiplier,
            target: 1,
            cleared: 0,
            max_rounds,
            finished: false,
            tally: DrillTally::default(),
        }
    }

    pub fn target_label(&self) -> String {
        let ring = if self.multiplier == 3 { "T" } else { "D" };
        format!("{}{}", ring, self.target)
    }

    pub fn apply(&mut self, visit: &Visit) {
        for dart in visit.darts() {
            if self.finished {
                break;
            }
            let label = self.target_label();
            let hit = dart.segment == self.target && dart.multiplier == self.multiplier;
            self.tally.record_dart(&label, hit);

            if hit {
                self.cleared += 1;
                if self.target == LAST_NUMBER {
                    self.finished = true;
                } else {
                    self.target += 1;
                }
            }
        }

        self.tally.finish_round();
        if self.tally.rounds >= self.max_rounds {
            self.finished = true;
        }
    }
}

/// 1 through 20 then the bull, any ring counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AroundTheClock {
    pub target: u8,
    pub cleared: u32,
    pub max_rounds: u32,
    pub finished: bool,
    pub tally: DrillTally,
}

impl AroundTheClock {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            target: 1,
            cleared: 0,
            max_rounds,
            finished: false,
            tally: DrillTally::default(),
        }
    }

    pub fn target_label(&self) -> String {
        if self.target == BULL {
            "BULL".to_string()
        } else {
            self.target.to_string()
        }
    }

    pub fn apply(&mut self, visit: &Visit) {
        for dart in visit.darts() {
            if self.finished {
                break;
            }
            let label = self.target_label();
            let hit = dart.segment == self.target;
            self.tally.record_dart(&label, hit);

            if hit {
                self.cleared += 1;
                match self.target {
                    BULL => self.finished = true,
                    LAST_NUMBER => self.target = BULL,
                    _ => self.target += 1,
                }
            }
        }

        self.tally.finish_round();
        if self.tally.rounds >= self.max_rounds {
            self.finished = true;
        }
    }
}

/// Check out the target within three visits; every success raises it by one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLadder {
    pub target: u32,
    pub remaining: u32,
    pub visits_in_attempt: u32,
    pub attempts: u32,
    pub successes: u32,
    pub highest_checkout: u32,
    pub max_attempts: u32,
    pub finished: bool,
    pub tally: DrillTally,
}

pub const VISITS_PER_ATTEMPT: u32 = 3;

impl CheckoutLadder {
    pub fn new(start: u32, max_attempts: u32) -> Self {
        Self {
            target: start,
            remaining: start,
            visits_in_attempt: 0,
            attempts: 0,
            successes: 0,
            highest_checkout: 0,
            max_attempts,
            finished: false,
            tally: DrillTally::default(),
        }
    }

    /// Same bust rules as a match leg: double out, zero on a non-double busts
    pub fn apply(&mut self, visit: &Visit) -> Result<(), ScoringError> {
        let rules = MatchSettings {
            starting_score: self.target,
            double_in: false,
            double_out: true,
            ..MatchSettings::default()
        };
        let outcome = evaluate_visit(self.remaining, true, visit, &rules)?;

        let label = self.target.to_string();
        let last = visit.len() - 1;
        for idx in 0..visit.len() {
            self.tally
                .record_dart(&label, outcome.is_checkout() && idx == last);
        }
        self.tally.finish_round();
        self.visits_in_attempt += 1;

        if outcome.is_checkout() {
            self.successes += 1;
            self.highest_checkout = self.highest_checkout.max(self.target);
            self.target += 1;
            self.end_attempt();
        } else {
            self.remaining = outcome.remaining_after;
            if self.visits_in_attempt >= VISITS_PER_ATTEMPT {
                self.end_attempt();
            }
        }

        Ok(())
    }

    fn end_attempt(&mut self) {
        self.attempts += 1;
        self.visits_in_attempt = 0;
        self.remaining = self.target;
        if self.attempts >= self.max_attempts {
            self.finished = true;
        }
    }
}

pub const BOBS_27_START: i32 = 27;
const BOBS_27_ROUNDS: usize = 21;

/// Bob's 27: one round per double, hits add the double's value, a blank round subtracts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bobs27 {
    pub score: i32,
    pub round: usize,
    pub finished: bool,
    pub tally: DrillTally,
}

impl Default for Bobs27 {
    fn default() -> Self {
        Self::new()
    }
}

impl Bobs27 {
    pub fn new() -> Self {
        Self {
            score: BOBS_27_START,
            round: 0,
            finished: false,
            tally: DrillTally::default(),
        }
    }

    pub fn target(&self) -> u8 {
        if self.round < BOBS_27_ROUNDS - 1 {
            self.round as u8 + 1
        } else {
            BULL
        }
    }

    pub fn apply(&mut self, visit: &Visit) {
        let target = self.target();
        let label = Dart::double(target).label();
        let value = target as i32 * 2;

        let mut hits = 0;
        for dart in visit.darts() {
            let hit = dart.segment == target && dart.is_double();
            self.tally.record_dart(&label, hit);
            if hit {
                hits += 1;
            }
        }

        self.score += if hits > 0 { hits * value } else { -value };
        self.round += 1;
        self.tally.finish_round();

        if self.score <= 0 || self.round >= BOBS_27_ROUNDS {
            self.finished = true;
        }
    }
}

/// Fixed number of visits at a chosen number, scored on points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDrill {
    pub target: u8,
    pub total_points: u32,
    pub best_visit: u32,
    pub max_rounds: u32,
    pub finished: bool,
    pub tally: DrillTally,
}

impl ScoreDrill {
    pub fn new(target: u8, max_rounds: u32) -> Self {
        Self {
            target,
            total_points: 0,
            best_visit: 0,
            max_rounds,
            finished: false,
            tally: DrillTally::default(),
        }
    }

    pub fn average(&self) -> f64 {
        crate::scoring::three_dart_average(self.total_points, self.tally.darts_thrown)
    }

    pub fn apply(&mut self, visit: &Visit) {
        let label = self.target.to_string();
        for dart in visit.darts() {
            self.tally.record_dart(&label, dart.segment == self.target);
        }

        let points = visit.sum();
        self.total_points += points;
        self.best_visit = self.best_visit.max(points);
        self.tally.finish_round();

        if self.tally.rounds >= self.max_rounds {
            self.finished = true;
        }
    }
}
