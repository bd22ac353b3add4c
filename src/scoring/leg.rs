use serde::{Deserialize, Serialize};

use super::checkout::is_finishable;
use super::types::{MatchSettings, PlayerId, ScoringError, Visit};
use super::visit::{evaluate_visit, VisitOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegStatus {
    InProgress,
    Won,
}

/// One player's running position inside a leg
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLegScore {
    pub player_id: PlayerId,
    pub remaining: u32,
    pub opened: bool,
    pub darts_thrown: u32,
    pub points_scored: u32,
    pub visits: u32,
}

impl PlayerLegScore {
    fn new(player_id: PlayerId, settings: &MatchSettings) -> Self {
        Self {
            player_id,
            remaining: settings.starting_score,
            opened: !settings.double_in,
            darts_thrown: 0,
            points_scored: 0,
            visits: 0,
        }
    }

    /// Three-dart average for the leg so far
    pub fn average(&self) -> f64 {
        three_dart_average(self.points_scored, self.darts_thrown)
    }
}

pub fn three_dart_average(points: u32, darts: u32) -> f64 {
    if darts == 0 {
        return 0.0;
    }
    points as f64 / darts as f64 * 3.0
}

/// A visit after it has been applied to a leg
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub visit_number: u32,
    pub player_id: PlayerId,
    /// 1-based count of this player's visits in the leg
    pub player_visit: u32,
    pub outcome: VisitOutcome,
    pub checkout_attempt: bool,
    pub darts_thrown: u32,
    /// Darts the player has thrown in the leg including this visit
    pub leg_darts: u32,
    /// Running three-dart average after the visit
    pub average: f64,
}

/// Turn-based X01 leg: players alternate in a fixed rotation until one checks out
#[derive(Debug, Clone)]
pub struct LegState {
    settings: MatchSettings,
    scores: Vec<PlayerLegScore>,
    turn: usize,
    next_visit_number: u32,
    winner: Option<PlayerId>,
}

impl LegState {
    pub fn new(
        settings: MatchSettings,
        rotation: &[PlayerId],
        starting_player: PlayerId,
    ) -> Result<Self, ScoringError> {
        if rotation.is_empty() {
            return Err(ScoringError::NoPlayers);
        }
        for (idx, player) in rotation.iter().enumerate() {
            if rotation[..idx].contains(player) {
                return Err(ScoringError::DuplicatePlayer(*player));
            }
        }

        let turn = rotation
            .iter()
            .position(|&p| p == starting_player)
            .ok_or(ScoringError::UnknownPlayer(starting_player))?;

        let scores = rotation
            .iter()
            .map(|&p| PlayerLegScore::new(p, &settings))
            .collect();

        Ok(Self {
            settings,
            scores,
            turn,
            next_visit_number: 1,
            winner: None,
        })
    }

    /// Rebuilds a leg from its stored visits, in visit order
    pub fn replay<I>(
        settings: MatchSettings,
        rotation: &[PlayerId],
        starting_player: PlayerId,
        visits: I,
    ) -> Result<(Self, Vec<VisitRecord>), ScoringError>
    where
        I: IntoIterator<Item = (PlayerId, Visit)>,
    {
        let mut leg = Self::new(settings, rotation, starting_player)?;
        let records = visits
            .into_iter()
            .map(|(player_id, visit)| leg.apply_visit(player_id, &visit))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((leg, records))
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn status(&self) -> LegStatus {
        match self.winner {
            Some(_) => LegStatus::Won,
            None => LegStatus::InProgress,
        }
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn scores(&self) -> &[PlayerLegScore] {
        &self.scores
    }

    pub fn score_for(&self, player_id: PlayerId) -> Option<&PlayerLegScore> {
        self.scores.iter().find(|s| s.player_id == player_id)
    }

    /// Player whose turn it is, `None` once the leg is won
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.winner {
            Some(_) => None,
            None => Some(self.scores[self.turn].player_id),
        }
    }

    pub fn next_visit_number(&self) -> u32 {
        self.next_visit_number
    }

    pub fn apply_visit(
        &mut self,
        player_id: PlayerId,
        visit: &Visit,
    ) -> Result<VisitRecord, ScoringError> {
        if self.winner.is_some() {
            return Err(ScoringError::LegFinished);
        }
        if self.score_for(player_id).is_none() {
            return Err(ScoringError::UnknownPlayer(player_id));
        }

        let expected = self.scores[self.turn].player_id;
        if expected != player_id {
            return Err(ScoringError::NotPlayersTurn {
                expected,
                actual: player_id,
            });
        }

        let score = &mut self.scores[self.turn];
        let checkout_attempt =
            score.opened && is_finishable(score.remaining, self.settings.double_out);
        let outcome = evaluate_visit(score.remaining, score.opened, visit, &self.settings)?;

        score.remaining = outcome.remaining_after;
        score.opened = outcome.opened;
        score.darts_thrown += visit.len() as u32;
        score.points_scored += outcome.scored;
        score.visits += 1;

        let record = VisitRecord {
            visit_number: self.next_visit_number,
            player_id,
            player_visit: score.visits,
            checkout_attempt,
            darts_thrown: visit.len() as u32,
            leg_darts: score.darts_thrown,
            average: score.average(),
            outcome,
        };

        self.next_visit_number += 1;
        if record.outcome.is_checkout() {
            self.winner = Some(player_id);
        } else {
            self.turn = (self.turn + 1) % self.scores.len();
        }

        Ok(record)
    }
}
