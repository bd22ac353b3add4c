use serde::{Deserialize, Serialize};

use super::types::{MatchSettings, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in_progress" => Some(MatchStatus::InProgress),
            "completed" => Some(MatchStatus::Completed),
            _ => None,
        }
    }
}

/// What the match needs to know about one of its legs
#[derive(Debug, Clone, PartialEq)]
pub struct LegSummary {
    pub set_number: u32,
    pub leg_number: u32,
    pub winner_id: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub sets_won: u32,
    /// Legs won in the set currently being played
    pub legs_won: u32,
    pub total_legs_won: u32,
}

/// Leg to create when the previous one has been won
#[derive(Debug, Clone, PartialEq)]
pub struct NextLeg {
    pub set_number: u32,
    pub leg_number: u32,
    pub starting_player: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProgress {
    pub status: MatchStatus,
    pub winner: Option<PlayerId>,
    pub current_set: u32,
    pub legs_played: u32,
    pub standings: Vec<PlayerStanding>,
    #[serde(skip)]
    pub next_leg: Option<NextLeg>,
}

impl MatchProgress {
    pub fn standing(&self, player_id: PlayerId) -> Option<&PlayerStanding> {
        self.standings.iter().find(|s| s.player_id == player_id)
    }
}

/// Derives match state from the legs played so far, in order.
///
/// A set goes to the first player reaching `legs_to_win` legs in it, the match
/// to the first reaching `sets_to_win` sets. The starting player rotates by one
/// position every leg.
pub fn evaluate_match(
    settings: &MatchSettings,
    rotation: &[PlayerId],
    legs: &[LegSummary],
) -> MatchProgress {
    let mut standings: Vec<PlayerStanding> = rotation
        .iter()
        .map(|&player_id| PlayerStanding {
            player_id,
            sets_won: 0,
            legs_won: 0,
            total_legs_won: 0,
        })
        .collect();

    let mut current_set = 1;
    let mut winner = None;
    let mut open_leg = false;

    for leg in legs {
        let Some(leg_winner) = leg.winner_id else {
            open_leg = true;
            continue;
        };
        let Some(idx) = standings.iter().position(|s| s.player_id == leg_winner) else {
            continue;
        };

        standings[idx].legs_won += 1;
        standings[idx].total_legs_won += 1;

        if standings[idx].legs_won >= settings.legs_to_win {
            standings[idx].sets_won += 1;
            if standings[idx].sets_won >= settings.sets_to_win {
                winner = Some(leg_winner);
                break;
            }
            standings.iter_mut().for_each(|s| s.legs_won = 0);
            current_set += 1;
        }
    }

    let status = match winner {
        Some(_) => MatchStatus::Completed,
        None => MatchStatus::InProgress,
    };

    let next_leg = match (status, open_leg, rotation.is_empty()) {
        (MatchStatus::InProgress, false, false) => Some(NextLeg {
            set_number: current_set,
            leg_number: legs.len() as u32 + 1,
            starting_player: rotation[legs.len() % rotation.len()],
        }),
        _ => None,
    };

    MatchProgress {
        status,
        winner,
        current_set,
        legs_played: legs.iter().filter(|l| l.winner_id.is_some()).count() as u32,
        standings,
        next_leg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn won(set_number: u32, leg_number: u32, winner: PlayerId) -> LegSummary {
        LegSummary {
            set_number,
            leg_number,
            winner_id: Some(winner),
        }
    }

    #[test]
    fn test_new_match_starts_first_leg() {
        let settings = MatchSettings::default();
        let progress = evaluate_match(&settings, &[10, 20], &[]);
        assert_eq!(progress.status, MatchStatus::InProgress);
        assert_eq!(
            progress.next_leg,
            Some(NextLeg {
                set_number: 1,
                leg_number: 1,
                starting_player: 10
            })
        );
    }

    #[test]
    fn test_open_leg_blocks_next_leg() {
        let settings = MatchSettings::default();
        let legs = vec![LegSummary {
            set_number: 1,
            leg_number: 1,
            winner_id: None,
        }];
        let progress = evaluate_match(&settings, &[10, 20], &legs);
        assert_eq!(progress.next_leg, None);
    }

    #[test]
    fn test_starting_player_rotates() {
        let settings = MatchSettings::default();
        let legs = vec![won(1, 1, 10)];
        let progress = evaluate_match(&settings, &[10, 20], &legs);
        assert_eq!(progress.next_leg.unwrap().starting_player, 20);
    }

    #[test]
    fn test_first_to_legs_wins_match() {
        let settings = MatchSettings {
            legs_to_win: 2,
            ..MatchSettings::default()
        };
        let legs = vec![won(1, 1, 10), won(1, 2, 20), won(1, 3, 10)];
        let progress = evaluate_match(&settings, &[10, 20], &legs);
        assert_eq!(progress.status, MatchStatus::Completed);
        assert_eq!(progress.winner, Some(10));
        assert_eq!(progress.next_leg, None);
        assert_eq!(progress.standing(10).unwrap().total_legs_won, 2);
    }

    #[test]
    fn test_sets_reset_leg_counts() {
        let settings = MatchSettings {
            legs_to_win: 2,
            sets_to_win: 2,
            ..MatchSettings::default()
        };
        let legs = vec![won(1, 1, 10), won(1, 2, 10), won(2, 3, 20)];
        let progress = evaluate_match(&settings, &[10, 20], &legs);

        assert_eq!(progress.status, MatchStatus::InProgress);
        assert_eq!(progress.current_set, 2);
        assert_eq!(progress.standing(10).unwrap().sets_won, 1);
        assert_eq!(progress.standing(10).unwrap().legs_won, 0);
        assert_eq!(progress.standing(20).unwrap().legs_won, 1);

        let next = progress.next_leg.unwrap();
        assert_eq!(next.set_number, 2);
        assert_eq!(next.leg_number, 4);
        assert_eq!(next.starting_player, 20);
    }
}
