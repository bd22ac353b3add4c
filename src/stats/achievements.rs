use serde::Serialize;

use super::player_stats::PlayerStats;

const TON_CHECKOUT: u32 = 100;
const BIG_FISH: u32 = 170;
const TRAINING_REGULAR_SESSIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    #[serde(rename = "first_180")]
    First180,
    NineDarter,
    TonPlusCheckout,
    BigFish,
    FirstLegWon,
    FirstMatchWon,
    TrainingRegular,
}

impl Achievement {
    pub const ALL: [Achievement; 7] = [
        Achievement::First180,
        Achievement::NineDarter,
        Achievement::TonPlusCheckout,
        Achievement::BigFish,
        Achievement::FirstLegWon,
        Achievement::FirstMatchWon,
        Achievement::TrainingRegular,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Achievement::First180 => "first_180",
            Achievement::NineDarter => "nine_darter",
            Achievement::TonPlusCheckout => "ton_plus_checkout",
            Achievement::BigFish => "big_fish",
            Achievement::FirstLegWon => "first_leg_won",
            Achievement::FirstMatchWon => "first_match_won",
            Achievement::TrainingRegular => "training_regular",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::First180 => "Maximum!",
            Achievement::NineDarter => "Nine-dart finish",
            Achievement::TonPlusCheckout => "Ton-plus checkout",
            Achievement::BigFish => "The big fish (170)",
            Achievement::FirstLegWon => "First leg won",
            Achievement::FirstMatchWon => "First match won",
            Achievement::TrainingRegular => "Ten drills completed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }

    fn is_earned(&self, stats: &PlayerStats) -> bool {
        match self {
            Achievement::First180 => stats.total_180s > 0,
            Achievement::NineDarter => stats.nine_dart_finishes > 0,
            Achievement::TonPlusCheckout => stats.highest_checkout >= TON_CHECKOUT,
            Achievement::BigFish => stats.highest_checkout >= BIG_FISH,
            Achievement::FirstLegWon => stats.legs_won > 0,
            Achievement::FirstMatchWon => stats.games_won > 0,
            Achievement::TrainingRegular => {
                stats.training_sessions_completed >= TRAINING_REGULAR_SESSIONS
            }
        }
    }
}

/// Every achievement the statistics currently qualify for
pub fn earned(stats: &PlayerStats) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| a.is_earned(stats))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_earned_initially() {
        assert!(earned(&PlayerStats::default()).is_empty());
    }

    #[test]
    fn test_big_fish_implies_ton_plus() {
        let stats = PlayerStats {
            highest_checkout: 170,
            checkouts: 1,
            legs_won: 1,
            ..PlayerStats::default()
        };
        let unlocked = earned(&stats);
        assert_eq!(
            unlocked,
            vec![
                Achievement::TonPlusCheckout,
                Achievement::BigFish,
                Achievement::FirstLegWon
            ]
        );
    }

    #[test]
    fn test_codes_round_trip() {
        for achievement in Achievement::ALL {
            assert_eq!(Achievement::from_code(achievement.code()), Some(achievement));
        }
        assert_eq!(Achievement::from_code("unknown"), None);
    }
}
