use std::cmp::Reverse;
use std::sync::LazyLock;

use super::types::{Dart, BULL};

/// Highest score that can be finished in three darts on a double
pub const MAX_DOUBLE_OUT_CHECKOUT: u32 = 170;
/// Highest score that can be finished in three darts on any dart
pub const MAX_SINGLE_OUT_CHECKOUT: u32 = 180;

// Doubles players prefer to finish on, best first
const DOUBLE_PREFERENCE: [u8; 21] = [
    20, 16, 8, 10, 18, 12, 4, 25, 14, 6, 2, 19, 17, 15, 13, 11, 9, 7, 5, 3, 1,
];

/// Every scoring dart on the board, highest value first
fn scoring_darts() -> Vec<Dart> {
    let mut darts: Vec<Dart> = (1..=20u8)
        .flat_map(|segment| [Dart::single(segment), Dart::double(segment), Dart::treble(segment)])
        .chain([Dart::single(BULL), Dart::bullseye()])
        .collect();

    darts.sort_by_key(|d| (Reverse(d.score()), d.multiplier));
    darts
}

fn finishing_rank(dart: &Dart, double_out: bool) -> Option<usize> {
    if dart.is_double() {
        return DOUBLE_PREFERENCE.iter().position(|&s| s == dart.segment);
    }
    if double_out {
        return None;
    }
    Some(DOUBLE_PREFERENCE.len() + (60 - dart.score()) as usize)
}

/// Suggests the finishing route with the fewest darts for a remaining score.
///
/// Among routes of equal length the preferred finishing double wins, then the
/// highest first dart, then the lower ring.
pub fn suggest_checkout(remaining: u32, double_out: bool) -> Option<Vec<Dart>> {
    let max = if double_out {
        MAX_DOUBLE_OUT_CHECKOUT
    } else {
        MAX_SINGLE_OUT_CHECKOUT
    };
    if remaining == 0 || remaining > max {
        return None;
    }

    let board = scoring_darts();
    let finishers: Vec<(usize, Dart)> = board
        .iter()
        .filter_map(|d| finishing_rank(d, double_out).map(|rank| (rank, *d)))
        .collect();

    let mut best: Option<(RouteKey, Vec<Dart>)> = None;

    for &(rank, finisher) in &finishers {
        if finisher.score() == remaining {
            consider(&mut best, (rank, Reverse(0), 0), vec![finisher]);
        }
    }
    if best.is_some() {
        return best.map(|(_, route)| route);
    }

    for &(rank, finisher) in &finishers {
        for setup in &board {
            if setup.score() + finisher.score() == remaining {
                consider(
                    &mut best,
                    (rank, Reverse(setup.score()), setup.multiplier),
                    vec![*setup, finisher],
                );
            }
        }
    }
    if best.is_some() {
        return best.map(|(_, route)| route);
    }

    for &(rank, finisher) in &finishers {
        for first in &board {
            for second in &board {
                if first.score() + second.score() + finisher.score() == remaining {
                    consider(
                        &mut best,
                        (rank, Reverse(first.score()), first.multiplier),
                        vec![*first, *second, finisher],
                    );
                }
            }
        }
    }

    best.map(|(_, route)| route)
}

type RouteKey = (usize, Reverse<u32>, u8);

fn consider(best: &mut Option<(RouteKey, Vec<Dart>)>, key: RouteKey, route: Vec<Dart>) {
    if best.as_ref().is_none_or(|(k, _)| key < *k) {
        *best = Some((key, route));
    }
}

const TABLE_SIZE: usize = MAX_SINGLE_OUT_CHECKOUT as usize + 1;

static DOUBLE_OUT_FINISHES: LazyLock<[bool; TABLE_SIZE]> = LazyLock::new(|| finish_table(true));
static SINGLE_OUT_FINISHES: LazyLock<[bool; TABLE_SIZE]> = LazyLock::new(|| finish_table(false));

/// Scores reachable with up to two setup darts followed by a finishing dart
fn finish_table(double_out: bool) -> [bool; TABLE_SIZE] {
    let board = scoring_darts();

    let mut setups = [false; TABLE_SIZE];
    setups[0] = true;
    for first in &board {
        setups[first.score() as usize] = true;
        for second in &board {
            setups[(first.score() + second.score()) as usize] = true;
        }
    }

    let mut table = [false; TABLE_SIZE];
    for finisher in board.iter().filter(|d| finishing_rank(d, double_out).is_some()) {
        for (setup, _) in setups.iter().enumerate().filter(|(_, reachable)| **reachable) {
            let total = setup + finisher.score() as usize;
            if total < TABLE_SIZE {
                table[total] = true;
            }
        }
    }
    table
}

/// Whether the score can be finished within one visit
pub fn is_finishable(remaining: u32, double_out: bool) -> bool {
    let table: &[bool; TABLE_SIZE] = if double_out {
        &DOUBLE_OUT_FINISHES
    } else {
        &SINGLE_OUT_FINISHES
    };
    table.get(remaining as usize).copied().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(route: &[Dart]) -> Vec<String> {
        route.iter().map(Dart::label).collect()
    }

    #[test]
    fn test_classic_routes() {
        assert_eq!(labels(&suggest_checkout(170, true).unwrap()), ["T20", "T20", "BULL"]);
        assert_eq!(labels(&suggest_checkout(100, true).unwrap()), ["T20", "D20"]);
        assert_eq!(labels(&suggest_checkout(60, true).unwrap()), ["S20", "D20"]);
        assert_eq!(labels(&suggest_checkout(40, true).unwrap()), ["D20"]);
        assert_eq!(labels(&suggest_checkout(50, true).unwrap()), ["BULL"]);
    }

    #[test]
    fn test_bogey_numbers() {
        for bogey in [169, 168, 166, 165, 163, 162, 159] {
            assert!(!is_finishable(bogey, true), "{} should not be finishable", bogey);
        }
        assert!(!is_finishable(171, true));
        assert!(!is_finishable(1, true));
        assert!(is_finishable(2, true));
        assert!(is_finishable(3, true));
    }

    #[test]
    fn test_routes_add_up() {
        for remaining in 2..=170 {
            if let Some(route) = suggest_checkout(remaining, true) {
                let total: u32 = route.iter().map(Dart::score).sum();
                assert_eq!(total, remaining);
                assert!(route.last().unwrap().is_double());
            }
        }
    }

    #[test]
    fn test_finish_table_matches_routes() {
        for double_out in [true, false] {
            for remaining in 0..=200 {
                assert_eq!(
                    is_finishable(remaining, double_out),
                    suggest_checkout(remaining, double_out).is_some(),
                    "{} (double out: {})",
                    remaining,
                    double_out
                );
            }
        }
    }

    #[test]
    fn test_single_out_routes() {
        assert_eq!(labels(&suggest_checkout(180, false).unwrap()), ["T20", "T20", "T20"]);
        assert!(is_finishable(1, false));
        assert!(!is_finishable(179, false));
    }
}
