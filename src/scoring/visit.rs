use serde::{Deserialize, Serialize};

use super::types::{Dart, MatchSettings, ScoringError, Visit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitResult {
    Scored,
    Bust,
    Checkout,
}

/// Result of applying one visit to a player's remaining score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitOutcome {
    pub darts: Vec<Dart>,
    /// Raw sum of every dart in the visit
    pub visit_sum: u32,
    /// Points that actually came off the remaining score
    pub scored: u32,
    pub remaining_before: u32,
    pub remaining_after: u32,
    pub result: VisitResult,
    /// Whether the player has opened (double in) after this visit
    pub opened: bool,
}

impl VisitOutcome {
    pub fn is_bust(&self) -> bool {
        self.result == VisitResult::Bust
    }

    pub fn is_checkout(&self) -> bool {
        self.result == VisitResult::Checkout
    }
}

/// Applies the X01 rules to one visit.
///
/// Darts are evaluated in order. A dart that reaches zero ends the visit, so
/// any dart after it is rejected. A bust discards the whole visit.
pub fn evaluate_visit(
    remaining: u32,
    opened: bool,
    visit: &Visit,
    settings: &MatchSettings,
) -> Result<VisitOutcome, ScoringError> {
    let mut running = remaining as i64;
    let mut is_open = opened || !settings.double_in;
    let mut result = VisitResult::Scored;

    for dart in visit.darts() {
        if result == VisitResult::Checkout {
            return Err(ScoringError::DartsAfterCheckout);
        }
        if result == VisitResult::Bust {
            // bust ends the turn, trailing darts carry no weight
            break;
        }

        if !is_open {
            if !dart.is_double() {
                continue;
            }
            is_open = true;
        }

        running -= dart.score() as i64;
        result = classify(running, dart, settings.double_out);
    }

    let outcome = match result {
        VisitResult::Bust => VisitOutcome {
            darts: visit.darts().to_vec(),
            visit_sum: visit.sum(),
            scored: 0,
            remaining_before: remaining,
            remaining_after: remaining,
            result,
            opened,
        },
        _ => VisitOutcome {
            darts: visit.darts().to_vec(),
            visit_sum: visit.sum(),
            scored: remaining - running as u32,
            remaining_before: remaining,
            remaining_after: running as u32,
            result,
            opened: is_open,
        },
    };

    Ok(outcome)
}

fn classify(running: i64, dart: &Dart, double_out: bool) -> VisitResult {
    match running {
        0 if !double_out || dart.is_double() => VisitResult::Checkout,
        0 => VisitResult::Bust,
        r if r < 0 => VisitResult::Bust,
        1 if double_out => VisitResult::Bust,
        _ => VisitResult::Scored,
    }
}
