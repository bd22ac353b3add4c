use serde::{Deserialize, Serialize};

/// Attempts and hits recorded against one drill target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResult {
    pub target: String,
    pub attempts: u32,
    pub hits: u32,
}

/// Running totals shared by every drill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillTally {
    pub rounds: u32,
    pub darts_thrown: u32,
    pub hits: u32,
    pub results: Vec<TargetResult>,
}

impl DrillTally {
    pub fn record_dart(&mut self, target: &str, hit: bool) {
        self.darts_thrown += 1;
        if hit {
            self.hits += 1;
        }

        let entry = match self.results.iter().position(|r| r.target == target) {
            Some(idx) => &mut self.results[idx],
            None => {
                self.results.push(TargetResult {
                    target: target.to_string(),
                    ..TargetResult::default()
                });
                let last = self.results.len() - 1;
                &mut self.results[last]
            }
        };

        entry.attempts += 1;
        if hit {
            entry.hits += 1;
        }
    }

    pub fn finish_round(&mut self) {
        self.rounds += 1;
    }

    /// Percentage of darts that hit their target
    pub fn hit_rate(&self) -> f64 {
        if self.darts_thrown == 0 {
            return 0.0;
        }
        self.hits as f64 / self.darts_thrown as f64 * 100.0
    }
}
