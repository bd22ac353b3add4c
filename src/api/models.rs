use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::{AchievementRow, Tenant};
use crate::scoring::{Dart, MatchSettings, PlayerId, ScoringError, Visit};
use crate::stats::{Achievement, PlayerStats};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCreated {
    pub tenant: Tenant,
    /// Only ever returned here
    pub api_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PlayerRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(max = 512))]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    #[validate(length(min = 1, max = 8))]
    pub player_ids: Vec<PlayerId>,
    /// Falls back to the tenant's default match settings
    #[validate(nested)]
    pub settings: Option<MatchSettings>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ThrowRequest {
    pub player_id: PlayerId,
    #[validate(length(min = 1, max = 3))]
    pub darts: Vec<Dart>,
}

impl ThrowRequest {
    pub fn visit(&self) -> Result<Visit, ScoringError> {
        Visit::new(self.darts.clone())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TrainingVisitRequest {
    #[validate(length(min = 1, max = 3))]
    pub darts: Vec<Dart>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartTrainingRequest {
    pub player_id: PlayerId,
    #[validate(length(min = 1))]
    pub mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingListParams {
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BugReportRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsResponse {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub stats: PlayerStats,
    pub average: f64,
    pub first_nine_average: f64,
    pub checkout_percentage: f64,
}

impl PlayerStatsResponse {
    pub fn new(player_id: PlayerId, stats: PlayerStats) -> Self {
        Self {
            player_id,
            average: stats.average(),
            first_nine_average: stats.first_nine_average(),
            checkout_percentage: stats.checkout_percentage(),
            stats,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementView {
    pub code: String,
    pub title: Option<&'static str>,
    pub unlocked_at: NaiveDateTime,
}

impl From<AchievementRow> for AchievementView {
    fn from(row: AchievementRow) -> Self {
        Self {
            title: Achievement::from_code(&row.code).map(|a| a.title()),
            code: row.code,
            unlocked_at: row.unlocked_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub score: u32,
    pub finishable: bool,
    pub route: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
