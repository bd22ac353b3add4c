use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::scoring::{Dart, MatchSettings, MatchStatus, PlayerId};
use crate::training::{TrainingMode, TrainingState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub tenant_id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub id: i64,
    pub tenant_id: i64,
    pub game_type: String,
    pub status: MatchStatus,
    pub settings: MatchSettings,
    pub winner_id: Option<PlayerId>,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPlayer {
    pub match_id: i64,
    pub player_id: PlayerId,
    pub position: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegRow {
    pub id: i64,
    pub match_id: i64,
    pub set_number: u32,
    pub leg_number: u32,
    pub starting_player_id: PlayerId,
    pub winner_id: Option<PlayerId>,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

/// One stored visit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrowRow {
    pub id: i64,
    pub leg_id: i64,
    pub player_id: PlayerId,
    pub visit_number: u32,
    pub darts: Vec<Dart>,
    /// Raw visit sum, busts included
    pub score: u32,
    pub remaining_before: u32,
    pub remaining_after: u32,
    pub is_bust: bool,
    pub is_checkout: bool,
    pub checkout_attempt: bool,
    pub darts_thrown: u32,
    pub average: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSessionRow {
    pub id: i64,
    pub tenant_id: i64,
    pub player_id: PlayerId,
    pub mode: TrainingMode,
    pub state: TrainingState,
    pub darts: Vec<Dart>,
    pub score: i64,
    pub hits: u32,
    pub darts_thrown: u32,
    pub hit_rate: f64,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

impl TrainingSessionRow {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRow {
    pub player_id: PlayerId,
    pub code: String,
    pub unlocked_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    pub id: i64,
    pub tenant_id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Per-tenant preferences document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantSettings {
    #[validate(length(min = 1, max = 32))]
    pub theme: String,
    #[validate(length(min = 2, max = 8))]
    pub language: String,
    pub sound_enabled: bool,
    #[validate(nested)]
    pub default_match: MatchSettings,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            language: "en".to_string(),
            sound_enabled: true,
            default_match: MatchSettings::default(),
        }
    }
}

/// Reads a JSON text column into `T`
pub(crate) fn json_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Reads a text column through a fallible parser
pub(crate) fn parsed_column<T, F>(row: &rusqlite::Row, idx: usize, parse: F) -> rusqlite::Result<T>
where
    F: FnOnce(&str) -> Option<T>,
{
    let text: String = row.get(idx)?;
    parse(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unexpected value '{}'", text).into(),
        )
    })
}
