use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDateTime, Utc};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::stats::{rebuild_player_stats, regenerate_heatmap};
use super::ServiceError;
use crate::config::AppConfig;
use crate::database::{
    self, bug_reports, legs, matches, players, settings, tenants, throws, training_sessions,
    BugReport, LegRow, MatchRow, Player, TenantSettings, ThrowRow, TrainingSessionRow,
};
use crate::scoring::{evaluate_match, LegState, LegSummary, MatchStatus, PlayerId, Visit};

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegBackup {
    pub leg: LegRow,
    pub throws: Vec<ThrowRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBackup {
    #[serde(rename = "match")]
    pub match_row: MatchRow,
    /// Rotation order
    pub player_ids: Vec<PlayerId>,
    pub legs: Vec<LegBackup>,
}

/// Everything a tenant owns. Statistics, heatmaps and achievements are
/// derived data and are rebuilt on import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u32,
    pub exported_at: NaiveDateTime,
    pub tenant_name: String,
    pub settings: TenantSettings,
    pub players: Vec<Player>,
    pub matches: Vec<MatchBackup>,
    pub training_sessions: Vec<TrainingSessionRow>,
    pub bug_reports: Vec<BugReport>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub players: usize,
    pub matches: usize,
    pub throws: usize,
    pub training_sessions: usize,
}

pub fn export_tenant(conn: &Connection, tenant_id: i64) -> Result<BackupDocument> {
    let tenant = tenants::find_by_id(conn, tenant_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("tenant {}", tenant_id)))?;

    let mut match_backups = Vec::new();
    for match_row in matches::list_by_tenant(conn, tenant_id)?.into_iter().rev() {
        let player_ids = matches::rotation(conn, match_row.id)?;
        let mut leg_backups = Vec::new();
        for leg in legs::list_by_match(conn, match_row.id)? {
            let leg_throws = throws::list_by_leg(conn, leg.id)?;
            leg_backups.push(LegBackup {
                leg,
                throws: leg_throws,
            });
        }
        match_backups.push(MatchBackup {
            match_row,
            player_ids,
            legs: leg_backups,
        });
    }

    let mut sessions = training_sessions::list_by_tenant(conn, tenant_id, None)?;
    sessions.reverse();

    Ok(BackupDocument {
        version: BACKUP_VERSION,
        exported_at: Utc::now().naive_utc(),
        tenant_name: tenant.name,
        settings: settings::load(conn, tenant_id)?,
        players: players::list_by_tenant(conn, tenant_id)?,
        matches: match_backups,
        training_sessions: sessions,
        bug_reports: bug_reports::list_by_tenant(conn, tenant_id)?,
    })
}

fn stored_visits(throws: &[ThrowRow]) -> Result<Vec<(PlayerId, Visit)>> {
    throws
        .iter()
        .map(|t| {
            Visit::new(t.darts.clone())
                .map(|visit| (t.player_id, visit))
                .map_err(|e| anyhow::Error::from(ServiceError::InvalidInput(format!("throw {}: {}", t.id, e))))
        })
        .collect()
}

/// The recorded status and winner must be what the legs add up to. An
/// unfinished match may only have its last leg open.
fn check_match_outcome(backup: &MatchBackup, context: &str) -> Result<()> {
    let row = &backup.match_row;
    if backup.player_ids.is_empty() {
        bail!(ServiceError::InvalidInput(format!("{} has no players", context)));
    }

    let summaries: Vec<LegSummary> = backup
        .legs
        .iter()
        .map(|l| LegSummary {
            set_number: l.leg.set_number,
            leg_number: l.leg.leg_number,
            winner_id: l.leg.winner_id,
        })
        .collect();

    if let Some(pos) = summaries.iter().position(|l| l.winner_id.is_none()) {
        if pos + 1 != summaries.len() || row.status == MatchStatus::Completed {
            bail!(ServiceError::InvalidInput(format!(
                "{}: leg {} is open but later legs or a result were recorded",
                context, summaries[pos].leg_number
            )));
        }
    }

    let progress = evaluate_match(&row.settings, &backup.player_ids, &summaries);
    if progress.status != row.status || progress.winner != row.winner_id {
        bail!(ServiceError::InvalidInput(format!(
            "{}: recorded status {} with winner {:?} does not match its legs",
            context,
            row.status.as_str(),
            row.winner_id
        )));
    }

    match progress.status {
        MatchStatus::Completed => {
            let before_last = evaluate_match(&row.settings, &backup.player_ids, &summaries[..summaries.len() - 1]);
            if before_last.status == MatchStatus::Completed {
                bail!(ServiceError::InvalidInput(format!(
                    "{}: legs were recorded after the match was decided",
                    context
                )));
            }
        }
        MatchStatus::InProgress => {
            let open_leg = summaries.last().is_some_and(|l| l.winner_id.is_none());
            if !open_leg && progress.next_leg.is_none() {
                bail!(ServiceError::InvalidInput(format!(
                    "{}: in progress with no leg to play",
                    context
                )));
            }
        }
    }
    Ok(())
}

/// Checks the whole document before anything is written: version, settings,
/// references between rows, that every leg replays under its rules and that
/// each match result follows from its legs
pub fn validate_document(doc: &BackupDocument) -> Result<()> {
    if doc.version != BACKUP_VERSION {
        bail!(ServiceError::InvalidInput(format!(
            "unsupported backup version {} (expected {})",
            doc.version, BACKUP_VERSION
        )));
    }
    doc.settings
        .validate()
        .map_err(|e| ServiceError::InvalidInput(format!("settings: {}", e)))?;

    let known: Vec<PlayerId> = doc.players.iter().map(|p| p.id).collect();
    let check_player = |id: PlayerId, context: &str| -> Result<()> {
        if known.contains(&id) {
            Ok(())
        } else {
            Err(ServiceError::InvalidInput(format!("{} references unknown player {}", context, id)).into())
        }
    };

    for backup in &doc.matches {
        let context = format!("match {}", backup.match_row.id);
        backup
            .match_row
            .settings
            .clone()
            .checked()
            .map_err(|e| ServiceError::InvalidInput(format!("{}: {}", context, e)))?;
        for &id in &backup.player_ids {
            check_player(id, &context)?;
        }

        for leg in &backup.legs {
            let visits = stored_visits(&leg.throws)?;
            let (state, _) = LegState::replay(
                backup.match_row.settings.clone(),
                &backup.player_ids,
                leg.leg.starting_player_id,
                visits,
            )
            .map_err(|e| ServiceError::InvalidInput(format!("{} leg {}: {}", context, leg.leg.leg_number, e)))?;

            if state.winner() != leg.leg.winner_id {
                bail!(ServiceError::InvalidInput(format!(
                    "{} leg {}: recorded winner does not match its throws",
                    context, leg.leg.leg_number
                )));
            }
        }

        check_match_outcome(backup, &context)?;
    }

    for session in &doc.training_sessions {
        check_player(session.player_id, &format!("training session {}", session.id))?;
    }

    Ok(())
}

/// Replaces the tenant's data with the document's. Ids are reassigned.
pub fn import_tenant(
    conn: &mut Connection,
    tenant_id: i64,
    doc: &BackupDocument,
) -> Result<ImportSummary> {
    validate_document(doc)?;
    if tenants::find_by_id(conn, tenant_id)?.is_none() {
        return Err(ServiceError::NotFound(format!("tenant {}", tenant_id)).into());
    }

    let tx = conn.transaction()?;
    tenants::purge_tenant_data(&tx, tenant_id)?;
    settings::save(&tx, tenant_id, &doc.settings)?;

    let mut summary = ImportSummary::default();
    let mut ids: HashMap<PlayerId, PlayerId> = HashMap::new();
    for player in &doc.players {
        let created = players::insert_player(&tx, tenant_id, &player.name, player.avatar.as_deref())?;
        ids.insert(player.id, created.id);
        summary.players += 1;
    }
    let map = |id: PlayerId| ids.get(&id).copied().context("player id was validated");

    for backup in &doc.matches {
        let settings = &backup.match_row.settings;
        let rotation = backup
            .player_ids
            .iter()
            .map(|&id| map(id))
            .collect::<Result<Vec<_>>>()?;

        let match_row = matches::insert_match(&tx, tenant_id, settings)?;
        for (position, &player_id) in rotation.iter().enumerate() {
            matches::add_match_player(&tx, match_row.id, player_id, position as u32)?;
        }

        for leg in &backup.legs {
            let starting = map(leg.leg.starting_player_id)?;
            let leg_row = legs::insert_leg(&tx, match_row.id, leg.leg.set_number, leg.leg.leg_number, starting)?;

            let visits = stored_visits(&leg.throws)?
                .into_iter()
                .map(|(player_id, visit)| -> Result<(PlayerId, Visit)> { Ok((map(player_id)?, visit)) })
                .collect::<Result<Vec<_>>>()?;
            let (state, records) = LegState::replay(settings.clone(), &rotation, starting, visits)?;
            for record in &records {
                throws::insert_throw(&tx, leg_row.id, record)?;
            }
            summary.throws += records.len();

            if let Some(winner) = state.winner() {
                legs::set_winner(&tx, leg_row.id, winner)?;
            }
        }

        if let (MatchStatus::Completed, Some(winner)) = (backup.match_row.status, backup.match_row.winner_id) {
            matches::complete_match(&tx, match_row.id, map(winner)?)?;
        }
        summary.matches += 1;
    }

    for session in &doc.training_sessions {
        let created = training_sessions::insert_session(&tx, tenant_id, map(session.player_id)?, &session.state)?;
        training_sessions::update_progress(&tx, created.id, &session.state, &session.darts)?;
        summary.training_sessions += 1;
    }

    for report in &doc.bug_reports {
        bug_reports::insert_bug_report(&tx, tenant_id, &report.title, &report.description)?;
    }

    for &player_id in ids.values() {
        rebuild_player_stats(&tx, player_id)?;
        regenerate_heatmap(&tx, player_id)?;
    }

    tx.commit()?;
    Ok(summary)
}

pub fn write_backup(path: &Path, doc: &BackupDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(doc).context("Failed to serialize backup")?;
    fs::write(path, json).with_context(|| format!("Failed to write backup file {}", path.display()))?;
    Ok(())
}

pub fn read_backup(path: &Path) -> Result<BackupDocument> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| {
        format!(
            "Failed to parse backup {}. First 200 chars: {}",
            path.display(),
            json.chars().take(200).collect::<String>()
        )
    })
}

/// CLI entry points for moving a tenant's data in and out of JSON files
pub struct BackupService {
    config: AppConfig,
}

impl BackupService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn export(&self, tenant_id: i64, output: &Path) -> Result<()> {
        info!("=== Exporting tenant {} ===", tenant_id);
        let pool = database::create_pool(&self.config.server.database_path, 1)?;
        let conn = database::get_connection(&pool)?;

        let doc = export_tenant(&conn, tenant_id)?;
        write_backup(output, &doc)?;

        info!(
            "  → {} players, {} matches, {} training sessions written to {}",
            doc.players.len(),
            doc.matches.len(),
            doc.training_sessions.len(),
            output.display()
        );
        Ok(())
    }

    pub fn import(&self, tenant_id: i64, input: &Path, confirmed: bool) -> Result<ImportSummary> {
        info!("=== Importing into tenant {} ===", tenant_id);
        let doc = read_backup(input)?;
        validate_document(&doc)?;
        info!("  → Backup of '{}' from {} is valid", doc.tenant_name, doc.exported_at);

        if !confirmed {
            bail!("Import replaces every row of tenant {}; re-run with --yes to confirm", tenant_id);
        }

        let pool = database::create_pool(&self.config.server.database_path, 1)?;
        let mut conn = database::get_connection(&pool)?;
        database::setup::initialize_database(&conn)?;

        let summary = import_tenant(&mut conn, tenant_id, &doc)?;
        info!("=== Import Complete ===");
        Ok(summary)
    }
}
