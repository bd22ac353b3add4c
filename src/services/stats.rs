use anyhow::{Context, Result};
use colored::Colorize;
use log::{info, warn};
use rusqlite::Connection;

use super::ServiceError;
use crate::config::AppConfig;
use crate::database::{
    self, achievements, heatmaps, legs, matches, player_stats, players, throws, training_sessions,
};
use crate::scoring::{LegState, MatchStatus, PlayerId};
use crate::stats::{earned, Achievement, Heatmap, PlayerStats};

/// Stores every achievement the statistics qualify for and returns the ones
/// that were not unlocked before
pub fn refresh_achievements(
    conn: &Connection,
    player_id: PlayerId,
    stats: &PlayerStats,
) -> Result<Vec<Achievement>> {
    let mut unlocked = Vec::new();
    for achievement in earned(stats) {
        if achievements::unlock(conn, player_id, achievement.code())? {
            info!("Player {} unlocked '{}'", player_id, achievement.title());
            unlocked.push(achievement);
        }
    }
    Ok(unlocked)
}

/// Rebuilds statistics from scratch by replaying every leg the player
/// took part in, plus completed training sessions
pub fn compute_player_stats(conn: &Connection, player_id: PlayerId) -> Result<PlayerStats> {
    let mut stats = PlayerStats::default();

    for match_row in matches::list_for_player(conn, player_id)? {
        let rotation = matches::rotation(conn, match_row.id)?;

        for leg in legs::list_by_match(conn, match_row.id)? {
            let visits = throws::to_visits(&throws::list_by_leg(conn, leg.id)?)?;
            let (state, records) = LegState::replay(
                match_row.settings.clone(),
                &rotation,
                leg.starting_player_id,
                visits,
            )
            .with_context(|| format!("Failed to replay leg {}", leg.id))?;

            records
                .iter()
                .filter(|r| r.player_id == player_id)
                .for_each(|r| stats.record_visit(r));

            if let Some(winner) = leg.winner_id {
                let darts = state.score_for(player_id).map_or(0, |s| s.darts_thrown);
                stats.record_leg(
                    winner == player_id,
                    darts,
                    match_row.settings.starting_score,
                );
            }
        }

        if match_row.status == MatchStatus::Completed {
            stats.record_match(match_row.winner_id == Some(player_id));
        }
    }

    for session in training_sessions::list_for_player(conn, player_id)? {
        if session.is_completed() {
            stats.record_training_completed();
        }
    }

    Ok(stats)
}

pub fn rebuild_player_stats(conn: &Connection, player_id: PlayerId) -> Result<PlayerStats> {
    let stats = compute_player_stats(conn, player_id)?;
    player_stats::save(conn, player_id, &stats)?;
    refresh_achievements(conn, player_id, &stats)?;
    Ok(stats)
}

/// Rebuilds the heatmap from every stored match and training dart
pub fn regenerate_heatmap(conn: &Connection, player_id: PlayerId) -> Result<Heatmap> {
    let mut heatmap = Heatmap::default();
    heatmap.record_all(&throws::list_darts_for_player(conn, player_id)?);

    for session in training_sessions::list_for_player(conn, player_id)? {
        heatmap.record_all(&session.darts);
    }

    heatmaps::save(conn, player_id, &heatmap)?;
    Ok(heatmap)
}

/// Offline rebuild of the statistics caches, driven from the CLI
pub struct RecomputeService {
    config: AppConfig,
}

impl RecomputeService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, player: Option<PlayerId>) -> Result<()> {
        info!("=== Starting Statistics Rebuild ===");

        let pool = database::create_pool(&self.config.server.database_path, 1)?;
        let mut conn = database::get_connection(&pool)?;
        database::setup::initialize_database(&conn)?;

        let all: Vec<PlayerId> = players::list_all(&conn)?.into_iter().map(|p| p.id).collect();
        let player_ids = match player {
            Some(id) if all.contains(&id) => vec![id],
            Some(id) => {
                warn!("Player {} does not exist", id);
                return Err(ServiceError::NotFound(format!("player {}", id)).into());
            }
            None => all,
        };
        info!("  → {} player(s) to rebuild", player_ids.len());

        let tx = conn.transaction()?;
        let mut rebuilt = 0;
        for player_id in player_ids {
            let stats = rebuild_player_stats(&tx, player_id)?;
            let heatmap = regenerate_heatmap(&tx, player_id)?;
            println!(
                "{} player {}: avg {:.2}, 180s {}, darts on heatmap {}",
                "✓".green(),
                player_id,
                stats.average(),
                stats.total_180s,
                heatmap.total_darts
            );
            rebuilt += 1;
        }
        tx.commit()?;

        info!("=== Rebuild Complete ({} players) ===", rebuilt);
        Ok(())
    }
}
