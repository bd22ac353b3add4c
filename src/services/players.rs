use anyhow::Result;
use log::info;
use rusqlite::Connection;

use super::ServiceError;
use crate::database::{heatmaps, matches, player_stats, players, Player};
use crate::scoring::PlayerId;
use crate::stats::{Heatmap, PlayerStats};

/// Adds a player together with empty statistics and heatmap rows
pub fn create_player(
    conn: &mut Connection,
    tenant_id: i64,
    name: &str,
    avatar: Option<&str>,
) -> Result<Player> {
    let tx = conn.transaction()?;
    let player = players::insert_player(&tx, tenant_id, name, avatar)?;
    player_stats::save(&tx, player.id, &PlayerStats::default())?;
    heatmaps::save(&tx, player.id, &Heatmap::default())?;
    tx.commit()?;

    info!("Tenant {} added player {} ({})", tenant_id, player.id, player.name);
    Ok(player)
}

/// Deletes a player without match history. Players on a match roster are
/// kept so legs, throws and winners stay intact.
pub fn delete_player(conn: &Connection, tenant_id: i64, player_id: PlayerId) -> Result<()> {
    if players::find_by_id(conn, tenant_id, player_id)?.is_none() {
        return Err(ServiceError::NotFound(format!("player {}", player_id)).into());
    }

    let played = matches::count_for_player(conn, player_id)?;
    if played > 0 {
        return Err(ServiceError::Conflict(format!(
            "player {} has played {} matches and cannot be deleted",
            player_id, played
        ))
        .into());
    }

    players::delete_player(conn, tenant_id, player_id)?;
    info!("Tenant {} deleted player {}", tenant_id, player_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::open_memory;
    use crate::database::{legs, tenants};
    use crate::scoring::{Dart, MatchSettings, Visit};
    use crate::services::matches as match_service;
    use crate::services::stats::compute_player_stats;

    #[test]
    fn test_create_player_seeds_cache_rows() {
        let mut conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let player = create_player(&mut conn, tenant.id, "Phil", None).unwrap();

        assert_eq!(player_stats::load(&conn, player.id).unwrap(), PlayerStats::default());
        assert_eq!(heatmaps::load(&conn, player.id).unwrap().total_darts, 0);
    }

    #[test]
    fn test_player_with_history_is_kept() {
        let mut conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let a = create_player(&mut conn, tenant.id, "A", None).unwrap().id;
        let b = create_player(&mut conn, tenant.id, "B", None).unwrap().id;
        let c = create_player(&mut conn, tenant.id, "C", None).unwrap().id;

        let settings = MatchSettings {
            starting_score: 40,
            legs_to_win: 3,
            ..MatchSettings::default()
        };
        let view = match_service::create_match(&mut conn, tenant.id, &[a, b, c], settings).unwrap();
        let id = view.match_row.id;
        let checkout = || Visit::new(vec![Dart::double(20)]).unwrap();

        // leg 1 opens with A, B finishes; leg 2 opens with B, C finishes
        match_service::record_visit(&mut conn, tenant.id, id, a, Visit::new(vec![Dart::miss()]).unwrap())
            .unwrap();
        match_service::record_visit(&mut conn, tenant.id, id, b, checkout()).unwrap();
        match_service::record_visit(&mut conn, tenant.id, id, b, Visit::new(vec![Dart::miss()]).unwrap())
            .unwrap();
        match_service::record_visit(&mut conn, tenant.id, id, c, checkout()).unwrap();
        let before: Vec<_> = legs::list_by_match(&conn, id)
            .unwrap()
            .into_iter()
            .map(|leg| (leg.leg_number, leg.winner_id))
            .collect();

        let err = delete_player(&conn, tenant.id, b).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Conflict(_))
        ));

        let after: Vec<_> = legs::list_by_match(&conn, id)
            .unwrap()
            .into_iter()
            .map(|leg| (leg.leg_number, leg.winner_id))
            .collect();
        assert_eq!(before, after);
        assert_eq!(after[0], (1, Some(b)));
        assert_eq!(after[1], (2, Some(c)));
        assert!(players::find_by_id(&conn, tenant.id, b).unwrap().is_some());

        let cached = player_stats::load(&conn, c).unwrap();
        assert_eq!(cached.legs_played, 2);
        assert_eq!(compute_player_stats(&conn, c).unwrap(), cached);
    }

    #[test]
    fn test_restrict_guards_history_at_the_schema() {
        let mut conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let a = create_player(&mut conn, tenant.id, "A", None).unwrap().id;
        match_service::create_match(&mut conn, tenant.id, &[a], MatchSettings::default()).unwrap();

        assert!(players::delete_player(&conn, tenant.id, a).is_err());
        assert!(players::find_by_id(&conn, tenant.id, a).unwrap().is_some());
    }

    #[test]
    fn test_delete_unknown_or_unplayed() {
        let mut conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let a = create_player(&mut conn, tenant.id, "A", None).unwrap().id;

        let err = delete_player(&conn, tenant.id + 1, a).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotFound(_))
        ));

        delete_player(&conn, tenant.id, a).unwrap();
        assert!(players::find_by_id(&conn, tenant.id, a).unwrap().is_none());
        assert_eq!(player_stats::load(&conn, a).unwrap(), PlayerStats::default());
    }
}
