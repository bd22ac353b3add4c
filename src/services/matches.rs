use anyhow::Result;
use log::{debug, info};
use rusqlite::Connection;
use serde::Serialize;

use super::stats::refresh_achievements;
use super::ServiceError;
use crate::database::{
    heatmaps, legs, matches, player_stats, players, throws, LegRow, MatchRow, Player, ThrowRow,
};
use crate::scoring::{
    evaluate_match, suggest_checkout, Dart, LegState, MatchProgress, MatchSettings, MatchStatus,
    PlayerId, PlayerLegScore, ScoringError, Visit, VisitResult,
};
use crate::stats::Achievement;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegView {
    pub leg: LegRow,
    pub scores: Vec<PlayerLegScore>,
    pub current_player: Option<PlayerId>,
    /// Finishing route for the player on the oche, when one exists
    pub suggested_checkout: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(rename = "match")]
    pub match_row: MatchRow,
    /// In rotation order
    pub players: Vec<Player>,
    pub legs: Vec<LegRow>,
    pub progress: MatchProgress,
    pub current_leg: Option<LegView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    pub throw: ThrowRow,
    pub result: VisitResult,
    pub leg_won: bool,
    pub match_completed: bool,
    pub next_player: Option<PlayerId>,
    pub unlocked_achievements: Vec<Achievement>,
    #[serde(rename = "match")]
    pub view: MatchView,
}

pub fn create_match(
    conn: &mut Connection,
    tenant_id: i64,
    player_ids: &[PlayerId],
    settings: MatchSettings,
) -> Result<MatchView> {
    let settings = settings.checked()?;
    if player_ids.is_empty() {
        return Err(ScoringError::NoPlayers.into());
    }
    for (idx, player_id) in player_ids.iter().enumerate() {
        if player_ids[..idx].contains(player_id) {
            return Err(ScoringError::DuplicatePlayer(*player_id).into());
        }
    }

    let tx = conn.transaction()?;
    for &player_id in player_ids {
        if players::find_by_id(&tx, tenant_id, player_id)?.is_none() {
            return Err(ServiceError::NotFound(format!("player {}", player_id)).into());
        }
    }

    let match_row = matches::insert_match(&tx, tenant_id, &settings)?;
    for (position, &player_id) in player_ids.iter().enumerate() {
        matches::add_match_player(&tx, match_row.id, player_id, position as u32)?;
    }

    let progress = evaluate_match(&settings, player_ids, &[]);
    if let Some(first) = progress.next_leg {
        legs::insert_leg(
            &tx,
            match_row.id,
            first.set_number,
            first.leg_number,
            first.starting_player,
        )?;
    }
    tx.commit()?;

    info!(
        "Created match {} for tenant {} ({} players, {} start)",
        match_row.id,
        tenant_id,
        player_ids.len(),
        settings.starting_score
    );
    load_match_view(conn, tenant_id, match_row.id)
}

pub fn load_match_view(conn: &Connection, tenant_id: i64, match_id: i64) -> Result<MatchView> {
    let match_row = matches::find_by_id(conn, tenant_id, match_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("match {}", match_id)))?;
    let rotation = matches::rotation(conn, match_id)?;

    let mut match_players = Vec::with_capacity(rotation.len());
    for &player_id in &rotation {
        if let Some(player) = players::find_by_id(conn, tenant_id, player_id)? {
            match_players.push(player);
        }
    }

    let leg_rows = legs::list_by_match(conn, match_id)?;
    let progress = evaluate_match(&match_row.settings, &rotation, &legs::summaries(&leg_rows));

    let current_leg = match leg_rows.iter().find(|leg| leg.winner_id.is_none()) {
        Some(leg) => Some(leg_view(conn, &match_row.settings, &rotation, leg.clone())?),
        None => None,
    };

    Ok(MatchView {
        match_row,
        players: match_players,
        legs: leg_rows,
        progress,
        current_leg,
    })
}

fn replay_leg(
    conn: &Connection,
    settings: &MatchSettings,
    rotation: &[PlayerId],
    leg: &LegRow,
) -> Result<LegState> {
    let visits = throws::to_visits(&throws::list_by_leg(conn, leg.id)?)?;
    let (state, _) = LegState::replay(settings.clone(), rotation, leg.starting_player_id, visits)?;
    Ok(state)
}

fn leg_view(
    conn: &Connection,
    settings: &MatchSettings,
    rotation: &[PlayerId],
    leg: LegRow,
) -> Result<LegView> {
    let state = replay_leg(conn, settings, rotation, &leg)?;
    let current_player = state.current_player();

    let suggested_checkout = current_player
        .and_then(|p| state.score_for(p))
        .filter(|score| score.opened)
        .and_then(|score| suggest_checkout(score.remaining, settings.double_out))
        .map(|route| route.iter().map(Dart::label).collect());

    Ok(LegView {
        leg,
        scores: state.scores().to_vec(),
        current_player,
        suggested_checkout,
    })
}

/// Validates and records one visit on the match's current leg, then rolls
/// the statistics forward. Everything happens in one transaction.
pub fn record_visit(
    conn: &mut Connection,
    tenant_id: i64,
    match_id: i64,
    player_id: PlayerId,
    visit: Visit,
) -> Result<VisitResponse> {
    let tx = conn.transaction()?;

    let match_row = matches::find_by_id(&tx, tenant_id, match_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("match {}", match_id)))?;
    if match_row.status == MatchStatus::Completed {
        return Err(ScoringError::MatchCompleted.into());
    }

    let settings = match_row.settings.clone();
    let rotation = matches::rotation(&tx, match_id)?;
    let leg = legs::current_leg(&tx, match_id)?
        .ok_or_else(|| ServiceError::Conflict(format!("match {} has no open leg", match_id)))?;

    let mut state = replay_leg(&tx, &settings, &rotation, &leg)?;
    let record = state.apply_visit(player_id, &visit)?;
    let throw = throws::insert_throw(&tx, leg.id, &record)?;
    debug!(
        "Leg {} visit {}: player {} {:?} {} -> {}",
        leg.id,
        record.visit_number,
        player_id,
        record.outcome.result,
        record.outcome.remaining_before,
        record.outcome.remaining_after
    );

    let mut stats = player_stats::load(&tx, player_id)?;
    stats.record_visit(&record);
    player_stats::save(&tx, player_id, &stats)?;

    let mut heatmap = heatmaps::load(&tx, player_id)?;
    heatmap.record_all(&record.outcome.darts);
    heatmaps::save(&tx, player_id, &heatmap)?;

    let leg_won = record.outcome.is_checkout();
    let mut match_completed = false;
    let mut next_player = state.current_player();

    if leg_won {
        if !legs::set_winner(&tx, leg.id, player_id)? {
            return Err(ServiceError::Conflict(format!("leg {} already has a winner", leg.id)).into());
        }
        info!("Leg {} of match {} won by player {}", leg.leg_number, match_id, player_id);

        for score in state.scores() {
            let mut stats = player_stats::load(&tx, score.player_id)?;
            stats.record_leg(
                score.player_id == player_id,
                score.darts_thrown,
                settings.starting_score,
            );
            player_stats::save(&tx, score.player_id, &stats)?;
        }

        let summaries = legs::summaries(&legs::list_by_match(&tx, match_id)?);
        let progress = evaluate_match(&settings, &rotation, &summaries);

        if let Some(winner) = progress.winner {
            matches::complete_match(&tx, match_id, winner)?;
            for &p in &rotation {
                let mut stats = player_stats::load(&tx, p)?;
                stats.record_match(p == winner);
                player_stats::save(&tx, p, &stats)?;
            }
            match_completed = true;
            info!("Match {} completed, winner player {}", match_id, winner);
        } else if let Some(next) = progress.next_leg {
            legs::insert_leg(
                &tx,
                match_id,
                next.set_number,
                next.leg_number,
                next.starting_player,
            )?;
            next_player = Some(next.starting_player);
        }
    }

    let mut unlocked_achievements = Vec::new();
    for &p in &rotation {
        let stats = player_stats::load(&tx, p)?;
        unlocked_achievements.extend(refresh_achievements(&tx, p, &stats)?);
    }

    tx.commit()?;

    let view = load_match_view(conn, tenant_id, match_id)?;
    Ok(VisitResponse {
        result: record.outcome.result,
        throw,
        leg_won,
        match_completed,
        next_player,
        unlocked_achievements,
        view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::open_memory;
    use crate::database::tenants;

    struct Fixture {
        conn: Connection,
        tenant_id: i64,
        a: PlayerId,
        b: PlayerId,
    }

    fn fixture() -> Fixture {
        let conn = open_memory();
        let tenant = tenants::insert_tenant(&conn, "club", "tok").unwrap();
        let a = players::insert_player(&conn, tenant.id, "A", None).unwrap().id;
        let b = players::insert_player(&conn, tenant.id, "B", None).unwrap().id;
        Fixture {
            conn,
            tenant_id: tenant.id,
            a,
            b,
        }
    }

    fn settings(starting_score: u32, legs_to_win: u32) -> MatchSettings {
        MatchSettings {
            starting_score,
            legs_to_win,
            ..MatchSettings::default()
        }
    }

    fn visit(darts: &[Dart]) -> Visit {
        Visit::new(darts.to_vec()).unwrap()
    }

    fn scoring_error(err: anyhow::Error) -> ScoringError {
        err.downcast::<ScoringError>().unwrap()
    }

    #[test]
    fn test_create_match_opens_first_leg() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a, f.b], MatchSettings::default()).unwrap();

        assert_eq!(view.players.len(), 2);
        assert_eq!(view.legs.len(), 1);
        let leg = view.current_leg.unwrap();
        assert_eq!(leg.leg.leg_number, 1);
        assert_eq!(leg.current_player, Some(f.a));
        assert!(leg.scores.iter().all(|s| s.remaining == 501));
        assert!(leg.suggested_checkout.is_none());
    }

    #[test]
    fn test_create_match_rejects_bad_rosters() {
        let mut f = fixture();
        let err = create_match(&mut f.conn, f.tenant_id, &[], MatchSettings::default()).unwrap_err();
        assert_eq!(scoring_error(err), ScoringError::NoPlayers);

        let err = create_match(&mut f.conn, f.tenant_id, &[f.a, f.a], MatchSettings::default())
            .unwrap_err();
        assert_eq!(scoring_error(err), ScoringError::DuplicatePlayer(f.a));

        let err = create_match(&mut f.conn, f.tenant_id + 1, &[f.a], MatchSettings::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_maximum_from_501() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a, f.b], MatchSettings::default()).unwrap();

        let response = record_visit(
            &mut f.conn,
            f.tenant_id,
            view.match_row.id,
            f.a,
            visit(&[Dart::treble(20); 3]),
        )
        .unwrap();

        assert_eq!(response.result, VisitResult::Scored);
        assert_eq!(response.throw.remaining_after, 321);
        assert_eq!(response.next_player, Some(f.b));
        assert_eq!(response.unlocked_achievements, vec![Achievement::First180]);
        assert_eq!(player_stats::load(&f.conn, f.a).unwrap().total_180s, 1);
    }

    #[test]
    fn test_bust_keeps_remaining() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a, f.b], settings(40, 1)).unwrap();

        let response = record_visit(
            &mut f.conn,
            f.tenant_id,
            view.match_row.id,
            f.a,
            visit(&[Dart::single(20), Dart::double(20)]),
        )
        .unwrap();

        assert_eq!(response.result, VisitResult::Bust);
        assert!(response.throw.is_bust);
        assert_eq!(response.throw.remaining_before, 40);
        assert_eq!(response.throw.remaining_after, 40);
        assert!(!response.leg_won);
    }

    #[test]
    fn test_wrong_turn_is_a_conflict() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a, f.b], MatchSettings::default()).unwrap();

        let err = record_visit(
            &mut f.conn,
            f.tenant_id,
            view.match_row.id,
            f.b,
            visit(&[Dart::single(1)]),
        )
        .unwrap_err();
        let err = scoring_error(err);
        assert!(err.is_conflict());

        assert!(throws::list_by_leg(&f.conn, view.legs[0].id).unwrap().is_empty());
    }

    #[test]
    fn test_bull_checkout_completes_match() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a, f.b], settings(50, 1)).unwrap();
        let id = view.match_row.id;

        let response = record_visit(&mut f.conn, f.tenant_id, id, f.a, visit(&[Dart::bullseye()])).unwrap();
        assert_eq!(response.result, VisitResult::Checkout);
        assert!(response.leg_won);
        assert!(response.match_completed);
        assert_eq!(response.view.match_row.status, MatchStatus::Completed);
        assert_eq!(response.view.match_row.winner_id, Some(f.a));
        assert!(response.view.current_leg.is_none());

        let err = record_visit(&mut f.conn, f.tenant_id, id, f.b, visit(&[Dart::single(1)])).unwrap_err();
        assert_eq!(scoring_error(err), ScoringError::MatchCompleted);

        let stats = player_stats::load(&f.conn, f.a).unwrap();
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.legs_won, 1);
        assert_eq!(stats.best_leg, Some(1));
    }

    #[test]
    fn test_next_leg_rotates_starter() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a, f.b], settings(40, 2)).unwrap();
        let id = view.match_row.id;

        let response = record_visit(&mut f.conn, f.tenant_id, id, f.a, visit(&[Dart::double(20)])).unwrap();
        assert!(response.leg_won);
        assert!(!response.match_completed);
        assert_eq!(response.next_player, Some(f.b));

        let current = response.view.current_leg.unwrap();
        assert_eq!(current.leg.leg_number, 2);
        assert_eq!(current.leg.starting_player_id, f.b);
        assert_eq!(current.suggested_checkout, Some(vec!["D20".to_string()]));
        assert_eq!(response.view.progress.standing(f.a).unwrap().legs_won, 1);

        let loser = player_stats::load(&f.conn, f.b).unwrap();
        assert_eq!(loser.legs_played, 1);
        assert_eq!(loser.legs_won, 0);
    }

    #[test]
    fn test_darts_after_checkout_rejected() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a, f.b], settings(40, 1)).unwrap();

        let err = record_visit(
            &mut f.conn,
            f.tenant_id,
            view.match_row.id,
            f.a,
            visit(&[Dart::double(20), Dart::single(1)]),
        )
        .unwrap_err();
        assert_eq!(scoring_error(err), ScoringError::DartsAfterCheckout);
    }

    #[test]
    fn test_other_tenant_cannot_see_match() {
        let mut f = fixture();
        let view = create_match(&mut f.conn, f.tenant_id, &[f.a], MatchSettings::default()).unwrap();
        let other = tenants::insert_tenant(&f.conn, "rival", "tok2").unwrap();

        let err = load_match_view(&f.conn, other.id, view.match_row.id).unwrap_err();
        assert!(err.downcast_ref::<ServiceError>().is_some());

        let err = record_visit(
            &mut f.conn,
            other.id,
            view.match_row.id,
            f.a,
            visit(&[Dart::single(1)]),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotFound(_))
        ));
    }
}
