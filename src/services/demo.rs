use std::f64::consts::TAU;

use anyhow::{bail, Result};
use colored::Colorize;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

use super::{matches as match_service, new_api_token, training as training_service};
use crate::config::AppConfig;
use crate::database::{self, players, tenants, Player, Tenant};
use crate::scoring::{aim_point, dart_at, suggest_checkout, Dart, MatchSettings, Visit};
use crate::training::{TrainingMode, TrainingState};

const DEMO_NAMES: [&str; 8] = [
    "Anna", "Bartek", "Celina", "Dawid", "Ewa", "Filip", "Gosia", "Henryk",
];
const MAX_VISITS: usize = 1000;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub players: usize,
    pub matches: usize,
    pub training_sessions: usize,
    pub seed: u64,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            players: 4,
            matches: 6,
            training_sessions: 8,
            seed: 180,
        }
    }
}

#[derive(Debug)]
pub struct DemoSeed {
    pub tenant: Tenant,
    pub players: Vec<Player>,
    pub matches: usize,
    pub training_sessions: usize,
}

/// Simulated player: aims at the centre of a bed and scatters around it
struct Thrower {
    rng: StdRng,
}

impl Thrower {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn gaussian_pair(&mut self) -> (f64, f64) {
        let u1: f64 = self.rng.random::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = self.rng.random();
        let r = (-2.0 * u1.ln()).sqrt();
        (r * (TAU * u2).cos(), r * (TAU * u2).sin())
    }

    fn throw_at(&mut self, target: &Dart, spread: f64) -> Dart {
        let (x, y) = aim_point(target);
        let (dx, dy) = self.gaussian_pair();
        dart_at(x + dx * spread, y + dy * spread)
    }

    /// Three darts at a fixed target
    fn visit_at(&mut self, target: &Dart, spread: f64) -> Result<Visit> {
        let darts = (0..3).map(|_| self.throw_at(target, spread)).collect();
        Ok(Visit::new(darts)?)
    }

    /// Plays a visit the way a player would: score on T20, follow the
    /// checkout route once one exists, stop after a finish or a bust
    fn x01_visit(
        &mut self,
        remaining: u32,
        opened: bool,
        settings: &MatchSettings,
        spread: f64,
    ) -> Result<Visit> {
        let mut darts = Vec::with_capacity(3);
        let mut left = remaining;
        let mut open = opened;

        for _ in 0..3 {
            let target = aim_for(left, open, settings.double_out);
            let dart = self.throw_at(&target, spread);
            darts.push(dart);

            if !open {
                if !dart.is_double() {
                    continue;
                }
                open = true;
            }
            if dart.score() >= left {
                break;
            }
            left -= dart.score();
            if settings.double_out && left == 1 {
                break;
            }
        }

        Ok(Visit::new(darts)?)
    }
}

fn aim_for(remaining: u32, opened: bool, double_out: bool) -> Dart {
    if !opened {
        return Dart::double(20);
    }
    suggest_checkout(remaining, double_out)
        .and_then(|route| route.first().copied())
        .unwrap_or_else(|| Dart::treble(20))
}

/// Parses drill target labels such as "D16", "T5", "BULL" or "7"
fn aim_for_label(label: &str) -> Dart {
    if label == "BULL" {
        return Dart::bullseye();
    }
    let (ring, number) = match label.split_at_checked(1) {
        Some(("D", rest)) => (2, rest),
        Some(("T", rest)) => (3, rest),
        _ => (1, label),
    };
    match number.parse::<u8>() {
        Ok(segment @ 1..=20) => Dart::new(segment, ring).unwrap_or_else(|_| Dart::single(segment)),
        _ => Dart::treble(20),
    }
}

fn play_match(
    conn: &mut Connection,
    tenant_id: i64,
    roster: &[Player],
    spreads: &[f64],
    settings: MatchSettings,
    thrower: &mut Thrower,
) -> Result<()> {
    let ids: Vec<_> = roster.iter().map(|p| p.id).collect();
    let view = match_service::create_match(conn, tenant_id, &ids, settings.clone())?;
    let match_id = view.match_row.id;
    let mut current = view.current_leg;

    for _ in 0..MAX_VISITS {
        let Some(leg) = current else {
            return Ok(());
        };
        let Some(player_id) = leg.current_player else {
            return Ok(());
        };
        let Some(score) = leg.scores.iter().find(|s| s.player_id == player_id) else {
            bail!("Player {} missing from leg {}", player_id, leg.leg.id);
        };
        let spread = ids
            .iter()
            .position(|&id| id == player_id)
            .map_or(0.1, |idx| spreads[idx]);

        let visit = thrower.x01_visit(score.remaining, score.opened, &settings, spread)?;
        let response = match_service::record_visit(conn, tenant_id, match_id, player_id, visit)?;
        if response.match_completed {
            return Ok(());
        }
        current = response.view.current_leg;
    }

    bail!("Demo match {} did not finish within {} visits", match_id, MAX_VISITS)
}

fn play_training(
    conn: &mut Connection,
    config: &AppConfig,
    tenant_id: i64,
    player: &Player,
    mode: TrainingMode,
    spread: f64,
    thrower: &mut Thrower,
) -> Result<()> {
    let mut session =
        training_service::start_session(conn, tenant_id, player.id, mode, &config.training)?;

    for _ in 0..MAX_VISITS {
        if session.finished {
            return Ok(());
        }
        let visit = match &session.session.state {
            TrainingState::Checkout121(drill) => {
                thrower.x01_visit(drill.remaining, true, &MatchSettings::default(), spread)?
            }
            TrainingState::ScoreTraining(drill) => thrower.visit_at(&Dart::treble(drill.target), spread)?,
            state => {
                let target = state
                    .current_target()
                    .map(|label| aim_for_label(&label))
                    .unwrap_or_else(|| Dart::treble(20));
                thrower.visit_at(&target, spread)?
            }
        };
        session = training_service::record_visit(conn, tenant_id, session.session.id, visit)?.session;
    }

    bail!("Demo {} session did not finish within {} visits", mode, MAX_VISITS)
}

/// Creates a tenant with players, finished matches and drills, all recorded
/// through the same services the API uses
pub fn seed_demo(conn: &mut Connection, config: &AppConfig, options: &DemoOptions) -> Result<DemoSeed> {
    if options.players < 2 || options.players > DEMO_NAMES.len() {
        bail!("Demo needs between 2 and {} players", DEMO_NAMES.len());
    }

    let mut thrower = Thrower::new(options.seed);
    let tenant = tenants::insert_tenant(conn, "Demo club", &new_api_token())?;

    let mut roster = Vec::with_capacity(options.players);
    let mut spreads = Vec::with_capacity(options.players);
    for name in DEMO_NAMES.iter().take(options.players) {
        roster.push(players::insert_player(conn, tenant.id, name, None)?);
        spreads.push(thrower.rng.random_range(0.04..0.14));
    }
    info!("  → Created {} players", roster.len());

    let settings = MatchSettings {
        legs_to_win: 2,
        ..config.match_defaults.clone()
    };
    for idx in 0..options.matches {
        let first = idx % roster.len();
        let second = (first + 1 + thrower.rng.random_range(0..roster.len() - 1)) % roster.len();
        let pair = [roster[first].clone(), roster[second].clone()];
        let pair_spreads = [spreads[first], spreads[second]];
        play_match(conn, tenant.id, &pair, &pair_spreads, settings.clone(), &mut thrower)?;
    }
    info!("  → Played {} matches", options.matches);

    for idx in 0..options.training_sessions {
        let player_idx = idx % roster.len();
        let mode = TrainingMode::ALL[thrower.rng.random_range(0..TrainingMode::ALL.len())];
        play_training(
            conn,
            config,
            tenant.id,
            &roster[player_idx],
            mode,
            spreads[player_idx],
            &mut thrower,
        )?;
    }
    info!("  → Completed {} training sessions", options.training_sessions);

    Ok(DemoSeed {
        tenant,
        players: roster,
        matches: options.matches,
        training_sessions: options.training_sessions,
    })
}

pub struct DemoService {
    config: AppConfig,
}

impl DemoService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, options: &DemoOptions) -> Result<DemoSeed> {
        info!("=== Seeding Demo Data (seed {}) ===", options.seed);

        let pool = database::create_pool(&self.config.server.database_path, 1)?;
        let mut conn = database::get_connection(&pool)?;
        database::setup::initialize_database(&conn)?;

        let seed = seed_demo(&mut conn, &self.config, options)?;

        println!(
            "{} tenant {} ({} players) with api token {}",
            "Seeded".green().bold(),
            seed.tenant.id,
            seed.players.len(),
            seed.tenant.api_token.yellow()
        );
        info!("=== Demo Data Complete ===");
        Ok(seed)
    }
}
