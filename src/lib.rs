pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod scoring;
pub mod services;
pub mod stats;
pub mod training;

use std::path::Path;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;
use log::info;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::services::backup::BackupService;
use crate::services::demo::{DemoOptions, DemoService};
use crate::services::server::ServerService;
use crate::services::stats::RecomputeService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env().with_port(port);
        let service = ServerService::new(config);
        service.run().await
    })
}

pub fn handle_init_db(reset: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.server.database_path, 1)?;
    let conn = database::get_connection(&pool)?;

    if reset {
        info!("Dropping all tables in {}", config.server.database_path);
        database::setup::reset_database(&conn)?;
    } else {
        database::setup::initialize_database(&conn)?;
    }

    println!("{} {}", "Database ready:".green(), config.server.database_path);
    Ok(())
}

pub fn handle_recompute(player: Option<i64>) -> Result<()> {
    let service = RecomputeService::new(AppConfig::from_env());
    service.run(player)
}

pub fn handle_export(tenant: i64, output: &Path) -> Result<()> {
    let service = BackupService::new(AppConfig::from_env());
    service.export(tenant, output)?;
    println!("{} {}", "Exported to".green(), output.display());
    Ok(())
}

pub fn handle_import(tenant: i64, input: &Path, confirmed: bool) -> Result<()> {
    let service = BackupService::new(AppConfig::from_env());
    let summary = service.import(tenant, input, confirmed)?;
    println!(
        "{} {} players, {} matches, {} throws, {} training sessions",
        "Imported".green().bold(),
        summary.players,
        summary.matches,
        summary.throws,
        summary.training_sessions
    );
    Ok(())
}

pub fn handle_seed_demo(options: DemoOptions) -> Result<()> {
    let service = DemoService::new(AppConfig::from_env());
    service.run(&options)?;
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
