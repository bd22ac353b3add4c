use anyhow::Result;
use colored::Colorize;

use darts_tracker::cli::Command;
use darts_tracker::services::demo::DemoOptions;
use darts_tracker::{
    handle_completions, handle_export, handle_import, handle_init_db, handle_recompute,
    handle_seed_demo, handle_serve, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::InitDb { reset } => handle_init_db(*reset),
        Command::Recompute { player } => handle_recompute(*player),
        Command::Export { tenant, output } => handle_export(*tenant, output),
        Command::Import { tenant, input, yes } => handle_import(*tenant, input, *yes),
        Command::SeedDemo {
            players,
            matches,
            training_sessions,
            seed,
        } => handle_seed_demo(DemoOptions {
            players: *players,
            matches: *matches,
            training_sessions: *training_sessions,
            seed: *seed,
        }),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
