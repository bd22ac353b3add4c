use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "darts-tracker scoring and statistics backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the REST API server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Create the database schema
    InitDb {
        /// Drop every table first
        #[arg(long)]
        reset: bool,
    },
    /// Rebuild statistics, heatmaps and achievements from stored throws
    Recompute {
        /// Only this player (defaults to everyone)
        #[arg(short, long)]
        player: Option<i64>,
    },
    /// Write a tenant's data to a JSON backup
    Export {
        #[arg(short, long)]
        tenant: i64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Replace a tenant's data with a JSON backup
    Import {
        #[arg(short, long)]
        tenant: i64,
        #[arg(short, long)]
        input: PathBuf,
        /// Confirm that existing data is replaced
        #[arg(long)]
        yes: bool,
    },
    /// Create a demo tenant with simulated matches and drills
    SeedDemo {
        #[arg(long, default_value_t = 4)]
        players: usize,
        #[arg(long, default_value_t = 6)]
        matches: usize,
        #[arg(long, default_value_t = 8)]
        training_sessions: usize,
        /// RNG seed, the same seed gives the same data
        #[arg(long, default_value_t = 180)]
        seed: u64,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import() {
        let cli = Cli::parse_from(["darts_tracker", "import", "-t", "2", "-i", "club.json", "--yes"]);
        assert_eq!(
            cli.command,
            Command::Import {
                tenant: 2,
                input: PathBuf::from("club.json"),
                yes: true,
            }
        );
    }

    #[test]
    fn test_seed_demo_defaults() {
        let cli = Cli::parse_from(["darts_tracker", "seed-demo", "--seed", "7"]);
        assert_eq!(
            cli.command,
            Command::SeedDemo {
                players: 4,
                matches: 6,
                training_sessions: 8,
                seed: 7,
            }
        );
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
