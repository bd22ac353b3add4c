pub mod achievements;
pub mod bug_reports;
pub mod connection;
pub mod heatmaps;
pub mod legs;
pub mod matches;
pub mod models;
pub mod player_stats;
pub mod players;
pub mod settings;
pub mod setup;
pub mod tenants;
pub mod throws;
pub mod training_sessions;

pub use connection::{create_pool, get_connection, DbConn, DbPool};
pub use models::*;
