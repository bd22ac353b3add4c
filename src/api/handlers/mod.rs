use crate::config::AppConfig;
use crate::database::{self, DbConn, DbPool};

use super::error::ApiError;

pub mod matches;
pub mod misc;
pub mod players;
pub mod tenants;
pub mod training;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
}

impl AppState {
    pub fn connection(&self) -> Result<DbConn, ApiError> {
        Ok(database::get_connection(&self.pool)?)
    }
}
