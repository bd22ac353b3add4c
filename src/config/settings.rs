use crate::scoring::MatchSettings;

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub database_path: String,
    pub pool_size: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: "darts_tracker.db".to_string(),
            pool_size: 8,
        }
    }
}

/// Round budgets for the solo drills
#[derive(Debug, Clone)]
pub struct TrainingSettings {
    pub doubles_rounds: u32,
    pub triples_rounds: u32,
    pub around_the_clock_rounds: u32,
    pub checkout_121_attempts: u32,
    pub checkout_121_start: u32,
    pub score_training_rounds: u32,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            doubles_rounds: 30,
            triples_rounds: 30,
            around_the_clock_rounds: 30,
            checkout_121_attempts: 10,
            checkout_121_start: 121,
            score_training_rounds: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub match_defaults: MatchSettings,
    pub training: TrainingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server: ServerSettings::default(),
            match_defaults: MatchSettings::default(),
            training: TrainingSettings::default(),
        }
    }

    /// Defaults overridden by `DATABASE_PATH` and `DB_POOL_SIZE`
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.server.database_path = path;
        }
        if let Some(size) = std::env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.server.pool_size = size;
        }

        config
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }
}
