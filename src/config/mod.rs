pub mod settings;

pub use settings::{AppConfig, ServerSettings, TrainingSettings};
