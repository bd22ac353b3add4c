pub mod achievements;
pub mod heatmap;
pub mod player_stats;

pub use achievements::{earned, Achievement};
pub use heatmap::{BoardPoint, Heatmap, HeatmapEntry};
pub use player_stats::{PlayerStats, ScoreBand};
