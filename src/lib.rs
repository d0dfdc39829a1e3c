pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod heroes;
pub mod rate_limit;

pub use analysis::{
    analyze_streak, calculate_achievement_completion, calculate_mastery, calculate_next_tier_requirements,
    calculate_today_session, check_achievements, get_overall_momentum, normalize, AnalysisConfig,
};
pub use config::Config;
pub use error::AppError;
pub use heroes::HeroDirectory;
