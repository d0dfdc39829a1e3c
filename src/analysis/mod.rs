pub mod achievements;
pub mod dashboard;
pub mod hero_stats;
pub mod mastery;
pub mod models;
pub mod normalizer;
pub mod session;
pub mod streak;

use serde::{Deserialize, Serialize};

pub use achievements::{all_achievements, calculate_achievement_completion, check_achievements, Achievement, AchievementCompletion};
pub use dashboard::{build_dashboard, DashboardReport, HeroQuery, HeroSort, HeroSummary};
pub use hero_stats::HeroStatsTracker;
pub use mastery::{calculate_mastery, calculate_next_tier_requirements, MasteryConfig, MasteryResult, MasteryTier};
pub use models::{HeroAggregateStats, MatchOutcome, MatchRecord};
pub use normalizer::{normalize, NormalizedMatch, TimeBucket};
pub use session::{calculate_today_session, SessionConfig, SessionSummary};
pub use streak::{analyze_streak, get_overall_momentum, Momentum, StreakConfig, StreakResult, StreakType};

/// Tuning for every derivation stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub mastery: MasteryConfig,
    pub streak: StreakConfig,
    pub session: SessionConfig,
}
