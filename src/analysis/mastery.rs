use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::HeroAggregateStats;

/// Number of extra games searched when projecting the next tier.
const MAX_PROJECTED_WINS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl MasteryTier {
    pub fn name(&self) -> &'static str {
        match self {
            MasteryTier::Bronze => "Bronze",
            MasteryTier::Silver => "Silver",
            MasteryTier::Gold => "Gold",
            MasteryTier::Platinum => "Platinum",
            MasteryTier::Diamond => "Diamond",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MasteryTier::Bronze => "🥉",
            MasteryTier::Silver => "🥈",
            MasteryTier::Gold => "🥇",
            MasteryTier::Platinum => "💠",
            MasteryTier::Diamond => "💎",
        }
    }
}

impl fmt::Display for MasteryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBound {
    pub tier: MasteryTier,
    pub min_score: f64,
}

/// Weights and tier table for the mastery score.
///
/// The score is `games_term + winrate_term + kda_term`, clamped to
/// `[0, max_score]`:
/// - `games_term` grows with `ln(1 + games)` and saturates at `games_cap`
/// - `winrate_term` and `kda_term` are linear around their baselines and
///   clamped to `±term_limit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryConfig {
    pub games_weight: f64,
    pub games_cap: u32,
    pub winrate_baseline: f64,
    pub winrate_weight: f64,
    pub winrate_term_limit: f64,
    pub kda_baseline: f64,
    pub kda_weight: f64,
    pub kda_term_limit: f64,
    pub max_score: f64,
    pub levels_per_tier: u32,
    pub tiers: Vec<TierBound>,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            games_weight: 40.0,
            games_cap: 100,
            winrate_baseline: 50.0,
            winrate_weight: 1.0,
            winrate_term_limit: 30.0,
            kda_baseline: 2.0,
            kda_weight: 8.0,
            kda_term_limit: 30.0,
            max_score: 100.0,
            levels_per_tier: 3,
            tiers: vec![
                TierBound { tier: MasteryTier::Bronze, min_score: 0.0 },
                TierBound { tier: MasteryTier::Silver, min_score: 20.0 },
                TierBound { tier: MasteryTier::Gold, min_score: 40.0 },
                TierBound { tier: MasteryTier::Platinum, min_score: 60.0 },
                TierBound { tier: MasteryTier::Diamond, min_score: 80.0 },
            ],
        }
    }
}

impl MasteryConfig {
    pub fn validate(&self) -> Result<(), String> {
        let first = self
            .tiers
            .first()
            .ok_or_else(|| "Tier table must not be empty".to_string())?;
        if first.min_score != 0.0 {
            return Err(format!(
                "Lowest tier must start at 0, got {}",
                first.min_score
            ));
        }

        for pair in self.tiers.windows(2) {
            if pair[1].min_score <= pair[0].min_score || pair[1].tier <= pair[0].tier {
                return Err(format!(
                    "Tier {} must have a higher bound than {}",
                    pair[1].tier, pair[0].tier
                ));
            }
        }

        if let Some(last) = self.tiers.last() {
            if last.min_score >= self.max_score {
                return Err(format!(
                    "Top tier bound {} must be below max score {}",
                    last.min_score, self.max_score
                ));
            }
        }

        if self.levels_per_tier == 0 {
            return Err("levels_per_tier must be at least 1".to_string());
        }
        if self.games_cap == 0 {
            return Err("games_cap must be at least 1".to_string());
        }
        if self.games_weight < 0.0 || self.winrate_weight < 0.0 || self.kda_weight < 0.0 {
            return Err("Mastery weights must be non-negative".to_string());
        }

        Ok(())
    }

    fn lowest_tier(&self) -> MasteryTier {
        self.tiers
            .first()
            .map(|bound| bound.tier)
            .unwrap_or(MasteryTier::Bronze)
    }

    fn games_term(&self, games: u32) -> f64 {
        let cap = self.games_cap.max(1) as f64;
        let factor = ((games as f64).ln_1p() / cap.ln_1p()).min(1.0);
        factor * self.games_weight
    }

    fn winrate_term(&self, winrate: f64) -> f64 {
        ((winrate - self.winrate_baseline) * self.winrate_weight)
            .clamp(-self.winrate_term_limit, self.winrate_term_limit)
    }

    fn kda_term(&self, kda: f64) -> f64 {
        ((kda - self.kda_baseline) * self.kda_weight)
            .clamp(-self.kda_term_limit, self.kda_term_limit)
    }

    fn score(&self, games: u32, winrate: f64, kda: f64) -> f64 {
        if games == 0 {
            return 0.0;
        }
        let raw = self.games_term(games) + self.winrate_term(winrate) + self.kda_term(kda);
        raw.clamp(0.0, self.max_score)
    }

    fn tier_index(&self, score: f64) -> usize {
        self.tiers
            .iter()
            .rposition(|bound| bound.min_score <= score)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryStats {
    pub winrate: f64,
    pub kda: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryResult {
    pub tier: MasteryTier,
    /// 1-based sub-level within the tier
    pub level: u32,
    /// Percentage toward the next tier; 100 at the top tier
    pub progress: u8,
    pub score: f64,
    pub is_max_tier: bool,
    pub stats: MasteryStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTierRequirement {
    pub message: String,
    pub is_max_tier: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tier: Option<MasteryTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wins_needed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kda_needed: Option<f64>,
}

pub fn calculate_mastery(stats: &HeroAggregateStats) -> MasteryResult {
    calculate_mastery_with(stats, &MasteryConfig::default())
}

#[tracing::instrument(level = "trace", skip(config), fields(hero_id = stats.hero_id))]
pub fn calculate_mastery_with(stats: &HeroAggregateStats, config: &MasteryConfig) -> MasteryResult {
    let winrate = stats.winrate();
    let kda = stats.kda();

    if stats.games == 0 {
        return MasteryResult {
            tier: config.lowest_tier(),
            level: 1,
            progress: 0,
            score: 0.0,
            is_max_tier: false,
            stats: MasteryStats { winrate, kda },
        };
    }

    let score = config.score(stats.games, winrate, kda);
    let index = config.tier_index(score);
    let lower = config.tiers.get(index).map(|b| b.min_score).unwrap_or(0.0);
    let next = config.tiers.get(index + 1);
    let upper = next.map(|b| b.min_score).unwrap_or(config.max_score);

    let span = upper - lower;
    let fraction = if span > 0.0 {
        ((score - lower) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let levels = config.levels_per_tier.max(1);
    let level = ((fraction * levels as f64).floor() as u32 + 1).min(levels);
    let progress = match next {
        Some(_) => (fraction * 100.0).floor().min(99.0) as u8,
        None => 100,
    };

    tracing::trace!(score, index, level, progress, "mastery scored");

    MasteryResult {
        tier: config.tiers.get(index).map(|b| b.tier).unwrap_or(MasteryTier::Bronze),
        level,
        progress,
        score,
        is_max_tier: next.is_none(),
        stats: MasteryStats { winrate, kda },
    }
}

pub fn calculate_next_tier_requirements(
    stats: &HeroAggregateStats,
    mastery: &MasteryResult,
) -> NextTierRequirement {
    calculate_next_tier_requirements_with(stats, mastery, &MasteryConfig::default())
}

/// Inverts the score for the next tier's lower bound.
///
/// First projects consecutive wins at the current KDA; if that never
/// reaches the bound, falls back to the KDA needed at the current record.
#[tracing::instrument(level = "trace", skip_all, fields(hero_id = stats.hero_id, tier = %mastery.tier))]
pub fn calculate_next_tier_requirements_with(
    stats: &HeroAggregateStats,
    mastery: &MasteryResult,
    config: &MasteryConfig,
) -> NextTierRequirement {
    let next = config
        .tiers
        .iter()
        .find(|bound| bound.tier > mastery.tier)
        .copied();

    let Some(next) = next else {
        return NextTierRequirement {
            message: "Maximum tier reached".to_string(),
            is_max_tier: true,
            target_tier: None,
            wins_needed: None,
            kda_needed: None,
        };
    };

    let kda = stats.kda();
    let wins_needed = (1..=MAX_PROJECTED_WINS).find(|&extra| {
        let games = stats.games.saturating_add(extra);
        let wins = stats.win.min(stats.games).saturating_add(extra);
        let winrate = wins as f64 / games as f64 * 100.0;
        config.score(games, winrate, kda) >= next.min_score
    });

    if let Some(wins) = wins_needed {
        let plural = if wins == 1 { "win" } else { "wins" };
        return NextTierRequirement {
            message: format!("{} more {} needed for {}", wins, plural, next.tier),
            is_max_tier: false,
            target_tier: Some(next.tier),
            wins_needed: Some(wins),
            kda_needed: None,
        };
    }

    let games = stats.games.max(1);
    let missing = next.min_score - config.games_term(games) - config.winrate_term(stats.winrate());
    let reachable = config.kda_weight > 0.0 && missing <= config.kda_term_limit;

    if reachable {
        let target_kda = (config.kda_baseline + missing / config.kda_weight).max(0.0);
        NextTierRequirement {
            message: format!("Raise KDA to {:.1} to reach {}", target_kda, next.tier),
            is_max_tier: false,
            target_tier: Some(next.tier),
            wins_needed: None,
            kda_needed: Some(target_kda),
        }
    } else {
        NextTierRequirement {
            message: format!("Improve win rate and KDA to reach {}", next.tier),
            is_max_tier: false,
            target_tier: Some(next.tier),
            wins_needed: None,
            kda_needed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stats(games: u32, win: u32, kills: u64, deaths: u64, assists: u64) -> HeroAggregateStats {
        HeroAggregateStats {
            hero_id: 1,
            games,
            win,
            sum_kills: kills,
            sum_deaths: deaths,
            sum_assists: assists,
            last_played: None,
        }
    }

    fn rank(result: &MasteryResult) -> (MasteryTier, u32, u8) {
        (result.tier, result.level, result.progress)
    }

    #[test]
    fn zero_games_is_lowest_tier_without_progress() {
        let result = calculate_mastery(&stats(0, 0, 12, 0, 4));
        assert_eq!(result.tier, MasteryTier::Bronze);
        assert_eq!(result.progress, 0);
        assert_eq!(result.level, 1);
        assert!(!result.is_max_tier);
    }

    #[test]
    fn strong_record_beats_weak_record() {
        let strong = calculate_mastery(&stats(10, 7, 70, 30, 50));
        let weak = calculate_mastery(&stats(10, 3, 70, 30, 50));

        assert_eq!(strong.stats.winrate, 70.0);
        assert!((strong.stats.kda - 4.0).abs() < 1e-9);
        assert_eq!(strong.tier, MasteryTier::Gold);
        assert!(strong.tier > weak.tier);
    }

    #[rstest]
    #[case(10)]
    #[case(25)]
    #[case(60)]
    #[case(250)]
    fn more_wins_never_lower_mastery(#[case] games: u32) {
        let mut previous = calculate_mastery(&stats(games, 0, 40, 50, 60));
        for win in 1..=games {
            let current = calculate_mastery(&stats(games, win, 40, 50, 60));
            assert!(
                rank(&current) >= rank(&previous),
                "win={} dropped from {:?} to {:?}",
                win,
                rank(&previous),
                rank(&current)
            );
            previous = current;
        }
    }

    #[test]
    fn more_games_never_lower_mastery() {
        let mut previous = calculate_mastery(&stats(1, 1, 6, 2, 6));
        for games in 2..=300 {
            let current = calculate_mastery(&stats(games, games, 6 * games as u64, 2 * games as u64, 6 * games as u64));
            assert!(rank(&current) >= rank(&previous));
            previous = current;
        }
    }

    #[test]
    fn top_tier_saturates_progress() {
        let result = calculate_mastery(&stats(400, 320, 4000, 400, 4000));
        assert_eq!(result.tier, MasteryTier::Diamond);
        assert!(result.is_max_tier);
        assert_eq!(result.progress, 100);

        let next = calculate_next_tier_requirements(&stats(400, 320, 4000, 400, 4000), &result);
        assert!(next.is_max_tier);
        assert_eq!(next.wins_needed, None);
        assert_eq!(next.target_tier, None);
    }

    #[test]
    fn progress_stays_in_range() {
        for win in 0..=50 {
            let result = calculate_mastery(&stats(50, win, 200, 150, 300));
            assert!(result.progress <= 100);
            assert!(result.level >= 1 && result.level <= 3);
        }
    }

    #[test]
    fn next_tier_wins_are_sufficient_and_minimal() {
        let base = stats(10, 3, 70, 30, 50);
        let mastery = calculate_mastery(&base);
        let next = calculate_next_tier_requirements(&base, &mastery);

        let wins = next.wins_needed.expect("reachable by winning");
        assert_eq!(next.target_tier, Some(MasteryTier::Silver));
        assert!(next.message.contains("Silver"));

        let scale = |extra: u32| {
            let mut projected = base.clone();
            projected.games += extra;
            projected.win += extra;
            // keep KDA constant
            let factor = projected.games as u64;
            projected.sum_kills = 7 * factor;
            projected.sum_deaths = 3 * factor;
            projected.sum_assists = 5 * factor;
            calculate_mastery(&projected)
        };
        assert!(scale(wins).tier >= MasteryTier::Silver);
        if wins > 1 {
            assert_eq!(scale(wins - 1).tier, MasteryTier::Bronze);
        }
    }

    #[test]
    fn projection_near_u32_max_does_not_overflow() {
        let near_max = stats(u32::MAX - 3, 0, 1, 1_000_000, 1);
        let mastery = calculate_mastery(&near_max);
        let next = calculate_next_tier_requirements(&near_max, &mastery);
        assert!(!next.is_max_tier);
        assert_eq!(next.target_tier, Some(MasteryTier::Silver));
    }

    #[test]
    fn hopeless_kda_asks_for_kda_instead() {
        let config = MasteryConfig {
            games_weight: 0.0,
            winrate_weight: 0.0,
            ..MasteryConfig::default()
        };
        let base = stats(20, 10, 10, 40, 10);
        let mastery = calculate_mastery_with(&base, &config);
        assert_eq!(mastery.tier, MasteryTier::Bronze);

        let next = calculate_next_tier_requirements_with(&base, &mastery, &config);
        assert_eq!(next.wins_needed, None);
        let kda = next.kda_needed.expect("kda target");
        assert!((kda - 4.5).abs() < 1e-9);
        assert_eq!(next.message, "Raise KDA to 4.5 to reach Silver");
    }

    #[test]
    fn default_config_is_valid() {
        assert!(MasteryConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unordered_tiers() {
        let mut config = MasteryConfig::default();
        config.tiers.swap(1, 2);
        assert!(config.validate().is_err());

        let empty = MasteryConfig {
            tiers: Vec::new(),
            ..MasteryConfig::default()
        };
        assert!(empty.validate().is_err());
    }
}
