//! Hero achievement badges.
//!
//! Membership is a pure function of a hero's aggregate stats and mastery; nothing
//! here is persisted, so the list is re-derived on every refresh.

use serde::Serialize;
use std::collections::BTreeSet;

use super::mastery::{MasteryResult, MasteryTier};
use super::models::HeroAggregateStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    /// Position in the catalogue. There are no unlock timestamps, so this is
    /// the only ordering key available.
    pub unlock_rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementCompletion {
    pub earned: usize,
    pub total: usize,
    pub percentage: u32,
}

type UnlockRule = fn(&HeroAggregateStats, &MasteryResult) -> bool;

struct Rule {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    emoji: &'static str,
    unlocked: UnlockRule,
}

/// Evaluation order. Heroes with no games never reach a rule.
const CATALOGUE: [Rule; 12] = [
    Rule {
        id: "first_victory",
        name: "First Victory",
        description: "Win a game on this hero",
        emoji: "🩸",
        unlocked: |s, _| s.win >= 1,
    },
    Rule {
        id: "veteran",
        name: "Veteran",
        description: "Play 25 games on this hero",
        emoji: "🎖️",
        unlocked: |s, _| s.games >= 25,
    },
    Rule {
        id: "centurion",
        name: "Centurion",
        description: "Play 100 games on this hero",
        emoji: "💯",
        unlocked: |s, _| s.games >= 100,
    },
    Rule {
        id: "dominator",
        name: "Dominator",
        description: "Hold a 60%+ win rate over 10+ games",
        emoji: "👑",
        unlocked: |s, m| s.games >= 10 && m.stats.winrate >= 60.0,
    },
    Rule {
        id: "perfectionist",
        name: "Perfectionist",
        description: "Hold a 75%+ win rate over 20+ games",
        emoji: "🌟",
        unlocked: |s, m| s.games >= 20 && m.stats.winrate >= 75.0,
    },
    Rule {
        id: "unstoppable",
        name: "Unstoppable",
        description: "Keep a KDA of 5.0+ over 5+ games",
        emoji: "⚡",
        unlocked: |s, m| s.games >= 5 && m.stats.kda >= 5.0,
    },
    Rule {
        id: "survivor",
        name: "Survivor",
        description: "Average 3 or fewer deaths over 10+ games",
        emoji: "🛡️",
        unlocked: |s, _| s.games >= 10 && s.avg_deaths() <= 3.0,
    },
    Rule {
        id: "slayer",
        name: "Slayer",
        description: "Score 500 kills on this hero",
        emoji: "⚔️",
        unlocked: |s, _| s.sum_kills >= 500,
    },
    Rule {
        id: "team_player",
        name: "Team Player",
        description: "Collect 1000 assists on this hero",
        emoji: "🤝",
        unlocked: |s, _| s.sum_assists >= 1000,
    },
    Rule {
        id: "gold_mastery",
        name: "Gold Mastery",
        description: "Reach Gold mastery",
        emoji: "🥇",
        unlocked: |_, m| m.tier >= MasteryTier::Gold,
    },
    Rule {
        id: "platinum_mastery",
        name: "Platinum Mastery",
        description: "Reach Platinum mastery",
        emoji: "💠",
        unlocked: |_, m| m.tier >= MasteryTier::Platinum,
    },
    Rule {
        id: "diamond_mastery",
        name: "Diamond Mastery",
        description: "Reach Diamond mastery",
        emoji: "💎",
        unlocked: |_, m| m.tier >= MasteryTier::Diamond,
    },
];

impl Rule {
    fn achievement(&self, unlock_rank: usize) -> Achievement {
        Achievement {
            id: self.id,
            name: self.name,
            description: self.description,
            emoji: self.emoji,
            unlock_rank,
        }
    }
}

/// Every achievement in catalogue order.
pub fn all_achievements() -> Vec<Achievement> {
    CATALOGUE
        .iter()
        .enumerate()
        .map(|(rank, rule)| rule.achievement(rank))
        .collect()
}

pub fn total_achievements() -> usize {
    CATALOGUE.len()
}

/// Unlocked achievements, in catalogue order.
#[tracing::instrument(level = "trace", skip_all, fields(hero_id = stats.hero_id))]
pub fn check_achievements(stats: &HeroAggregateStats, mastery: &MasteryResult) -> Vec<Achievement> {
    if stats.games == 0 {
        return Vec::new();
    }

    CATALOGUE
        .iter()
        .enumerate()
        .filter(|(_, rule)| (rule.unlocked)(stats, mastery))
        .map(|(rank, rule)| rule.achievement(rank))
        .collect()
}

/// Share of the catalogue earned. Duplicate ids (from several heroes) count once.
#[tracing::instrument(level = "trace", skip_all, fields(achievements = achievements.len()))]
pub fn calculate_achievement_completion(achievements: &[Achievement]) -> AchievementCompletion {
    let total = total_achievements();
    let earned = achievements
        .iter()
        .map(|a| a.id)
        .collect::<BTreeSet<_>>()
        .len()
        .min(total);

    let percentage = if total == 0 {
        0
    } else {
        (earned as f64 / total as f64 * 100.0).round() as u32
    };

    AchievementCompletion {
        earned,
        total,
        percentage,
    }
}
