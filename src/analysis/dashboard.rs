use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use super::achievements::{calculate_achievement_completion, check_achievements, Achievement, AchievementCompletion};
use super::mastery::{calculate_mastery_with, calculate_next_tier_requirements_with, MasteryResult, NextTierRequirement};
use super::models::HeroAggregateStats;
use super::normalizer::NormalizedMatch;
use super::session::{calculate_session_on, SessionSummary};
use super::streak::{analyze_streak_with, get_overall_momentum_with, Momentum, StreakResult};
use super::AnalysisConfig;
use crate::heroes::HeroDirectory;

/// Everything one hero card renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSummary {
    pub hero_id: i32,
    pub name: String,
    pub stats: HeroAggregateStats,
    pub mastery: MasteryResult,
    pub next_tier: NextTierRequirement,
    pub streak: StreakResult,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAchievement {
    pub hero_id: i32,
    pub hero_name: String,
    pub achievement: Achievement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub heroes: Vec<HeroSummary>,
    pub momentum: Momentum,
    pub session: SessionSummary,
    pub recent_achievements: Vec<RecentAchievement>,
    pub completion: AchievementCompletion,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeroSort {
    #[default]
    Mastery,
    Games,
    Winrate,
    Kda,
    Recent,
}

impl FromStr for HeroSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mastery" => Ok(HeroSort::Mastery),
            "games" => Ok(HeroSort::Games),
            "winrate" | "wr" => Ok(HeroSort::Winrate),
            "kda" => Ok(HeroSort::Kda),
            "recent" => Ok(HeroSort::Recent),
            other => Err(format!(
                "unknown sort '{}', expected one of: mastery, games, winrate, kda, recent",
                other
            )),
        }
    }
}

impl fmt::Display for HeroSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeroSort::Mastery => "mastery",
            HeroSort::Games => "games",
            HeroSort::Winrate => "winrate",
            HeroSort::Kda => "kda",
            HeroSort::Recent => "recent",
        };
        f.write_str(name)
    }
}

/// Search, sort and truncation applied to the hero list.
#[derive(Debug, Clone)]
pub struct HeroQuery {
    pub search: Option<String>,
    pub sort: HeroSort,
    pub top_n: Option<usize>,
    pub recent_achievements: usize,
}

impl Default for HeroQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: HeroSort::Mastery,
            top_n: None,
            recent_achievements: 5,
        }
    }
}

pub fn summarize_hero(
    stats: &HeroAggregateStats,
    matches: &[NormalizedMatch],
    heroes: &HeroDirectory,
    config: &AnalysisConfig,
) -> HeroSummary {
    let mastery = calculate_mastery_with(stats, &config.mastery);
    let next_tier = calculate_next_tier_requirements_with(stats, &mastery, &config.mastery);
    let streak = analyze_streak_with(matches, stats.hero_id, &config.streak);
    let achievements = check_achievements(stats, &mastery);

    HeroSummary {
        hero_id: stats.hero_id,
        name: heroes.name(stats.hero_id),
        stats: stats.clone(),
        mastery,
        next_tier,
        streak,
        achievements,
    }
}

pub fn build_hero_summaries(
    hero_stats: &[HeroAggregateStats],
    matches: &[NormalizedMatch],
    heroes: &HeroDirectory,
    config: &AnalysisConfig,
) -> Vec<HeroSummary> {
    hero_stats
        .iter()
        .map(|stats| summarize_hero(stats, matches, heroes, config))
        .collect()
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn compare_by(sort: HeroSort, a: &HeroSummary, b: &HeroSummary) -> Ordering {
    let primary = match sort {
        HeroSort::Mastery => compare_f64(b.mastery.score, a.mastery.score)
            .then_with(|| b.stats.games.cmp(&a.stats.games)),
        HeroSort::Games => b.stats.games.cmp(&a.stats.games),
        HeroSort::Winrate => compare_f64(b.mastery.stats.winrate, a.mastery.stats.winrate),
        HeroSort::Kda => compare_f64(b.mastery.stats.kda, a.mastery.stats.kda),
        HeroSort::Recent => b.stats.last_played.cmp(&a.stats.last_played),
    };
    primary.then_with(|| a.hero_id.cmp(&b.hero_id))
}

pub fn apply_query(summaries: Vec<HeroSummary>, query: &HeroQuery) -> Vec<HeroSummary> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut heroes: Vec<HeroSummary> = summaries
        .into_iter()
        .filter(|h| match &needle {
            Some(needle) => h.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect();

    heroes.sort_by(|a, b| compare_by(query.sort, a, b));
    if let Some(top_n) = query.top_n {
        heroes.truncate(top_n);
    }
    heroes
}

/// A stable slice of unlocked badges standing in for "recently earned".
///
/// No unlock times exist, so heroes are taken most-recently-played first and
/// each hero's badges from the end of the catalogue (the harder ones) first.
pub fn recent_achievements(summaries: &[HeroSummary], limit: usize) -> Vec<RecentAchievement> {
    let mut ordered: Vec<&HeroSummary> = summaries.iter().collect();
    ordered.sort_by_key(|h| (Reverse(h.stats.last_played), h.hero_id));

    ordered
        .into_iter()
        .flat_map(|hero| {
            hero.achievements.iter().rev().map(move |achievement| RecentAchievement {
                hero_id: hero.hero_id,
                hero_name: hero.name.clone(),
                achievement: achievement.clone(),
            })
        })
        .take(limit)
        .collect()
}

#[tracing::instrument(level = "debug", skip_all, fields(heroes = hero_stats.len(), matches = matches.len()))]
pub fn build_dashboard<Tz: TimeZone>(
    hero_stats: &[HeroAggregateStats],
    matches: &[NormalizedMatch],
    heroes: &HeroDirectory,
    config: &AnalysisConfig,
    query: &HeroQuery,
    now: &DateTime<Tz>,
) -> DashboardReport {
    let summaries = build_hero_summaries(hero_stats, matches, heroes, config);

    let all_achievements: Vec<Achievement> = summaries
        .iter()
        .flat_map(|h| h.achievements.iter().cloned())
        .collect();
    let completion = calculate_achievement_completion(&all_achievements);
    let recent = recent_achievements(&summaries, query.recent_achievements);
    let momentum = get_overall_momentum_with(matches, hero_stats, &config.streak).with_names(heroes);
    let session = calculate_session_on(matches, now.date_naive(), &now.timezone(), &config.session);

    DashboardReport {
        heroes: apply_query(summaries, query),
        momentum,
        session,
        recent_achievements: recent,
        completion,
    }
}
