use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;

use super::models::HeroAggregateStats;
use super::normalizer::NormalizedMatch;
use crate::heroes::HeroDirectory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakConfig {
    /// Trailing window size for the win/loss record
    pub window: usize,
    /// Shortest active streak reported as momentum
    pub momentum_min_streak: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            window: 10,
            momentum_min_streak: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakType {
    Win,
    Loss,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinLossRecord {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResult {
    pub streak_type: StreakType,
    pub current_streak: u32,
    pub win_loss_record: WinLossRecord,
    pub games_analyzed: u32,
}

impl StreakResult {
    pub fn empty() -> Self {
        StreakResult {
            streak_type: StreakType::None,
            current_streak: 0,
            win_loss_record: WinLossRecord::default(),
            games_analyzed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroStreak {
    pub hero_id: i32,
    pub hero_name: String,
    pub current_streak: u32,
    /// Start time of the hero's most recent match
    pub last_played: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Momentum {
    pub hot_streak: Option<HeroStreak>,
    pub cold_spell: Option<HeroStreak>,
}

impl Momentum {
    /// Resolves hero names for both picks.
    pub fn with_names(mut self, heroes: &HeroDirectory) -> Self {
        for streak in self.hot_streak.iter_mut().chain(self.cold_spell.iter_mut()) {
            streak.hero_name = heroes.name(streak.hero_id);
        }
        self
    }
}

/// Sorts newest-first; ties fall back to the higher match id.
pub(crate) fn newest_first<'a, I>(matches: I) -> Vec<&'a NormalizedMatch>
where
    I: IntoIterator<Item = &'a NormalizedMatch>,
{
    let mut sorted: Vec<&NormalizedMatch> = matches.into_iter().collect();
    sorted.sort_by_key(|m| Reverse((m.record.start_time, m.record.match_id)));
    sorted
}

/// Consecutive identical outcomes from the front of a newest-first list.
pub(crate) fn current_run(sorted: &[&NormalizedMatch]) -> (StreakType, u32) {
    let first = match sorted.first().and_then(|m| m.is_win) {
        Some(first) => first,
        None => return (StreakType::None, 0),
    };

    let length = sorted
        .iter()
        .take_while(|m| m.is_win == Some(first))
        .count() as u32;

    let streak_type = if first { StreakType::Win } else { StreakType::Loss };
    (streak_type, length)
}

pub(crate) fn win_loss(sorted: &[&NormalizedMatch]) -> WinLossRecord {
    sorted
        .iter()
        .fold(WinLossRecord::default(), |mut record, m| {
            match m.is_win {
                Some(true) => record.wins += 1,
                Some(false) => record.losses += 1,
                None => {}
            }
            record
        })
}

pub fn analyze_streak(matches: &[NormalizedMatch], hero_id: i32) -> StreakResult {
    analyze_streak_with(matches, hero_id, &StreakConfig::default())
}

/// Streak and trailing record for one hero.
///
/// Input order is not trusted; matches are re-sorted newest-first. The
/// streak walk is bounded by the same window as the record, so
/// `current_streak <= games_analyzed` always holds.
#[tracing::instrument(level = "trace", skip(matches, config))]
pub fn analyze_streak_with(
    matches: &[NormalizedMatch],
    hero_id: i32,
    config: &StreakConfig,
) -> StreakResult {
    let sorted = newest_first(matches.iter().filter(|m| m.hero_id() == hero_id));
    let window = &sorted[..sorted.len().min(config.window)];

    if window.is_empty() {
        return StreakResult::empty();
    }

    let (streak_type, current_streak) = current_run(window);

    StreakResult {
        streak_type,
        current_streak,
        win_loss_record: win_loss(window),
        games_analyzed: window.len() as u32,
    }
}

pub fn get_overall_momentum(matches: &[NormalizedMatch], hero_stats: &[HeroAggregateStats]) -> Momentum {
    get_overall_momentum_with(matches, hero_stats, &StreakConfig::default())
}

/// Longest active win streak and longest active loss streak across heroes.
///
/// Ties go to the hero played most recently, then to the lower hero id.
#[tracing::instrument(level = "trace", skip_all)]
pub fn get_overall_momentum_with(
    matches: &[NormalizedMatch],
    hero_stats: &[HeroAggregateStats],
    config: &StreakConfig,
) -> Momentum {
    let hero_ids: BTreeSet<i32> = hero_stats.iter().map(|s| s.hero_id).collect();

    let mut hot: Vec<HeroStreak> = Vec::new();
    let mut cold: Vec<HeroStreak> = Vec::new();

    for hero_id in hero_ids {
        let streak = analyze_streak_with(matches, hero_id, config);
        if streak.current_streak < config.momentum_min_streak.max(1) {
            continue;
        }

        let last_played = matches
            .iter()
            .filter(|m| m.hero_id() == hero_id)
            .map(|m| m.start_time())
            .max()
            .unwrap_or(0);

        let entry = HeroStreak {
            hero_id,
            hero_name: HeroDirectory::default().name(hero_id),
            current_streak: streak.current_streak,
            last_played,
        };

        match streak.streak_type {
            StreakType::Win => hot.push(entry),
            StreakType::Loss => cold.push(entry),
            StreakType::None => {}
        }
    }

    let pick = |candidates: Vec<HeroStreak>| {
        candidates
            .into_iter()
            .max_by_key(|s| (s.current_streak, s.last_played, Reverse(s.hero_id)))
    };

    let momentum = Momentum {
        hot_streak: pick(hot),
        cold_spell: pick(cold),
    };
    tracing::debug!(?momentum, "momentum computed");
    momentum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::MatchRecord;
    use crate::analysis::normalizer::normalize_in;
    use chrono::Utc;
    use rstest::rstest;

    fn game(match_id: i64, hero_id: i32, start_time: i64, is_win: Option<bool>) -> NormalizedMatch {
        let record = MatchRecord {
            match_id,
            hero_id,
            start_time,
            duration_seconds: 1800,
            kills: 5,
            deaths: 5,
            assists: 5,
            player_slot: 0,
            radiant_win: is_win,
        };
        normalize_in(&record, &Utc)
    }

    /// Builds a newest-first history for one hero from outcomes.
    fn history(hero_id: i32, outcomes: &[Option<bool>]) -> Vec<NormalizedMatch> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, won)| game(i as i64 + hero_id as i64 * 1000, hero_id, 10_000 - i as i64 * 100, *won))
            .collect()
    }

    const W: Option<bool> = Some(true);
    const L: Option<bool> = Some(false);

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(analyze_streak(&[], 1), StreakResult::empty());
        assert_eq!(analyze_streak(&history(2, &[W, W]), 1), StreakResult::empty());
    }

    #[test]
    fn three_losses_is_a_loss_streak() {
        let result = analyze_streak(&history(1, &[L, L, L]), 1);
        assert_eq!(result.streak_type, StreakType::Loss);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.win_loss_record, WinLossRecord { wins: 0, losses: 3 });
        assert_eq!(result.games_analyzed, 3);
    }

    #[rstest]
    #[case(&[W, L, W, L, W, L], StreakType::Win)]
    #[case(&[L, W, L, W], StreakType::Loss)]
    fn alternating_outcomes_give_streak_of_one(#[case] outcomes: &[Option<bool>], #[case] expected: StreakType) {
        let result = analyze_streak(&history(1, outcomes), 1);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.streak_type, expected);
    }

    #[test]
    fn unsorted_input_is_sorted_before_walking() {
        let mut matches = history(1, &[W, W, L, L]);
        matches.reverse();
        let result = analyze_streak(&matches, 1);
        assert_eq!(result.streak_type, StreakType::Win);
        assert_eq!(result.current_streak, 2);
    }

    #[test]
    fn unknown_latest_outcome_has_no_streak() {
        let result = analyze_streak(&history(1, &[None, W, W]), 1);
        assert_eq!(result.streak_type, StreakType::None);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.win_loss_record, WinLossRecord { wins: 2, losses: 0 });
        assert_eq!(result.games_analyzed, 3);
    }

    #[test]
    fn unknown_outcome_stops_the_walk() {
        let result = analyze_streak(&history(1, &[W, W, None, W]), 1);
        assert_eq!(result.current_streak, 2);
    }

    #[test]
    fn record_is_bounded_by_window() {
        let config = StreakConfig { window: 3, ..StreakConfig::default() };
        let result = analyze_streak_with(&history(1, &[W, W, W, W, L, L]), 1, &config);
        assert_eq!(result.games_analyzed, 3);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.win_loss_record, WinLossRecord { wins: 3, losses: 0 });
    }

    #[test]
    fn streak_never_exceeds_filtered_length() {
        let outcomes = [W, W, L, W, W, W, W, W, W, W, W, W, W, L];
        for len in 0..=outcomes.len() {
            let matches = history(1, &outcomes[..len]);
            let result = analyze_streak(&matches, 1);
            assert!(result.current_streak as usize <= matches.len());
            assert!(result.current_streak <= result.games_analyzed);
        }
    }

    fn hero(hero_id: i32) -> HeroAggregateStats {
        HeroAggregateStats::new(hero_id)
    }

    #[test]
    fn momentum_picks_hot_and_cold_heroes() {
        let mut matches = history(1, &[W, W, W, W, W, L]);
        matches.extend(history(2, &[L, L, L, L, W]));
        matches.extend(history(3, &[W, W, L]));

        let momentum = get_overall_momentum(&matches, &[hero(1), hero(2), hero(3)]);
        let hot = momentum.hot_streak.expect("hot streak");
        let cold = momentum.cold_spell.expect("cold spell");
        assert_eq!((hot.hero_id, hot.current_streak), (1, 5));
        assert_eq!((cold.hero_id, cold.current_streak), (2, 4));
    }

    #[test]
    fn momentum_requires_minimum_streak() {
        let mut matches = history(1, &[W, L]);
        matches.extend(history(2, &[L, W]));
        let momentum = get_overall_momentum(&matches, &[hero(1), hero(2)]);
        assert_eq!(momentum, Momentum::default());
    }

    #[test]
    fn momentum_ties_prefer_most_recent() {
        let mut matches = history(1, &[W, W, W]);
        let mut later = history(2, &[W, W, W]);
        for m in &mut later {
            m.record.start_time += 50;
        }
        matches.extend(later);

        let momentum = get_overall_momentum(&matches, &[hero(1), hero(2)]);
        assert_eq!(momentum.hot_streak.map(|h| h.hero_id), Some(2));
        assert_eq!(momentum.cold_spell, None);
    }

    #[test]
    fn names_resolve_from_directory() {
        let matches = history(8, &[W, W, W]);
        let momentum = get_overall_momentum(&matches, &[hero(8)]);
        assert_eq!(momentum.hot_streak.as_ref().map(|h| h.hero_name.as_str()), Some("Hero 8"));

        let named = momentum.with_names(&HeroDirectory::new([(8, "Juggernaut")]));
        assert_eq!(named.hot_streak.map(|h| h.hero_name), Some("Juggernaut".to_string()));
    }

    #[test]
    fn analysis_is_repeatable() {
        let matches = history(7, &[W, L, L, W]);
        assert_eq!(analyze_streak(&matches, 7), analyze_streak(&matches, 7));
    }
}
