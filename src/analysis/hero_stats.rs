use std::collections::HashMap;

use super::models::HeroAggregateStats;
use super::normalizer::NormalizedMatch;

/// Folds matches into per-hero totals.
pub struct HeroStatsTracker {
    stats: HashMap<i32, HeroAggregateStats>,
}

impl HeroStatsTracker {
    pub fn new() -> Self {
        HeroStatsTracker {
            stats: HashMap::new(),
        }
    }

    pub fn from_matches(matches: &[NormalizedMatch]) -> Self {
        let mut tracker = Self::new();
        for m in matches {
            tracker.add_match(m);
        }
        tracker
    }

    pub fn add_match(&mut self, normalized: &NormalizedMatch) {
        let record = &normalized.record;
        let entry = self
            .stats
            .entry(record.hero_id)
            .or_insert_with(|| HeroAggregateStats::new(record.hero_id));

        entry.games += 1;
        if normalized.is_win == Some(true) {
            entry.win += 1;
        }
        entry.sum_kills += record.kills as u64;
        entry.sum_deaths += record.deaths as u64;
        entry.sum_assists += record.assists as u64;
        entry.last_played = entry.last_played.max(Some(record.start_time));
    }

    /// Swaps in lifetime games/wins reported by the API.
    ///
    /// Kill/death/assist sums are scaled by the same factor so per-game
    /// averages stay as folded. Heroes without folded matches are skipped
    /// since there is no KDA data for them. Returns whether anything changed.
    pub fn merge_api_totals(&mut self, hero_id: i32, games: u32, win: u32, last_played: Option<i64>) -> bool {
        let Some(entry) = self.stats.get_mut(&hero_id) else {
            return false;
        };
        if games <= entry.games {
            return false;
        }

        let scale = games as f64 / entry.games as f64;
        entry.sum_kills = (entry.sum_kills as f64 * scale).round() as u64;
        entry.sum_deaths = (entry.sum_deaths as f64 * scale).round() as u64;
        entry.sum_assists = (entry.sum_assists as f64 * scale).round() as u64;
        entry.games = games;
        entry.win = win.min(games);
        entry.last_played = entry.last_played.max(last_played);
        true
    }

    /// All heroes, ordered by hero id.
    pub fn get_stats(&self) -> Vec<HeroAggregateStats> {
        let mut stats: Vec<HeroAggregateStats> = self.stats.values().cloned().collect();
        stats.sort_by_key(|s| s.hero_id);
        stats
    }

    pub fn get_hero(&self, hero_id: i32) -> Option<HeroAggregateStats> {
        self.stats.get(&hero_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl Default for HeroStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
