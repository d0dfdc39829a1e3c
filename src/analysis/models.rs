use serde::{Deserialize, Serialize};

/// Slots below this value are on the Radiant side.
pub const RADIANT_SLOT_LIMIT: u16 = 128;

/// A single completed match from the player's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub match_id: i64,
    pub hero_id: i32,
    /// Unix timestamp (seconds)
    pub start_time: i64,
    pub duration_seconds: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub player_slot: u16,
    /// `None` when the match has no recorded winner (abandoned, unparsed)
    pub radiant_win: Option<bool>,
}

impl MatchRecord {
    pub fn is_radiant(&self) -> bool {
        self.player_slot < RADIANT_SLOT_LIMIT
    }

    /// `radiant_win == is_radiant()`, or `None` if the winner is unknown.
    pub fn is_win(&self) -> Option<bool> {
        self.radiant_win.map(|radiant_won| radiant_won == self.is_radiant())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
    Unknown,
}

impl From<Option<bool>> for MatchOutcome {
    fn from(is_win: Option<bool>) -> Self {
        match is_win {
            Some(true) => MatchOutcome::Win,
            Some(false) => MatchOutcome::Loss,
            None => MatchOutcome::Unknown,
        }
    }
}

/// Per-hero totals accumulated across every recorded match on that hero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroAggregateStats {
    pub hero_id: i32,
    pub games: u32,
    pub win: u32,
    pub sum_kills: u64,
    pub sum_deaths: u64,
    pub sum_assists: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<i64>,
}

impl HeroAggregateStats {
    pub fn new(hero_id: i32) -> Self {
        HeroAggregateStats {
            hero_id,
            ..Default::default()
        }
    }

    /// Win rate as a percentage; 0 when no games were played.
    pub fn winrate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            (self.win.min(self.games) as f64 / self.games as f64) * 100.0
        }
    }

    /// `(kills + assists) / max(deaths, 1)` over the summed totals.
    pub fn kda(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.sum_kills.saturating_add(self.sum_assists) as f64 / self.sum_deaths.max(1) as f64
    }

    pub fn losses(&self) -> u32 {
        self.games.saturating_sub(self.win)
    }

    pub fn avg_deaths(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.sum_deaths as f64 / self.games as f64
        }
    }
}
