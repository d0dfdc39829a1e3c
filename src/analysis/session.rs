use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::normalizer::{start_instant, NormalizedMatch};
use super::streak::{current_run, newest_first, win_loss, StreakType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Flat MMR swing applied per decided match
    pub mmr_per_match: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { mmr_per_match: 25 }
    }
}

/// Today's results. `estimated_mmr_change` is a flat per-match estimate, not
/// a value reported by the stats API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub wins: u32,
    pub losses: u32,
    pub current_streak: u32,
    pub streak_type: StreakType,
    pub estimated_mmr_change: i32,
    pub games_played: u32,
}

impl SessionSummary {
    pub fn empty() -> Self {
        SessionSummary {
            wins: 0,
            losses: 0,
            current_streak: 0,
            streak_type: StreakType::None,
            estimated_mmr_change: 0,
            games_played: 0,
        }
    }
}

pub fn calculate_today_session(matches: &[NormalizedMatch]) -> SessionSummary {
    let today = Local::now().date_naive();
    calculate_session_on(matches, today, &Local, &SessionConfig::default())
}

/// Folds the matches that started on `day` (calendar date in `tz`).
#[tracing::instrument(level = "trace", skip(matches, tz, config))]
pub fn calculate_session_on<Tz: TimeZone>(
    matches: &[NormalizedMatch],
    day: NaiveDate,
    tz: &Tz,
    config: &SessionConfig,
) -> SessionSummary {
    let todays = newest_first(
        matches
            .iter()
            .filter(|m| start_instant(m.start_time()).with_timezone(tz).date_naive() == day),
    );

    if todays.is_empty() {
        return SessionSummary::empty();
    }

    let record = win_loss(&todays);
    let (streak_type, current_streak) = current_run(&todays);
    let net = record.wins as i64 - record.losses as i64;
    let estimated_mmr_change = net
        .saturating_mul(config.mmr_per_match as i64)
        .clamp(i32::MIN as i64, i32::MAX as i64) as i32;

    let summary = SessionSummary {
        wins: record.wins,
        losses: record.losses,
        current_streak,
        streak_type,
        estimated_mmr_change,
        games_played: todays.len() as u32,
    };
    tracing::debug!(?summary, "session folded");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::MatchRecord;
    use crate::analysis::normalizer::normalize_in;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    fn game(match_id: i64, start_time: i64, is_win: Option<bool>) -> NormalizedMatch {
        let record = MatchRecord {
            match_id,
            hero_id: 1,
            start_time,
            duration_seconds: 2400,
            kills: 1,
            deaths: 1,
            assists: 1,
            player_slot: 0,
            radiant_win: is_win,
        };
        normalize_in(&record, &Utc)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-03-10 00:00:00 UTC
    const MIDNIGHT: i64 = 1_710_028_800;

    #[test]
    fn empty_input_is_all_zero() {
        let summary = calculate_session_on(&[], day(2024, 3, 10), &Utc, &SessionConfig::default());
        assert_eq!(summary, SessionSummary::empty());
    }

    #[test]
    fn only_todays_matches_count() {
        let matches = vec![
            game(1, MIDNIGHT - 60, Some(true)),
            game(2, MIDNIGHT + 3_600, Some(false)),
            game(3, MIDNIGHT + 7_200, Some(true)),
            game(4, MIDNIGHT + 10_800, Some(true)),
            game(5, MIDNIGHT + 86_400, Some(false)),
        ];

        let summary = calculate_session_on(&matches, day(2024, 3, 10), &Utc, &SessionConfig::default());
        assert_eq!(
            summary,
            SessionSummary {
                wins: 2,
                losses: 1,
                current_streak: 2,
                streak_type: StreakType::Win,
                estimated_mmr_change: 25,
                games_played: 3,
            }
        );
    }

    #[test]
    fn local_zone_decides_the_day() {
        let matches = vec![game(1, MIDNIGHT - 60, Some(false))];
        let berlin = FixedOffset::east_opt(3600).unwrap();

        let summary = calculate_session_on(&matches, day(2024, 3, 10), &berlin, &SessionConfig::default());
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.estimated_mmr_change, -25);

        let utc = calculate_session_on(&matches, day(2024, 3, 10), &Utc, &SessionConfig::default());
        assert_eq!(utc.games_played, 0);
    }

    #[test]
    fn unknown_outcomes_are_played_but_not_scored() {
        let matches = vec![
            game(1, MIDNIGHT + 100, Some(false)),
            game(2, MIDNIGHT + 200, None),
        ];
        let config = SessionConfig { mmr_per_match: 30 };

        let summary = calculate_session_on(&matches, day(2024, 3, 10), &Utc, &config);
        assert_eq!(summary.games_played, 2);
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.streak_type, StreakType::None);
        assert_eq!(summary.estimated_mmr_change, -30);
    }

    #[test]
    fn huge_mmr_delta_saturates() {
        let matches: Vec<NormalizedMatch> = (0..3)
            .map(|i| game(i, MIDNIGHT + 100 * (i + 1), Some(true)))
            .collect();
        let config = SessionConfig { mmr_per_match: 1_000_000_000 };

        let summary = calculate_session_on(&matches, day(2024, 3, 10), &Utc, &config);
        assert_eq!(summary.wins, 3);
        assert_eq!(summary.estimated_mmr_change, i32::MAX);
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut matches = vec![
            game(1, MIDNIGHT + 100, Some(true)),
            game(2, MIDNIGHT + 200, Some(false)),
            game(3, MIDNIGHT + 300, Some(false)),
        ];
        let forward = calculate_session_on(&matches, day(2024, 3, 10), &Utc, &SessionConfig::default());
        matches.reverse();
        let backward = calculate_session_on(&matches, day(2024, 3, 10), &Utc, &SessionConfig::default());

        assert_eq!(forward, backward);
        assert_eq!(forward.streak_type, StreakType::Loss);
        assert_eq!(forward.current_streak, 2);
    }
}
