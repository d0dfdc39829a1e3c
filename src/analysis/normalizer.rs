use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use serde::Serialize;

use super::models::{MatchOutcome, MatchRecord};

/// Part of the day a match started in, in the viewer's time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeBucket {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeBucket::Night,
            6..=11 => TimeBucket::Morning,
            12..=17 => TimeBucket::Afternoon,
            _ => TimeBucket::Evening,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMatch {
    #[serde(flatten)]
    pub record: MatchRecord,
    pub is_win: Option<bool>,
    pub kda: f64,
    pub duration_minutes: u32,
    pub time_bucket: TimeBucket,
}

impl NormalizedMatch {
    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome::from(self.is_win)
    }

    pub fn hero_id(&self) -> i32 {
        self.record.hero_id
    }

    pub fn start_time(&self) -> i64 {
        self.record.start_time
    }
}

/// Start time as a UTC instant; out-of-range timestamps collapse to the epoch.
pub(crate) fn start_instant(start_time: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(start_time, 0).unwrap_or_default()
}

pub fn normalize(record: &MatchRecord) -> NormalizedMatch {
    normalize_in(record, &Local)
}

#[tracing::instrument(level = "trace", skip_all, fields(match_id = record.match_id))]
pub fn normalize_in<Tz: TimeZone>(record: &MatchRecord, tz: &Tz) -> NormalizedMatch {
    let deaths = record.deaths.max(1);
    let kda = (record.kills as u64 + record.assists as u64) as f64 / deaths as f64;
    let local_hour = start_instant(record.start_time).with_timezone(tz).hour();

    NormalizedMatch {
        record: record.clone(),
        is_win: record.is_win(),
        kda,
        duration_minutes: record.duration_seconds / 60,
        time_bucket: TimeBucket::from_hour(local_hour),
    }
}

pub fn normalize_all(records: &[MatchRecord]) -> Vec<NormalizedMatch> {
    records.iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use rstest::rstest;

    fn record(kills: u32, deaths: u32, assists: u32, duration_seconds: u32) -> MatchRecord {
        MatchRecord {
            match_id: 42,
            hero_id: 8,
            start_time: 1_700_000_000,
            duration_seconds,
            kills,
            deaths,
            assists,
            player_slot: 130,
            radiant_win: Some(false),
        }
    }

    #[rstest]
    #[case(10, 2, 6, 8.0)]
    #[case(3, 0, 4, 7.0)] // zero deaths is capped at kills + assists
    #[case(0, 0, 0, 0.0)]
    #[case(1, 4, 1, 0.5)]
    fn kda_floors_deaths_at_one(
        #[case] kills: u32,
        #[case] deaths: u32,
        #[case] assists: u32,
        #[case] expected: f64,
    ) {
        let normalized = normalize_in(&record(kills, deaths, assists, 0), &Utc);
        assert_eq!(normalized.kda, expected);
    }

    #[test]
    fn extreme_counts_do_not_overflow() {
        let normalized = normalize_in(&record(u32::MAX, 0, 1, 0), &Utc);
        assert_eq!(normalized.kda, u32::MAX as f64 + 1.0);
    }

    #[test]
    fn duration_is_floored_to_minutes() {
        let normalized = normalize_in(&record(0, 0, 0, 2_459), &Utc);
        assert_eq!(normalized.duration_minutes, 40);
    }

    #[test]
    fn dire_player_wins_when_radiant_loses() {
        let normalized = normalize_in(&record(0, 0, 0, 0), &Utc);
        assert_eq!(normalized.is_win, Some(true));
        assert_eq!(normalized.outcome(), MatchOutcome::Win);
    }

    #[test]
    fn time_bucket_uses_given_zone() {
        // 1_700_000_000 is 22:13 UTC
        let utc = normalize_in(&record(0, 0, 0, 0), &Utc);
        assert_eq!(utc.time_bucket, TimeBucket::Evening);

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let shifted = normalize_in(&record(0, 0, 0, 0), &tokyo);
        assert_eq!(shifted.time_bucket, TimeBucket::Morning);
    }

    #[rstest]
    #[case(0, TimeBucket::Night)]
    #[case(5, TimeBucket::Night)]
    #[case(6, TimeBucket::Morning)]
    #[case(12, TimeBucket::Afternoon)]
    #[case(18, TimeBucket::Evening)]
    #[case(23, TimeBucket::Evening)]
    fn buckets_split_the_day(#[case] hour: u32, #[case] expected: TimeBucket) {
        assert_eq!(TimeBucket::from_hour(hour), expected);
    }
}
