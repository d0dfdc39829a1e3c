use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc, Duration};
use crate::cache::MatchCache;
use crate::error::AppError;

pub const MAX_REQUESTS_PER_DAY: u32 = 2000;
pub const MAX_REQUESTS_PER_MINUTE: u32 = 60;

/// Persisted request budget for one account, so repeated runs stay within
/// the OpenDota free tier.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestLog {
    pub account_id: u64,
    pub requests_today: u32,
    pub requests_this_minute: u32,
    pub last_request: DateTime<Utc>,
    pub day_reset: DateTime<Utc>,
    pub minute_reset: DateTime<Utc>,
}

impl RequestLog {
    pub fn new(account_id: u64) -> Self {
        Self::new_at(account_id, Utc::now())
    }

    pub fn new_at(account_id: u64, now: DateTime<Utc>) -> Self {
        RequestLog {
            account_id,
            requests_today: 0,
            requests_this_minute: 0,
            last_request: now,
            day_reset: now + Duration::days(1),
            minute_reset: now + Duration::minutes(1),
        }
    }

    pub fn get_log_path(dir: &Path, account_id: u64) -> PathBuf {
        dir.join(format!("{}.ratelimit.json", account_id))
    }

    pub fn load(account_id: u64) -> Result<Self, AppError> {
        Self::load_from(&MatchCache::default_dir(), account_id)
    }

    pub fn load_from(dir: &Path, account_id: u64) -> Result<Self, AppError> {
        let path = Self::get_log_path(dir, account_id);

        match fs::read_to_string(&path) {
            Ok(content) => {
                let mut log: RequestLog = serde_json::from_str(&content)
                    .map_err(|e| AppError::CacheError(format!("Failed to parse request log: {}", e)))?;
                log.roll_windows(Utc::now());
                Ok(log)
            }
            Err(_) => Ok(RequestLog::new(account_id)),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&MatchCache::default_dir())
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), AppError> {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::CacheError(format!("Failed to create {}: {}", dir.display(), e)))?;

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::CacheError(format!("Failed to serialize request log: {}", e)))?;

        fs::write(Self::get_log_path(dir, self.account_id), json)
            .map_err(|e| AppError::CacheError(format!("Failed to write request log: {}", e)))?;

        Ok(())
    }

    /// Resets counters whose window has elapsed.
    pub fn roll_windows(&mut self, now: DateTime<Utc>) {
        if now > self.day_reset {
            self.requests_today = 0;
            self.day_reset = now + Duration::days(1);
        }

        if now > self.minute_reset {
            self.requests_this_minute = 0;
            self.minute_reset = now + Duration::minutes(1);
        }
    }

    pub fn can_make_requests(&self, count: u32) -> bool {
        self.requests_today + count <= MAX_REQUESTS_PER_DAY
            && self.requests_this_minute + count <= MAX_REQUESTS_PER_MINUTE
    }

    pub fn record_request(&mut self) {
        self.record_request_at(Utc::now());
    }

    pub fn record_request_at(&mut self, now: DateTime<Utc>) {
        self.roll_windows(now);
        self.requests_today += 1;
        self.requests_this_minute += 1;
        self.last_request = now;
    }

    pub fn get_remaining(&self) -> u32 {
        MAX_REQUESTS_PER_DAY
            .saturating_sub(self.requests_today)
            .min(MAX_REQUESTS_PER_MINUTE.saturating_sub(self.requests_this_minute))
    }

    pub fn get_reset_time(&self) -> DateTime<Utc> {
        self.day_reset.min(self.minute_reset)
    }
}
