use crate::config::Config;
use crate::error::AppError;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::endpoints;
use super::models::*;

/// OpenDota free tier allowance.
const REQUESTS_PER_MINUTE: u32 = 60;
const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = concat!("dota_mastery/", env!("CARGO_PKG_VERSION"));

pub struct OpenDotaClient {
    config: Config,
    clock: DefaultClock,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl OpenDotaClient {
    pub fn new(config: Config) -> Self {
        let per_minute = NonZeroU32::new(REQUESTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_minute(per_minute));
        OpenDotaClient {
            config,
            clock: DefaultClock::default(),
            rate_limiter,
        }
    }

    fn wait_for_slot(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            tracing::debug!(?wait, "local rate limit reached, sleeping");
            thread::sleep(wait);
        }
    }

    fn execute_request(&self, url: &str) -> Result<String, AppError> {
        let mut retry_count = 0;

        loop {
            self.wait_for_slot();

            let mut request = ureq::get(url).set("User-Agent", USER_AGENT);
            if let Some(key) = &self.config.api_key {
                request = request.query("api_key", key);
            }

            tracing::debug!(url, "GET");
            match request.call() {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    tracing::warn!(wait_ms, "rate limited by OpenDota, retrying");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(code, resp)) => {
                    let body = resp.into_string().unwrap_or_default();
                    return Err(AppError::ApiError(format!("HTTP {}: {}", code, body.trim())));
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let body = self.execute_request(url)?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    pub fn get_player(&self, account_id: u64) -> Result<ProfileDto, AppError> {
        let url = endpoints::player_url(&self.config.base_url, account_id);
        let player: PlayerDto = self.get_json(&url)?;
        player.profile.ok_or(AppError::PlayerNotFound(account_id))
    }

    pub fn get_recent_matches(&self, account_id: u64, limit: usize) -> Result<Vec<PlayerMatchDto>, AppError> {
        let url = endpoints::player_matches_url(&self.config.base_url, account_id, limit);
        self.get_json(&url)
    }

    pub fn get_player_heroes(&self, account_id: u64) -> Result<Vec<PlayerHeroDto>, AppError> {
        let url = endpoints::player_heroes_url(&self.config.base_url, account_id);
        self.get_json(&url)
    }

    pub fn get_hero_constants(&self) -> Result<Vec<HeroConstantDto>, AppError> {
        let url = endpoints::heroes_url(&self.config.base_url);
        self.get_json(&url)
    }
}
