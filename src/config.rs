use crate::analysis::AnalysisConfig;
use crate::error::AppError;
use std::env;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://api.opendota.com/api";
pub const MAX_MMR_PER_MATCH: i32 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AnalysisConfig::default();

        let api_key = lookup("OPENDOTA_API_KEY").filter(|key| !key.trim().is_empty());
        let base_url = lookup("OPENDOTA_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut analysis = defaults.clone();
        analysis.streak.window = parse_or(&lookup, "DOTA_STREAK_WINDOW", defaults.streak.window)?;
        analysis.streak.momentum_min_streak = parse_or(
            &lookup,
            "DOTA_MOMENTUM_MIN_STREAK",
            defaults.streak.momentum_min_streak,
        )?;
        analysis.session.mmr_per_match =
            parse_or(&lookup, "DOTA_MMR_PER_MATCH", defaults.session.mmr_per_match)?;

        if !(0..=MAX_MMR_PER_MATCH).contains(&analysis.session.mmr_per_match) {
            return Err(AppError::ConfigError(format!(
                "DOTA_MMR_PER_MATCH must be between 0 and {}",
                MAX_MMR_PER_MATCH
            )));
        }
        if analysis.streak.window == 0 {
            return Err(AppError::ConfigError(
                "DOTA_STREAK_WINDOW must be at least 1".to_string(),
            ));
        }
        analysis.mastery.validate().map_err(AppError::ConfigError)?;

        Ok(Config {
            api_key,
            base_url,
            analysis,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(format!("{} has an invalid value: {}", key, raw))
        }),
        None => Ok(default),
    }
}
