use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use crate::analysis::MatchRecord;
use crate::error::AppError;
use crate::heroes::HeroDirectory;

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchCache {
    pub account_id: u64,
    #[serde(default)]
    pub persona_name: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub matches: Vec<MatchRecord>,
    #[serde(default)]
    pub hero_names: BTreeMap<i32, String>,
}

impl MatchCache {
    pub fn new(account_id: u64) -> Self {
        MatchCache {
            account_id,
            persona_name: None,
            last_updated: Utc::now(),
            matches: Vec::new(),
            hero_names: BTreeMap::new(),
        }
    }

    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dota_mastery")
    }

    pub fn get_cache_path(dir: &Path, account_id: u64) -> PathBuf {
        dir.join(format!("{}.json", account_id))
    }

    pub fn load(account_id: u64) -> Result<Self, AppError> {
        Self::load_from(&Self::default_dir(), account_id)
    }

    /// Missing cache files load as an empty cache.
    pub fn load_from(dir: &Path, account_id: u64) -> Result<Self, AppError> {
        let path = Self::get_cache_path(dir, account_id);

        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AppError::CacheError(format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(_) => Ok(MatchCache::new(account_id)),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::default_dir())
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), AppError> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::CacheError(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let path = Self::get_cache_path(dir, self.account_id);
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::CacheError(format!("Failed to serialize cache: {}", e))
        })?;

        fs::write(&path, json).map_err(|e| {
            AppError::CacheError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), matches = self.matches.len(), "cache saved");
        Ok(())
    }

    pub fn cached_match_ids(&self) -> HashSet<i64> {
        self.matches.iter().map(|m| m.match_id).collect()
    }

    /// Adds unseen matches and keeps the list newest-first. Returns how many were new.
    pub fn add_matches(&mut self, new_matches: Vec<MatchRecord>) -> usize {
        let mut existing_ids = self.cached_match_ids();
        let mut added = 0;

        for new_match in new_matches {
            if existing_ids.insert(new_match.match_id) {
                self.matches.push(new_match);
                added += 1;
            }
        }

        self.matches
            .sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.match_id.cmp(&a.match_id)));

        self.last_updated = Utc::now();
        added
    }

    pub fn replace_matches(&mut self, matches: Vec<MatchRecord>) {
        self.matches.clear();
        self.add_matches(matches);
    }

    pub fn get_recent_matches(&self, count: usize) -> Vec<MatchRecord> {
        self.matches.iter()
            .take(count)
            .cloned()
            .collect()
    }

    pub fn set_hero_names(&mut self, heroes: &HeroDirectory) {
        self.hero_names = heroes.entries().clone();
    }

    pub fn hero_directory(&self) -> HeroDirectory {
        HeroDirectory::new(self.hero_names.iter().map(|(id, name)| (*id, name.clone())))
    }

    pub fn is_stale(&self, max_age_mins: u64) -> bool {
        let now = Utc::now();
        let age = now.signed_duration_since(self.last_updated);
        age.num_minutes() > max_age_mins as i64
    }
}
