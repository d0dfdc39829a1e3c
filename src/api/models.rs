use serde::{Deserialize, Deserializer};

use crate::analysis::MatchRecord;

// /players/{account_id}
#[derive(Debug, Deserialize)]
pub struct PlayerDto {
    #[serde(default)]
    pub profile: Option<ProfileDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileDto {
    #[serde(default)]
    pub personaname: Option<String>,
}

// /players/{account_id}/matches
#[derive(Debug, Deserialize, Clone)]
pub struct PlayerMatchDto {
    pub match_id: i64,
    #[serde(default)]
    pub hero_id: Option<i32>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub kills: Option<u32>,
    #[serde(default)]
    pub deaths: Option<u32>,
    #[serde(default)]
    pub assists: Option<u32>,
    #[serde(default)]
    pub player_slot: Option<u16>,
    #[serde(default)]
    pub radiant_win: Option<bool>,
}

impl PlayerMatchDto {
    /// `None` when the row has no hero; missing numbers default to 0.
    pub fn into_record(self) -> Option<MatchRecord> {
        let hero_id = self.hero_id.filter(|id| *id > 0)?;
        Some(MatchRecord {
            match_id: self.match_id,
            hero_id,
            start_time: self.start_time.unwrap_or(0),
            duration_seconds: self.duration.unwrap_or(0),
            kills: self.kills.unwrap_or(0),
            deaths: self.deaths.unwrap_or(0),
            assists: self.assists.unwrap_or(0),
            player_slot: self.player_slot.unwrap_or(0),
            radiant_win: self.radiant_win,
        })
    }
}

// /players/{account_id}/heroes
#[derive(Debug, Deserialize, Clone)]
pub struct PlayerHeroDto {
    #[serde(deserialize_with = "hero_id_from_number_or_string")]
    pub hero_id: i32,
    #[serde(default)]
    pub last_played: Option<i64>,
    #[serde(default)]
    pub games: u32,
    #[serde(default)]
    pub win: u32,
}

// /heroes
#[derive(Debug, Deserialize, Clone)]
pub struct HeroConstantDto {
    pub id: i32,
    pub localized_name: String,
}

/// Older responses send `hero_id` as a string.
fn hero_id_from_number_or_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i32),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
