// OpenDota URL builders. `base` is the API root without a trailing slash.

pub fn player_url(base: &str, account_id: u64) -> String {
    format!("{}/players/{}", base, account_id)
}

pub fn player_matches_url(base: &str, account_id: u64, limit: usize) -> String {
    format!("{}/players/{}/matches?limit={}", base, account_id, limit)
}

pub fn player_heroes_url(base: &str, account_id: u64) -> String {
    format!("{}/players/{}/heroes", base, account_id)
}

pub fn heroes_url(base: &str) -> String {
    format!("{}/heroes", base)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.opendota.com/api";

    #[test]
    fn builds_player_endpoints() {
        assert_eq!(player_url(BASE, 86745912), "https://api.opendota.com/api/players/86745912");
        assert_eq!(
            player_matches_url(BASE, 86745912, 50),
            "https://api.opendota.com/api/players/86745912/matches?limit=50"
        );
        assert_eq!(
            player_heroes_url(BASE, 1),
            "https://api.opendota.com/api/players/1/heroes"
        );
        assert_eq!(heroes_url(BASE), "https://api.opendota.com/api/heroes");
    }
}
