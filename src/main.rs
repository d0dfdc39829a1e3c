use anyhow::Result;
use chrono::Local;
use clap::Parser;
use dota_mastery::analysis::dashboard::{build_dashboard, HeroQuery, HeroSort};
use dota_mastery::analysis::normalizer::normalize_all;
use dota_mastery::analysis::{HeroStatsTracker, MatchRecord};
use dota_mastery::api::models::PlayerHeroDto;
use dota_mastery::api::OpenDotaClient;
use dota_mastery::cache::MatchCache;
use dota_mastery::display::output::{
    display_dashboard, display_error, display_info, display_request_budget, display_success,
    display_warning,
};
use dota_mastery::heroes::HeroDirectory;
use dota_mastery::rate_limit::RequestLog;
use dota_mastery::{AppError, Config};
use indicatif::ProgressBar;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MAX_MATCHES: usize = 500;
const RECENT_ACHIEVEMENTS: usize = 8;
const STALE_CACHE_MINS: u64 = 24 * 60;

#[derive(Parser, Debug)]
#[command(name = "Dota Mastery")]
#[command(about = "Hero mastery, streaks and achievements from your OpenDota history", long_about = None)]
struct Args {
    /// Steam32 account id (the number in your OpenDota profile URL)
    account_id: u64,

    /// Number of recent matches to analyze (default: 50, max: 500)
    #[arg(short, long, default_value = "50")]
    matches: usize,

    /// Number of heroes to display (default: 15)
    #[arg(short, long, default_value = "15")]
    top_n: usize,

    /// Sort heroes by: mastery, games, winrate, kda, recent
    #[arg(short, long, default_value = "mastery")]
    sort: HeroSort,

    /// Only show heroes whose name contains this text
    #[arg(long)]
    search: Option<String>,

    /// Force refresh from OpenDota (rebuild the match cache)
    #[arg(long, conflicts_with = "offline")]
    refresh: bool,

    /// Use cached matches only, no network requests
    #[arg(long)]
    offline: bool,

    /// Print the dashboard as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

struct FetchedData {
    records: Vec<MatchRecord>,
    player_heroes: Vec<PlayerHeroDto>,
    persona_name: Option<String>,
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_env()?;
    let matches_count = args.matches.clamp(1, MAX_MATCHES);
    let quiet = args.json;

    let mut cache = MatchCache::load(args.account_id).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable match cache");
        MatchCache::new(args.account_id)
    });
    let mut request_log = RequestLog::load(args.account_id)?;

    let fetched = if args.offline {
        if !quiet {
            display_info("Offline mode: using cached matches");
        }
        if cache.is_stale(STALE_CACHE_MINS) {
            tracing::warn!(last_updated = %cache.last_updated, "match cache is more than a day old");
        }
        from_cache(&cache, matches_count)
    } else {
        fetch_online(&args, &config, matches_count, &mut cache, &mut request_log)?
    };

    if fetched.records.is_empty() {
        return Err(AppError::NoMatches.into());
    }

    // Everything below is derived from the normalized window
    let normalized = normalize_all(&fetched.records);
    let mut tracker = HeroStatsTracker::from_matches(&normalized);
    let mut merged = 0;
    for hero in &fetched.player_heroes {
        if tracker.merge_api_totals(hero.hero_id, hero.games, hero.win, hero.last_played) {
            merged += 1;
        }
    }
    tracing::debug!(heroes = tracker.len(), merged, "hero totals ready");

    let heroes = cache.hero_directory();
    let query = HeroQuery {
        search: args.search.clone(),
        sort: args.sort,
        top_n: Some(args.top_n),
        recent_achievements: RECENT_ACHIEVEMENTS,
    };

    let report = build_dashboard(
        &tracker.get_stats(),
        &normalized,
        &heroes,
        &config.analysis,
        &query,
        &Local::now(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let player_name = fetched
        .persona_name
        .unwrap_or_else(|| args.account_id.to_string());
    display_dashboard(&report, &player_name);

    if !args.offline {
        display_request_budget(&request_log);
    }

    Ok(())
}

fn from_cache(cache: &MatchCache, matches_count: usize) -> FetchedData {
    FetchedData {
        records: cache.get_recent_matches(matches_count),
        player_heroes: Vec::new(),
        persona_name: cache.persona_name.clone(),
    }
}

fn fetch_online(
    args: &Args,
    config: &Config,
    matches_count: usize,
    cache: &mut MatchCache,
    request_log: &mut RequestLog,
) -> Result<FetchedData> {
    let quiet = args.json;
    let needs_constants = args.refresh || cache.hero_names.is_empty();
    let requests_needed = if needs_constants { 4 } else { 3 };

    if !request_log.can_make_requests(requests_needed) {
        if !cache.matches.is_empty() {
            if !quiet {
                display_warning("Request budget reached, falling back to cached matches");
                display_request_budget(request_log);
            }
            return Ok(from_cache(cache, matches_count));
        }
        return Err(AppError::BudgetExhausted(format!(
            "{} requests remaining",
            request_log.get_remaining()
        ))
        .into());
    }

    if !quiet {
        display_info(&format!("Fetching OpenDota data for account {}", args.account_id));
    }

    let client = OpenDotaClient::new(config.clone());
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(requests_needed as u64)
    };
    pb.set_message("Fetching from OpenDota");

    // Step 1: profile
    let profile = client.get_player(args.account_id)?;
    request_log.record_request();
    pb.inc(1);

    // Step 2: hero names (cached after the first run)
    if needs_constants {
        let constants = client.get_hero_constants()?;
        request_log.record_request();
        cache.set_hero_names(&HeroDirectory::new(
            constants.into_iter().map(|h| (h.id, h.localized_name)),
        ));
        pb.inc(1);
    }

    // Step 3: lifetime hero totals and recent matches
    let player_heroes = client.get_player_heroes(args.account_id)?;
    request_log.record_request();
    pb.inc(1);

    let rows = client.get_recent_matches(args.account_id, matches_count)?;
    request_log.record_request();
    pb.inc(1);

    pb.finish_with_message("✓ OpenDota data fetched");

    if let Err(e) = request_log.save() {
        tracing::warn!(error = %e, "could not persist request log");
    }

    let fetched_rows = rows.len();
    let records: Vec<MatchRecord> = rows.into_iter().filter_map(|row| row.into_record()).collect();
    if records.len() < fetched_rows {
        tracing::warn!(
            dropped = fetched_rows - records.len(),
            "skipping match rows without a hero"
        );
    }

    if args.refresh {
        cache.replace_matches(records);
    } else {
        let added = cache.add_matches(records);
        if !quiet {
            if added == 0 {
                display_success("⚡ Cache is up-to-date (no new matches)");
            } else {
                display_success(&format!("✨ Found {} new matches", added));
            }
        }
    }

    cache.persona_name = profile.personaname.clone();
    if let Err(e) = cache.save() {
        tracing::warn!(error = %e, "could not persist match cache");
    }

    Ok(FetchedData {
        records: cache.get_recent_matches(matches_count),
        player_heroes,
        persona_name: profile.personaname,
    })
}
