use crate::analysis::dashboard::{DashboardReport, HeroSummary, RecentAchievement};
use crate::analysis::{AchievementCompletion, Momentum, SessionSummary, StreakType};
use crate::rate_limit::{RequestLog, MAX_REQUESTS_PER_DAY, MAX_REQUESTS_PER_MINUTE};
use chrono::Utc;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct HeroRow {
    #[tabled(rename = "#")]
    rank: String,
    hero: String,
    tier: String,
    progress: String,
    games: String,
    win_rate: String,
    kda: String,
    streak: String,
    next: String,
}

#[derive(Tabled)]
struct AchievementRow {
    badge: String,
    achievement: String,
    hero: String,
    description: String,
}

fn streak_label(streak_type: StreakType, count: u32) -> String {
    match streak_type {
        StreakType::Win => format!("W{}", count).green().to_string(),
        StreakType::Loss => format!("L{}", count).red().to_string(),
        StreakType::None => "-".dimmed().to_string(),
    }
}

fn win_rate_label(win_rate: f64) -> String {
    let text = format!("{:.1}%", win_rate);
    if win_rate >= 55.0 {
        text.green().to_string()
    } else if win_rate < 45.0 {
        text.red().to_string()
    } else {
        text
    }
}

pub fn display_dashboard(report: &DashboardReport, player_name: &str) {
    println!(
        "\n{}",
        format!("🎮 Hero Mastery for {} ", player_name).bold().cyan()
    );
    println!("{}\n", "=".repeat(80).cyan());

    display_session(&report.session);
    display_hero_table(&report.heroes);
    display_momentum(&report.momentum);
    display_recent_achievements(&report.recent_achievements);
    display_completion(&report.completion);
}

pub fn display_hero_table(heroes: &[HeroSummary]) {
    if heroes.is_empty() {
        println!("{}", "No heroes match the current filter".yellow());
        return;
    }

    let mut rows = vec![];
    for (idx, hero) in heroes.iter().enumerate() {
        let mastery = &hero.mastery;
        let tier = format!("{} {} {}", mastery.tier.emoji(), mastery.tier, mastery.level);
        let next = if hero.next_tier.is_max_tier {
            "—".to_string()
        } else {
            hero.next_tier.message.clone()
        };

        rows.push(HeroRow {
            rank: format!("{}", idx + 1),
            hero: hero.name.clone(),
            tier,
            progress: format!("{}%", mastery.progress),
            games: format!("{}", hero.stats.games),
            win_rate: win_rate_label(mastery.stats.winrate),
            kda: format!("{:.2}", mastery.stats.kda),
            streak: streak_label(hero.streak.streak_type, hero.streak.current_streak),
            next,
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_session(session: &SessionSummary) {
    println!("{}", "📅 TODAY".bold().cyan());

    if session.games_played == 0 {
        println!("   {}\n", "No games played today".dimmed());
        return;
    }

    let mmr = session.estimated_mmr_change;
    let mmr_text = if mmr > 0 {
        format!("+{}", mmr).green()
    } else if mmr < 0 {
        format!("{}", mmr).red()
    } else {
        "0".normal()
    };

    println!(
        "   {} W / {} L in {} games | streak {} | est. MMR {}\n",
        session.wins.to_string().green(),
        session.losses.to_string().red(),
        session.games_played,
        streak_label(session.streak_type, session.current_streak),
        mmr_text
    );
}

pub fn display_momentum(momentum: &Momentum) {
    println!("{}", "📈 MOMENTUM".bold().cyan());
    match &momentum.hot_streak {
        Some(hot) => println!(
            "   {} {} on a {}-game win streak",
            "🔥".red(),
            hot.hero_name.bold(),
            hot.current_streak
        ),
        None => println!("   {}", "No active win streaks".dimmed()),
    }
    match &momentum.cold_spell {
        Some(cold) => println!(
            "   {} {} has lost {} in a row",
            "🧊".blue(),
            cold.hero_name.bold(),
            cold.current_streak
        ),
        None => println!("   {}", "No active losing streaks".dimmed()),
    }
    println!();
}

pub fn display_recent_achievements(recent: &[RecentAchievement]) {
    if recent.is_empty() {
        return;
    }

    println!("{}", "🏆 ACHIEVEMENTS".bold().cyan());

    let rows: Vec<AchievementRow> = recent
        .iter()
        .map(|r| AchievementRow {
            badge: r.achievement.emoji.to_string(),
            achievement: r.achievement.name.to_string(),
            hero: r.hero_name.clone(),
            description: r.achievement.description.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_completion(completion: &AchievementCompletion) {
    println!(
        "   {} {}/{} unlocked ({}%)\n",
        "Completion:".bold(),
        completion.earned,
        completion.total,
        completion.percentage
    );
}

pub fn display_request_budget(log: &RequestLog) {
    let remaining = log.get_remaining();
    let time_until_reset = log.get_reset_time().signed_duration_since(Utc::now());

    println!("{}", format!("📊 API Usage (Account: {})", log.account_id).dimmed());
    println!("   Daily:  {}/{} requests", log.requests_today, MAX_REQUESTS_PER_DAY);
    println!("   Minute: {}/{} requests", log.requests_this_minute, MAX_REQUESTS_PER_MINUTE);
    println!("   Remaining: {} requests", remaining);
    println!(
        "   Reset in: {}m {}s\n",
        time_until_reset.num_minutes(),
        time_until_reset.num_seconds() % 60
    );
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}
