//! Derived statistics over the collection.
//!
//! Everything here is read-only and computed from the full game set. The
//! free-text fields go through the parsers in [`crate::parse`]; values they
//! cannot read are excluded from the relevant aggregate rather than
//! counted as zero.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::{is_full_completion, Game, PLATFORM_VOCABULARY};
use crate::parse::{parse_completion, parse_playtime};

/// How many entries each top-N ranking keeps.
const RANKING_LIMIT: usize = 15;

/// Count of games per status label.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: u32,
}

/// Count of games per platform tag.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlatformCount {
    pub platform: String,
    pub count: u32,
}

/// Count of games per difficulty value.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DifficultyCount {
    pub difficulty: i64,
    pub count: u32,
}

/// One bucket of the vote histogram.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoteBin {
    pub range: String,
    pub start: i64,
    pub end: i64,
    pub count: u32,
}

/// Count of games first played in a given year.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: u32,
}

/// A ranking entry for the hardest-games list.
#[derive(Debug, Clone, Serialize)]
pub struct DifficultGame {
    pub id: i64,
    pub title: String,
    pub platform: String,
    pub difficulty: i64,
    pub status: Option<String>,
}

/// A ranking entry for the most-played list.
#[derive(Debug, Clone, Serialize)]
pub struct PlaytimeGame {
    pub id: i64,
    pub title: String,
    pub platform: String,
    pub playtime: Option<String>,
    pub status: Option<String>,
    pub total_playtime: f64,
}

/// A ranking entry for the fastest-completion list.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionGame {
    pub id: i64,
    pub title: String,
    pub platform: String,
    pub status: Option<String>,
    pub platinum_date: String,
    pub display: String,
    pub total_minutes: i64,
}

/// Everything the statistics endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub status: Vec<StatusCount>,
    pub platform: Vec<PlatformCount>,
    pub difficulty: Vec<DifficultyCount>,
    pub vote_distribution: Vec<VoteBin>,
    pub top_difficult_games: Vec<DifficultGame>,
    pub top_playtime_games: Vec<PlaytimeGame>,
    pub played_by_year: Vec<YearCount>,
    pub fastest_completions: Vec<CompletionGame>,
}

impl Statistics {
    /// Compute every aggregate. `current_year` bounds the played-by-year
    /// validation and is passed in to keep this a pure function.
    pub fn compute(games: &[Game], current_year: i32) -> Self {
        Self {
            status: status_distribution(games),
            platform: platform_distribution(games),
            difficulty: difficulty_distribution(games),
            vote_distribution: vote_distribution(games),
            top_difficult_games: top_difficult_games(games),
            top_playtime_games: top_playtime_games(games),
            played_by_year: played_by_year(games, current_year),
            fastest_completions: fastest_completions(games),
        }
    }
}

/// Non-empty statuses grouped and sorted by count descending (label
/// ascending on ties, for a stable output).
pub fn status_distribution(games: &[Game]) -> Vec<StatusCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for game in games {
        if let Some(status) = game.status.as_deref() {
            if !status.is_empty() {
                *counts.entry(status).or_default() += 1;
            }
        }
    }

    let mut result: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    result
}

/// Tally platform tags against the fixed vocabulary, preserving its order
/// and keeping zero-count entries. A multi-platform game counts once per
/// listed platform, so the totals may exceed the number of games. Tokens
/// outside the vocabulary are dropped silently.
pub fn platform_distribution(games: &[Game]) -> Vec<PlatformCount> {
    let mut counts: Vec<u32> = vec![0; PLATFORM_VOCABULARY.len()];

    for game in games {
        for tag in &game.platforms {
            let tag = tag.trim().to_uppercase();
            if let Some(index) = PLATFORM_VOCABULARY.iter().position(|p| *p == tag) {
                counts[index] += 1;
            }
        }
    }

    PLATFORM_VOCABULARY
        .iter()
        .zip(counts)
        .map(|(platform, count)| PlatformCount {
            platform: platform.to_string(),
            count,
        })
        .collect()
}

/// Non-null difficulties grouped, ascending by difficulty.
pub fn difficulty_distribution(games: &[Game]) -> Vec<DifficultyCount> {
    let mut counts: HashMap<i64, u32> = HashMap::new();
    for game in games {
        if let Some(difficulty) = game.difficulty {
            *counts.entry(difficulty).or_default() += 1;
        }
    }

    let mut result: Vec<DifficultyCount> = counts
        .into_iter()
        .map(|(difficulty, count)| DifficultyCount { difficulty, count })
        .collect();
    result.sort_by_key(|entry| entry.difficulty);
    result
}

/// `total_score` binned by tens: 0-9, 10-19, …, 90-99, and 100 on its own.
/// Absent or out-of-range scores are excluded.
pub fn vote_distribution(games: &[Game]) -> Vec<VoteBin> {
    let mut bins = [0u32; 11];

    for game in games {
        if let Some(score) = game.total_score {
            if (0..=100).contains(&score) {
                let index = (score / 10).min(10) as usize;
                bins[index] += 1;
            }
        }
    }

    (0..=10)
        .map(|i| {
            let start = i * 10;
            let end = if i == 10 { 100 } else { start + 9 };
            let range = if i == 10 {
                "100".to_string()
            } else {
                format!("{}-{}", start, end)
            };
            VoteBin {
                range,
                start,
                end,
                count: bins[i as usize],
            }
        })
        .collect()
}

/// Top 15 by difficulty descending, title ascending on ties.
pub fn top_difficult_games(games: &[Game]) -> Vec<DifficultGame> {
    let mut ranked: Vec<&Game> = games.iter().filter(|g| g.difficulty.is_some()).collect();
    ranked.sort_by(|a, b| {
        b.difficulty
            .cmp(&a.difficulty)
            .then_with(|| a.title.cmp(&b.title))
    });

    ranked
        .into_iter()
        .take(RANKING_LIMIT)
        .map(|game| DifficultGame {
            id: game.id,
            title: game.title.clone(),
            platform: game.platform_column(),
            difficulty: game.difficulty.unwrap_or(0),
            status: game.status.clone(),
        })
        .collect()
}

/// Top 15 by parsed playtime descending.
pub fn top_playtime_games(games: &[Game]) -> Vec<PlaytimeGame> {
    let mut ranked: Vec<PlaytimeGame> = games
        .iter()
        .filter(|g| g.playtime.as_deref().is_some_and(|p| !p.is_empty()))
        .map(|game| PlaytimeGame {
            id: game.id,
            title: game.title.clone(),
            platform: game.platform_column(),
            playtime: game.playtime.clone(),
            status: game.status.clone(),
            total_playtime: parse_playtime(game.playtime.as_deref().unwrap_or("")),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_playtime
            .partial_cmp(&a.total_playtime)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
    ranked.truncate(RANKING_LIMIT);
    ranked
}

fn re_year() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|~|\b)(\d{4})\b").unwrap())
}

/// Count games by the 4-digit year found in `first_played`. Years outside
/// [1970, current_year + 1] are ignored.
pub fn played_by_year(games: &[Game], current_year: i32) -> Vec<YearCount> {
    let mut counts: HashMap<i32, u32> = HashMap::new();

    for game in games {
        let Some(date) = game.first_played.as_deref() else {
            continue;
        };
        let Some(caps) = re_year().captures(date.trim()) else {
            continue;
        };
        let Ok(year) = caps[1].parse::<i32>() else {
            continue;
        };
        if (1970..=current_year + 1).contains(&year) {
            *counts.entry(year).or_default() += 1;
        }
    }

    let mut result: Vec<YearCount> = counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect();
    result.sort_by_key(|entry| entry.year);
    result
}

/// Top 15 fastest full completions: Platinato/Masterato games whose
/// `platinum_date` parses, ascending by total minutes. Unparseable times
/// are excluded, not treated as zero.
pub fn fastest_completions(games: &[Game]) -> Vec<CompletionGame> {
    let mut ranked: Vec<CompletionGame> = games
        .iter()
        .filter(|g| g.status.as_deref().is_some_and(is_full_completion))
        .filter_map(|game| {
            let platinum_date = game.platinum_date.as_deref()?.trim();
            if platinum_date.is_empty() {
                return None;
            }
            let parsed = parse_completion(platinum_date)?;
            Some(CompletionGame {
                id: game.id,
                title: game.title.clone(),
                platform: game.platform_column(),
                status: game.status.clone(),
                platinum_date: parsed.original,
                display: parsed.display,
                total_minutes: parsed.total_minutes,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.total_minutes
            .cmp(&b.total_minutes)
            .then_with(|| a.title.cmp(&b.title))
    });
    ranked.truncate(RANKING_LIMIT);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;
    use chrono::Utc;

    fn game(id: i64, title: &str) -> Game {
        Game {
            id,
            title: title.to_string(),
            platforms: Vec::new(),
            section: Section::Played,
            playtime: None,
            total_score: None,
            aesthetic_score: None,
            ost_score: None,
            difficulty: None,
            status: None,
            trophy_percentage: None,
            platinum_date: None,
            replays: 0,
            first_played: None,
            last_finished: None,
            review: None,
            cover_url: None,
            priority: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_distribution_orders_by_count() {
        let mut games = Vec::new();
        for i in 0..3 {
            let mut g = game(i, "x");
            g.status = Some("Finito".to_string());
            games.push(g);
        }
        let mut g = game(10, "y");
        g.status = Some("Droppato".to_string());
        games.push(g);
        games.push(game(11, "no status"));

        let dist = status_distribution(&games);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].status, "Finito");
        assert_eq!(dist[0].count, 3);
        assert_eq!(dist[1].count, 1);
    }

    #[test]
    fn test_platform_distribution_vocabulary_and_zero_counts() {
        let mut a = game(1, "a");
        a.platforms = vec!["PS4".to_string(), "Digitale".to_string()];
        let mut b = game(2, "b");
        b.platforms = vec!["Wii".to_string(), "Nonsense".to_string()];

        let dist = platform_distribution(&[a, b]);

        // Fixed vocabulary order, zero-count entries included.
        assert_eq!(dist.len(), 12);
        assert_eq!(dist[0].platform, "DIGITALE");
        assert_eq!(dist[0].count, 1);
        assert_eq!(dist[1].platform, "FISICO");
        assert_eq!(dist[1].count, 0);

        let get = |name: &str| dist.iter().find(|p| p.platform == name).unwrap().count;
        assert_eq!(get("PS4"), 1);
        assert_eq!(get("WII"), 1);
        assert!(!dist.iter().any(|p| p.platform == "NONSENSE"));
    }

    #[test]
    fn test_multi_platform_games_count_per_tag() {
        let mut a = game(1, "a");
        a.platforms = vec!["PC".to_string(), "SWITCH".to_string()];

        let dist = platform_distribution(&[a]);
        let total: u32 = dist.iter().map(|p| p.count).sum();
        // One game, two counted tags: totals exceed the game count by design.
        assert_eq!(total, 2);
    }

    #[test]
    fn test_difficulty_distribution_ascending() {
        let mut games = Vec::new();
        for (id, d) in [(1, 8), (2, 3), (3, 8)] {
            let mut g = game(id, "x");
            g.difficulty = Some(d);
            games.push(g);
        }

        let dist = difficulty_distribution(&games);
        assert_eq!(
            dist,
            vec![
                DifficultyCount { difficulty: 3, count: 1 },
                DifficultyCount { difficulty: 8, count: 2 },
            ]
        );
    }

    #[test]
    fn test_vote_bins() {
        let mut games = Vec::new();
        for (id, score) in [(1, 0), (2, 9), (3, 95), (4, 100), (5, 100)] {
            let mut g = game(id, "x");
            g.total_score = Some(score);
            games.push(g);
        }
        let mut out_of_range = game(6, "x");
        out_of_range.total_score = Some(101);
        games.push(out_of_range);

        let bins = vote_distribution(&games);
        assert_eq!(bins.len(), 11);
        assert_eq!(bins[0].range, "0-9");
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[9].range, "90-99");
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins[10].range, "100");
        assert_eq!(bins[10].count, 2);

        let total: u32 = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 5); // the 101 is excluded
    }

    #[test]
    fn test_top_difficult_ties_break_on_title() {
        let mut games = Vec::new();
        for (id, title, d) in [(1, "Zelda", 9), (2, "Anthem", 9), (3, "Okami", 4)] {
            let mut g = game(id, title);
            g.difficulty = Some(d);
            games.push(g);
        }
        games.push(game(4, "unrated"));

        let top = top_difficult_games(&games);
        let titles: Vec<&str> = top.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Anthem", "Zelda", "Okami"]);
    }

    #[test]
    fn test_top_playtime_parses_segments() {
        let mut a = game(1, "a");
        a.playtime = Some("412 PS + 7,9 PC".to_string());
        let mut b = game(2, "b");
        b.playtime = Some("100".to_string());
        let mut c = game(3, "c");
        c.playtime = Some("abc".to_string());

        let top = top_playtime_games(&[a, b, c]);
        assert_eq!(top[0].total_playtime, 419.9);
        assert_eq!(top[1].total_playtime, 100.0);
        assert_eq!(top[2].total_playtime, 0.0);
    }

    #[test]
    fn test_played_by_year_validates_range() {
        let mut games = Vec::new();
        for (id, date) in [
            (1, "2015"),
            (2, "~2015"),
            (3, "Estate 2003"),
            (4, "1950"),
            (5, "9999"),
        ] {
            let mut g = game(id, "x");
            g.first_played = Some(date.to_string());
            games.push(g);
        }

        let years = played_by_year(&games, 2026);
        assert_eq!(
            years,
            vec![
                YearCount { year: 2003, count: 1 },
                YearCount { year: 2015, count: 2 },
            ]
        );
    }

    #[test]
    fn test_fastest_completions_filters_and_sorts() {
        let mut fast = game(1, "fast");
        fast.status = Some("Masterato/Platinato".to_string());
        fast.platinum_date = Some("2 ORE, 30 MINUTI".to_string());

        let mut slow = game(2, "slow");
        slow.status = Some("Platinato".to_string());
        slow.platinum_date = Some("163 GIORNI".to_string());

        let mut unparseable = game(3, "mystery");
        unparseable.status = Some("Platinato".to_string());
        unparseable.platinum_date = Some("boh".to_string());

        let mut not_platinum = game(4, "finito");
        not_platinum.status = Some("Finito".to_string());
        not_platinum.platinum_date = Some("2 ORE".to_string());

        let ranked = fastest_completions(&[slow, fast, unparseable, not_platinum]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "fast");
        assert_eq!(ranked[0].total_minutes, 150);
        assert_eq!(ranked[1].title, "slow");
    }

    #[test]
    fn test_compute_bundles_everything() {
        let mut g = game(1, "Okami");
        g.status = Some("Finito".to_string());
        g.total_score = Some(93);
        g.platforms = vec!["PS2".to_string()];

        let stats = Statistics::compute(&[g], 2026);
        assert_eq!(stats.status.len(), 1);
        assert_eq!(stats.platform.len(), 12);
        assert_eq!(stats.vote_distribution[9].count, 1);
    }
}
