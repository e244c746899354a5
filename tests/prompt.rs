use std::fs;
use std::path::PathBuf;

use match_narrator::config::ReportConfig;
use match_narrator::normalize::normalize;
use match_narrator::prompt::{MIN_MAX_BYTES, PromptLimits, build_prompt, top_players};
use match_narrator::stats::{
    MatchStats, MomentumPoint, RawMatch, RawPlayer, RawShot, RawStatTable, RawValue, Side,
};

const INSTRUCTION_END: &str = "The only true facts are provided.";

fn fixture_stats() -> MatchStats {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/raw_match.json");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    let raw: RawMatch = serde_json::from_str(&raw).expect("fixture should parse");
    normalize(&raw)
}

fn raw_with_players(count: usize) -> RawMatch {
    let info: RawStatTable = [
        ("tournament.name", RawValue::from("Premier League")),
        ("season.year", RawValue::from("24/25")),
        ("roundInfo.round", RawValue::from(3.0)),
        ("homeTeam.name", RawValue::from("Liverpool")),
        ("awayTeam.name", RawValue::from("Manchester United")),
        ("homeScore.current", RawValue::from(3.0)),
        ("awayScore.current", RawValue::from(0.0)),
    ]
    .into_iter()
    .collect();
    let home: RawStatTable = [("ballPossession", 55.0), ("expectedGoals", 1.8), ("totalShotsOnGoal", 14.0)]
        .into_iter()
        .collect();
    let away: RawStatTable = [("ballPossession", 45.0), ("totalShotsOnGoal", 9.0)]
        .into_iter()
        .collect();

    let players = (0..count)
        .map(|i| RawPlayer {
            side: if i % 2 == 0 { Side::Home } else { Side::Away },
            table: [
                ("player.name", RawValue::from(format!("Player Number {i:02} With A Long Name"))),
                ("position", RawValue::from("M")),
                ("statistics.rating", RawValue::from(6.0 + (i % 7) as f64 * 0.5)),
                ("statistics.minutesPlayed", RawValue::from(90.0 - (i % 3) as f64)),
                ("statistics.goals", RawValue::from((i % 2) as f64)),
            ]
            .into_iter()
            .collect(),
        })
        .collect();

    let shots = (0..count)
        .map(|i| RawShot {
            side: if i % 3 == 0 { Side::Away } else { Side::Home },
            table: [
                ("player.name", RawValue::from(format!("Shooter {i}"))),
                ("shotType", RawValue::from("miss")),
                ("time", RawValue::from((i % 90) as f64)),
                ("xg", RawValue::from(0.01 * (i % 40) as f64)),
            ]
            .into_iter()
            .collect(),
        })
        .collect();

    RawMatch {
        info,
        home,
        away,
        players,
        shots,
        momentum: (1..=90)
            .map(|m| MomentumPoint {
                minute: m as f64,
                value: if m % 4 == 0 { -10.0 } else { 20.0 },
            })
            .collect(),
        periods: Vec::new(),
    }
}

fn stats_with_players(count: usize) -> MatchStats {
    normalize(&raw_with_players(count))
}

#[test]
fn prompt_is_deterministic() {
    let limits = PromptLimits::default();
    let a = build_prompt(&stats_with_players(12), &limits);
    let b = build_prompt(&stats_with_players(12), &limits);
    let c = build_prompt(&stats_with_players(12), &limits);
    assert_eq!(a.as_str().as_bytes(), b.as_str().as_bytes());
    assert_eq!(b, c);
}

#[test]
fn prompt_stays_within_limit_for_0_1_50_players() {
    for max_bytes in [600, 1200, 2048, 4096] {
        let limits = PromptLimits {
            max_bytes,
            ..PromptLimits::default()
        };
        for count in [0, 1, 50] {
            let prompt = build_prompt(&stats_with_players(count), &limits);
            assert!(
                prompt.len() <= max_bytes,
                "{count} players produced {} bytes with limit {max_bytes}",
                prompt.len()
            );
            assert!(prompt.as_str().ends_with(INSTRUCTION_END));
        }
    }
}

#[test]
fn instruction_survives_at_smallest_configured_limit() {
    let env = |key: &str| (key == "PROMPT_MAX_BYTES").then(|| "1".to_string());
    let limits = ReportConfig::resolve(&[], env)
        .expect("config should resolve")
        .limits;
    assert_eq!(limits.max_bytes, MIN_MAX_BYTES);

    let stats = fixture_stats();
    let prompt = build_prompt(&stats, &limits);
    assert!(prompt.len() <= MIN_MAX_BYTES);
    assert!(prompt.as_str().starts_with("Match Stats Summary:"));
    assert!(prompt.as_str().ends_with(INSTRUCTION_END), "{prompt}");
}

#[test]
fn header_is_cut_on_line_boundaries() {
    let stats = fixture_stats();
    let full = build_prompt(&stats, &PromptLimits::default());
    assert!(full.len() > 1200);

    for max_bytes in [512, 600, 800, 1000, 1200, 1600] {
        let limits = PromptLimits {
            max_bytes,
            ..PromptLimits::default()
        };
        let prompt = build_prompt(&stats, &limits);
        let text = prompt.as_str();
        assert!(prompt.len() <= max_bytes);
        assert!(text.ends_with(INSTRUCTION_END), "limit {max_bytes}: {text}");

        // Everything before the instruction is a whole-line prefix of the roomy prompt.
        let body = text
            .rsplit_once("\nGenerate an interesting")
            .map(|(body, _)| body)
            .unwrap_or_default();
        assert!(full.as_str().starts_with(body), "limit {max_bytes}");
        assert!(body.is_empty() || body.ends_with('\n'));
    }
}

#[test]
fn tiny_limit_is_still_respected() {
    let limits = PromptLimits {
        max_bytes: 64,
        ..PromptLimits::default()
    };
    let prompt = build_prompt(&stats_with_players(50), &limits);
    assert!(prompt.len() <= 64);
    assert!(prompt.as_str().starts_with("Generate an interesting"));
}

#[test]
fn halves_are_listed_after_the_team_table() {
    let prompt = build_prompt(&fixture_stats(), &PromptLimits::default());
    let text = prompt.as_str();
    assert!(text.contains("Statistics by half (Liverpool / Manchester United):"));
    assert!(text.contains("- Possession: 1st half 60% / 40%; 2nd half 50% / 50%"));
    assert!(text.contains("- Expected goals: 1st half 1.12 / 0.20; 2nd half 0.68 / 0.41"));
    assert!(text.contains("- Shots: 1st half 8 / 3; 2nd half 6 / 6"));
    assert!(!text.contains("- Fouls:"));

    let table = text.find("Team statistics").unwrap();
    let halves = text.find("Statistics by half").unwrap();
    let players = text.find("Top rated players").unwrap();
    assert!(table < halves && halves < players);
}

#[test]
fn roomy_prompt_has_header_players_and_instruction() {
    let prompt = build_prompt(&stats_with_players(50), &PromptLimits::default());
    let text = prompt.as_str();
    assert!(text.contains("Competition: Premier League - Season: 24/25 - Round: 3"));
    assert!(text.contains("Score at full time Liverpool: 3, Manchester United: 0"));
    assert!(text.contains("Expected goals: 1.80 / 0.00*"));
    assert!(text.contains("Expected goals difference (Liverpool minus Manchester United): +1.80"));
    assert!(text.contains("Top rated players for Liverpool:"));
    assert!(text.contains("Momentum: Liverpool on top in 68 of 90 minutes"));
    assert!(text.ends_with(INSTRUCTION_END));

    let player_lines = text.lines().filter(|l| l.contains("): rating ")).count();
    assert_eq!(player_lines, 2 * PromptLimits::default().max_players_per_side);
    let shot_lines = text.lines().filter(|l| l.contains(", xG ") && l.contains("' ")).count();
    assert_eq!(shot_lines, PromptLimits::default().max_shots);
}

#[test]
fn no_players_means_no_player_section() {
    let prompt = build_prompt(&stats_with_players(0), &PromptLimits::default());
    assert!(!prompt.as_str().contains("Top rated players"));
    assert!(!prompt.as_str().contains("Biggest chances"));
}

#[test]
fn top_players_order_is_rating_then_minutes_then_name() {
    let stats = stats_with_players(50);
    let top = top_players(&stats.home, 5);
    assert_eq!(top.len(), 5);
    for pair in top.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.rating.value >= b.rating.value);
        if a.rating.value == b.rating.value {
            assert!(a.minutes.value >= b.minutes.value);
            if a.minutes.value == b.minutes.value {
                assert!(a.name <= b.name);
            }
        }
    }
    assert_eq!(top[0].rating.value, 9.0);
}

#[test]
fn unrated_players_are_left_out() {
    let mut raw = raw_with_players(0);
    raw.players.push(RawPlayer {
        side: Side::Home,
        table: [("player.name", RawValue::from("Unused Sub"))].into_iter().collect(),
    });
    let stats = normalize(&raw);
    assert!(top_players(&stats.home, 5).is_empty());
}
