use std::fs;
use std::path::PathBuf;

use match_narrator::narrative::Narrative;
use match_narrator::normalize::normalize;
use match_narrator::present;
use match_narrator::prompt::{PromptLimits, build_prompt};
use match_narrator::report::MatchReport;
use match_narrator::state::{AppState, Screen};
use match_narrator::stats::{MatchIdentifier, MatchStats, Position, RawMatch};

fn fixture_stats() -> MatchStats {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/raw_match.json");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    let raw: RawMatch = serde_json::from_str(&raw).expect("fixture should parse");
    normalize(&raw)
}

fn sample_state() -> AppState {
    let stats = fixture_stats();
    let prompt = build_prompt(&stats, &PromptLimits::default());
    AppState::new(MatchReport {
        id: MatchIdentifier::new(12436920),
        stats,
        prompt,
        narrative: Narrative::new("Liverpool won comfortably.").unwrap(),
    })
}

#[test]
fn screens_cycle_and_map_digits() {
    assert_eq!(Screen::Overview.next(), Screen::Players);
    assert_eq!(Screen::Prompt.next(), Screen::Overview);
    assert_eq!(Screen::from_digit('1'), Some(Screen::Overview));
    assert_eq!(Screen::from_digit('5'), Some(Screen::Prompt));
    assert_eq!(Screen::from_digit('0'), None);
    assert_eq!(Screen::from_digit('6'), None);
    assert_eq!(Screen::from_digit('x'), None);
}

#[test]
fn switching_screen_resets_scroll() {
    let mut state = sample_state();
    state.scroll_down();
    state.scroll_down();
    assert_eq!(state.scroll, 2);

    state.set_screen(Screen::Overview);
    assert_eq!(state.scroll, 2);

    state.next_screen();
    assert_eq!(state.screen, Screen::Players);
    assert_eq!(state.scroll, 0);

    state.scroll_up();
    assert_eq!(state.scroll, 0);
}

#[test]
fn log_buffer_is_capped() {
    let mut state = sample_state();
    for idx in 0..250 {
        state.push_log(format!("line {idx}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
    assert_eq!(state.logs.back().map(String::as_str), Some("line 249"));
}

#[test]
fn stat_rows_mark_defaulted_values() {
    let stats = fixture_stats();
    let rows = present::team_stat_rows(&stats);
    assert_eq!(rows.len(), 12);

    let xg = rows.iter().find(|r| r[0] == "Expected goals").unwrap();
    assert_eq!(xg[1], "1.80");
    assert_eq!(xg[2], "0.00*");

    let possession = rows.iter().find(|r| r[0] == "Possession").unwrap();
    assert_eq!(possession[1], "55%");
    assert_eq!(possession[2], "45%");
}

#[test]
fn title_and_derived_lines() {
    let stats = fixture_stats();
    assert_eq!(
        present::title_line(&stats),
        "Premier League 24/25 R3 | Liverpool 3-0 Manchester United (HT 2-0) | Anfield"
    );
    let derived = present::derived_lines(&stats);
    assert_eq!(derived[0], "xG diff (home - away): +1.80");
    assert_eq!(derived[2], "Possession share: 55% / 45%");
    assert_eq!(derived[3], "Managers: Arne Slot / unknown");
}

#[test]
fn players_are_grouped_goalkeeper_first() {
    let stats = fixture_stats();
    let sections = present::player_sections(&stats.home);
    let positions: Vec<Position> = sections.iter().map(|(p, _)| *p).collect();
    assert_eq!(positions, [Position::Goalkeeper, Position::Forward]);

    let text = present::players_text(&stats.home);
    assert!(text.starts_with("Goalkeepers:\n"));
    assert!(text.contains(" 8.9 Mohamed Salah (90')"));
}

#[test]
fn empty_sections_have_placeholders() {
    let stats = normalize(&RawMatch::default());
    assert_eq!(present::players_text(&stats.home), "No player ratings");
    assert_eq!(present::momentum_summary(&stats), "No momentum data");
    assert!(present::shot_lines(&stats).is_empty());
}

#[test]
fn shot_lines_follow_match_order() {
    let stats = fixture_stats();
    let lines = present::shot_lines(&stats);
    assert_eq!(lines.len(), stats.shots.len());
    assert!(lines.last().unwrap().contains("AWAY"));
    assert!(lines.last().unwrap().starts_with(" 52'"));
}

#[test]
fn half_toggle_cycles_through_periods() {
    let mut state = sample_state();
    assert_eq!(state.period_label(), "Full match");
    assert!(state.selected_period().is_none());

    state.cycle_period();
    assert_eq!(state.period_label(), "1st half");
    let rows = present::period_stat_rows(state.selected_period().unwrap());
    assert_eq!(rows.len(), 12);
    let xg = rows.iter().find(|r| r[0] == "Expected goals").unwrap();
    assert_eq!((xg[1].as_str(), xg[2].as_str()), ("1.12", "0.20"));
    let fouls = rows.iter().find(|r| r[0] == "Fouls").unwrap();
    assert_eq!((fouls[1].as_str(), fouls[2].as_str()), ("-", "-"));

    state.cycle_period();
    assert_eq!(state.period_label(), "2nd half");
    state.cycle_period();
    assert_eq!(state.period_label(), "Full match");
}
