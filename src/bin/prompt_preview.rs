use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use match_narrator::normalize::normalize;
use match_narrator::present;
use match_narrator::prompt::{PromptLimits, build_prompt};
use match_narrator::stats::RawMatch;

// Offline: loads a saved RawMatch snapshot and prints what the model would be sent.
fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/raw_match.json"));

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw_match: RawMatch = serde_json::from_str(&raw).context("invalid raw match json")?;

    let stats = normalize(&raw_match);
    let prompt = build_prompt(&stats, &PromptLimits::default());

    println!("{}", present::title_line(&stats));
    println!();
    println!("{:<18} {:>14} {:>14}", "Stat", stats.home.name, stats.away.name);
    for [label, home, away] in present::team_stat_rows(&stats) {
        println!("{label:<18} {home:>14} {away:>14}");
    }
    for period in &stats.periods {
        println!();
        println!("{}", period.label());
        for [label, home, away] in present::period_stat_rows(period) {
            println!("{label:<18} {home:>14} {away:>14}");
        }
    }
    println!();
    for line in present::derived_lines(&stats) {
        println!("{line}");
    }
    println!();
    println!("--- prompt ({} bytes) ---", prompt.len());
    println!("{prompt}");

    Ok(())
}
