use std::fmt;

use crate::stats::{MatchStats, Metric, PlayerRating, ShotEvent, Side, StatField, TeamStats};

pub const DEFAULT_MAX_PLAYERS_PER_SIDE: usize = 5;
pub const DEFAULT_MAX_SHOTS: usize = 8;
pub const DEFAULT_MAX_BYTES: usize = 4096;
/// Smallest byte limit accepted from configuration. Always leaves room for the instruction.
pub const MIN_MAX_BYTES: usize = 512;
const MAX_TEXT_CHARS: usize = 40;

const INSTRUCTION: &str = "Generate an interesting and extensive match report, utilising only the \
information given. Start off with the competition, round, teams and score. Do not make anything \
up. Do not assume anything. The only true facts are provided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    pub max_players_per_side: usize,
    pub max_shots: usize,
    pub max_bytes: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_players_per_side: DEFAULT_MAX_PLAYERS_PER_SIDE,
            max_shots: DEFAULT_MAX_SHOTS,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders the match into the fixed prompt template.
///
/// Room for the closing instruction is reserved first. Header lines (fixture,
/// score, team table), then half-by-half lines, players and shots are appended
/// whole while they fit in what is left of `max_bytes`; the first line that does
/// not fit ends the body. The result never exceeds the limit and keeps the
/// instruction whenever the limit can hold it.
pub fn build_prompt(stats: &MatchStats, limits: &PromptLimits) -> Prompt {
    let tail = format!("\n{INSTRUCTION}");
    let budget = limits.max_bytes.saturating_sub(tail.len());

    let mut out = String::new();
    for line in header_lines(stats)
        .into_iter()
        .chain(detail_lines(stats, limits))
    {
        if out.len() + line.len() + 1 > budget {
            break;
        }
        out.push_str(&line);
        out.push('\n');
    }

    if out.is_empty() {
        out.push_str(INSTRUCTION);
    } else {
        out.push_str(&tail);
    }
    clip_bytes(&mut out, limits.max_bytes);
    Prompt(out)
}

/// Highest rated players first; ties go to more minutes, then name.
/// Players without a rating from the source are left out.
pub fn top_players(team: &TeamStats, limit: usize) -> Vec<&PlayerRating> {
    let mut rated: Vec<&PlayerRating> = team
        .players
        .iter()
        .filter(|p| !p.rating.estimated)
        .collect();
    rated.sort_by(|a, b| {
        b.rating
            .value
            .total_cmp(&a.rating.value)
            .then_with(|| b.minutes.value.total_cmp(&a.minutes.value))
            .then_with(|| a.name.cmp(&b.name))
    });
    rated.truncate(limit);
    rated
}

pub fn top_shots(stats: &MatchStats, limit: usize) -> Vec<&ShotEvent> {
    let mut shots: Vec<&ShotEvent> = stats.shots.iter().collect();
    shots.sort_by(|a, b| {
        b.xg.total_cmp(&a.xg)
            .then_with(|| a.minute.cmp(&b.minute))
            .then_with(|| a.player.cmp(&b.player))
    });
    shots.truncate(limit);
    shots
}

fn header_lines(stats: &MatchStats) -> Vec<String> {
    let info = &stats.info;
    let home = &stats.home;
    let away = &stats.away;
    let home_name = clip_chars(&home.name);
    let away_name = clip_chars(&away.name);

    let mut lines = vec![
        "Match Stats Summary:".to_string(),
        String::new(),
        format!(
            "Competition: {} - Season: {} - Round: {} at Stadium: {}",
            clip_chars(&info.competition),
            clip_chars(&info.season),
            clip_chars(&info.round),
            clip_chars(&info.venue)
        ),
        format!("Kickoff: {}", clip_chars(&info.kickoff)),
        format!(
            "Home Team: {home_name}, Home Team Manager: {}",
            clip_chars(&home.manager)
        ),
        format!(
            "Away Team: {away_name}, Away Team Manager: {}",
            clip_chars(&away.manager)
        ),
        format!(
            "Score at half time {home_name}: {:.0}, {away_name}: {:.0}",
            home.goals_half_time.value, away.goals_half_time.value
        ),
        format!(
            "Score at full time {home_name}: {:.0}, {away_name}: {:.0}",
            home.goals.value, away.goals.value
        ),
        String::new(),
        format!("Team statistics ({home_name} / {away_name}):"),
    ];

    let mut any_estimated = false;
    for field in StatField::ALL {
        let h = home.metric(field);
        let a = away.metric(field);
        any_estimated |= h.estimated || a.estimated;
        lines.push(format!(
            "{}: {} / {}",
            field.label(),
            metric_text(field, h),
            metric_text(field, a)
        ));
    }
    if any_estimated {
        lines.push("Values marked * were not reported by the source.".to_string());
    }

    let derived = &stats.derived;
    lines.push(format!(
        "Expected goals difference ({home_name} minus {away_name}): {:+.2}",
        derived.xg_diff
    ));
    lines.push(format!(
        "Shot difference ({home_name} minus {away_name}): {:+.0}",
        derived.shot_diff
    ));
    lines.push(format!(
        "Possession share {home_name}: {:.0}%",
        derived.possession_share_home * 100.0
    ));

    if !stats.momentum.is_empty() {
        let (h, a) = stats.momentum_balance();
        lines.push(format!(
            "Momentum: {home_name} on top in {h} of {} minutes, {away_name} in {a}",
            stats.momentum.len()
        ));
    }

    lines.push(String::new());
    lines
}

fn detail_lines(stats: &MatchStats, limits: &PromptLimits) -> Vec<String> {
    let mut lines = period_lines(stats);

    for side in [Side::Home, Side::Away] {
        let team = stats.team(side);
        let players = top_players(team, limits.max_players_per_side);
        if players.is_empty() {
            continue;
        }
        lines.push(format!("Top rated players for {}:", clip_chars(&team.name)));
        for player in players {
            lines.push(player_line(player));
        }
    }

    let shots = top_shots(stats, limits.max_shots);
    if !shots.is_empty() {
        lines.push("Biggest chances:".to_string());
        for shot in shots {
            let team = stats.team(shot.side);
            lines.push(format!(
                "- {}' {} ({}): {}, xG {:.2}",
                shot.minute,
                clip_chars(&shot.player),
                clip_chars(&team.name),
                shot.outcome.label(),
                shot.xg
            ));
        }
    }

    lines
}

// One line per field reported in any half: "- Shots: 1st half 8 / 3; 2nd half 6 / 6".
fn period_lines(stats: &MatchStats) -> Vec<String> {
    let mut lines = Vec::new();
    for field in StatField::ALL {
        let parts: Vec<String> = stats
            .periods
            .iter()
            .filter_map(|period| {
                let line = period.line(field).filter(|l| l.reported())?;
                Some(format!(
                    "{} {} / {}",
                    clip_chars(&period.label()),
                    metric_text(field, line.home),
                    metric_text(field, line.away)
                ))
            })
            .collect();
        if !parts.is_empty() {
            lines.push(format!("- {}: {}", field.label(), parts.join("; ")));
        }
    }
    if !lines.is_empty() {
        lines.insert(
            0,
            format!(
                "Statistics by half ({} / {}):",
                clip_chars(&stats.home.name),
                clip_chars(&stats.away.name)
            ),
        );
    }
    lines
}

fn metric_text(field: StatField, metric: Metric) -> String {
    let mut text = field.format(metric.value);
    if metric.estimated {
        text.push('*');
    }
    text
}

fn player_line(player: &PlayerRating) -> String {
    let mut line = format!(
        "- {} ({}): rating {:.1}",
        clip_chars(&player.name),
        player.position.short(),
        player.rating.value
    );
    if !player.minutes.estimated {
        line.push_str(&format!(", {:.0} min", player.minutes.value));
    }
    if player.goals.value > 0.0 {
        line.push_str(&format!(", goals {:.0}", player.goals.value));
    }
    if player.assists.value > 0.0 {
        line.push_str(&format!(", assists {:.0}", player.assists.value));
    }
    if player.key_passes.value > 0.0 {
        line.push_str(&format!(", key passes {:.0}", player.key_passes.value));
    }
    if !player.expected_goals.estimated {
        line.push_str(&format!(", xG {:.2}", player.expected_goals.value));
    }
    line
}

fn clip_chars(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_TEXT_CHARS {
        return collapsed;
    }
    collapsed.chars().take(MAX_TEXT_CHARS).collect()
}

fn clip_bytes(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
