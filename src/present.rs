use crate::stats::{
    MatchStats, Metric, PeriodStats, PlayerRating, Position, Side, StatField, TeamStats,
};

pub fn title_line(stats: &MatchStats) -> String {
    let info = &stats.info;
    format!(
        "{} {} R{} | {} {:.0}-{:.0} {} (HT {:.0}-{:.0}) | {}",
        info.competition,
        info.season,
        info.round,
        stats.home.name,
        stats.home.goals.value,
        stats.away.goals.value,
        stats.away.name,
        stats.home.goals_half_time.value,
        stats.away.goals_half_time.value,
        info.venue
    )
}

/// One row per schema field: label, home value, away value. Defaulted values get `*`.
pub fn team_stat_rows(stats: &MatchStats) -> Vec<[String; 3]> {
    StatField::ALL
        .into_iter()
        .map(|field| {
            [
                field.label().to_string(),
                metric_cell(field, stats.home.metric(field)),
                metric_cell(field, stats.away.metric(field)),
            ]
        })
        .collect()
}

/// Same layout as `team_stat_rows` for one half. Fields neither side reported show `-`.
pub fn period_stat_rows(period: &PeriodStats) -> Vec<[String; 3]> {
    period
        .lines
        .iter()
        .map(|line| {
            if line.reported() {
                [
                    line.field.label().to_string(),
                    metric_cell(line.field, line.home),
                    metric_cell(line.field, line.away),
                ]
            } else {
                [line.field.label().to_string(), "-".to_string(), "-".to_string()]
            }
        })
        .collect()
}

fn metric_cell(field: StatField, metric: Metric) -> String {
    let mut text = field.format(metric.value);
    if metric.estimated {
        text.push('*');
    }
    text
}

pub fn derived_lines(stats: &MatchStats) -> Vec<String> {
    let d = &stats.derived;
    vec![
        format!("xG diff (home - away): {:+.2}", d.xg_diff),
        format!("Shot diff (home - away): {:+.0}", d.shot_diff),
        format!(
            "Possession share: {:.0}% / {:.0}%",
            d.possession_share_home * 100.0,
            (1.0 - d.possession_share_home) * 100.0
        ),
        format!("Managers: {} / {}", stats.home.manager, stats.away.manager),
        format!("Kickoff: {}", stats.info.kickoff),
    ]
}

/// Players grouped by position in goalkeeper-to-forward order, best rated first.
pub fn player_sections(team: &TeamStats) -> Vec<(Position, Vec<&PlayerRating>)> {
    let mut sections = Vec::new();
    for position in Position::ORDER {
        let mut players: Vec<&PlayerRating> = team
            .players
            .iter()
            .filter(|p| p.position == position)
            .collect();
        if players.is_empty() {
            continue;
        }
        players.sort_by(|a, b| {
            b.rating
                .value
                .total_cmp(&a.rating.value)
                .then_with(|| a.name.cmp(&b.name))
        });
        sections.push((position, players));
    }
    sections
}

pub fn player_line(player: &PlayerRating) -> String {
    let rating = if player.rating.estimated {
        "  - ".to_string()
    } else {
        format!("{:>4.1}", player.rating.value)
    };
    let mut extras = Vec::new();
    if !player.minutes.estimated {
        extras.push(format!("{:.0}'", player.minutes.value));
    }
    if player.goals.value > 0.0 {
        extras.push(format!("G{:.0}", player.goals.value));
    }
    if player.assists.value > 0.0 {
        extras.push(format!("A{:.0}", player.assists.value));
    }
    if !player.expected_goals.estimated {
        extras.push(format!("xG {:.2}", player.expected_goals.value));
    }
    if extras.is_empty() {
        format!("{rating} {}", player.name)
    } else {
        format!("{rating} {} ({})", player.name, extras.join(", "))
    }
}

pub fn players_text(team: &TeamStats) -> String {
    let sections = player_sections(team);
    if sections.is_empty() {
        return "No player ratings".to_string();
    }
    let mut lines = Vec::new();
    for (position, players) in sections {
        lines.push(format!("{}:", position.heading()));
        for player in players {
            lines.push(player_line(player));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn shot_lines(stats: &MatchStats) -> Vec<String> {
    stats
        .shots
        .iter()
        .map(|shot| {
            format!(
                "{:>3}' {:<4} {} - {} xG {:.2}",
                shot.minute,
                side_tag(shot.side),
                shot.player,
                shot.outcome.label(),
                shot.xg
            )
        })
        .collect()
}

pub fn side_tag(side: Side) -> &'static str {
    match side {
        Side::Home => "HOME",
        Side::Away => "AWAY",
    }
}

pub fn momentum_summary(stats: &MatchStats) -> String {
    if stats.momentum.is_empty() {
        return "No momentum data".to_string();
    }
    let (h, a) = stats.momentum_balance();
    format!(
        "{} on top for {h} min, {} for {a} min (of {})",
        stats.home.name,
        stats.away.name,
        stats.momentum.len()
    )
}
