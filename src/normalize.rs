use chrono::{DateTime, Utc};

use crate::stats::{
    Derived, MatchInfo, MatchStats, Metric, PeriodLine, PeriodStats, PlayerRating, Position,
    RawMatch, RawPeriod, RawPlayer, RawShot, RawStatTable, ShotEvent, ShotOutcome, Side, StatField,
    TeamStats,
};

pub const UNKNOWN: &str = "unknown";

// Upstream schema drift is absorbed here. Sofascore `key` first, then its display
// name, then Understat/generic spellings.
pub fn field_aliases(field: StatField) -> &'static [&'static str] {
    match field {
        StatField::Possession => &["ballPossession", "Ball possession", "possession"],
        StatField::Shots => &["totalShotsOnGoal", "Total shots", "shots", "totalShots"],
        StatField::ShotsOnTarget => &[
            "shotsOnGoal",
            "Shots on target",
            "shotsOnTarget",
            "shots_on_target",
        ],
        StatField::ExpectedGoals => &["expectedGoals", "Expected goals", "xG", "xg"],
        StatField::KeyPasses => &["keyPasses", "Key passes", "key_passes"],
        StatField::BigChances => &["bigChanceCreated", "Big chances", "bigChances"],
        StatField::Corners => &["cornerKicks", "Corner kicks", "corners"],
        StatField::Fouls => &["fouls", "Fouls"],
        StatField::Passes => &["passes", "Passes", "totalPasses"],
        StatField::Saves => &["goalkeeperSaves", "Goalkeeper saves", "saves"],
        StatField::YellowCards => &["yellowCards", "Yellow cards", "yellow_cards"],
        StatField::RedCards => &["redCards", "Red cards", "red_cards"],
    }
}

const COMPETITION: &[&str] = &[
    "tournament.uniqueTournament.name",
    "tournament.name",
    "competition",
    "league",
];
const SEASON: &[&str] = &["season.year", "season.name", "season"];
const ROUND: &[&str] = &["roundInfo.round", "roundInfo.name", "round", "gameweek"];
const VENUE: &[&str] = &["venue.stadium.name", "venue.name", "venue", "stadium"];
const KICKOFF_TEXT: &[&str] = &["kickoff", "date", "datetime"];
const KICKOFF_TS: &[&str] = &["startTimestamp"];

struct SideInfoAliases {
    name: &'static [&'static str],
    manager: &'static [&'static str],
    goals: &'static [&'static str],
    goals_half_time: &'static [&'static str],
}

const HOME_INFO: SideInfoAliases = SideInfoAliases {
    name: &["homeTeam.name", "homeTeam.shortName", "home_team", "team_h"],
    manager: &["homeManager.name", "homeTeam.manager.name", "home_manager"],
    goals: &["homeScore.current", "homeScore.display", "home_goals", "h_goals"],
    goals_half_time: &["homeScore.period1", "home_goals_ht"],
};

const AWAY_INFO: SideInfoAliases = SideInfoAliases {
    name: &["awayTeam.name", "awayTeam.shortName", "away_team", "team_a"],
    manager: &["awayManager.name", "awayTeam.manager.name", "away_manager"],
    goals: &["awayScore.current", "awayScore.display", "away_goals", "a_goals"],
    goals_half_time: &["awayScore.period1", "away_goals_ht"],
};

const PLAYER_NAME: &[&str] = &["player.name", "name", "player.shortName", "player", "player_name"];
const PLAYER_POSITION: &[&str] = &["position", "player.position", "pos"];
const PLAYER_RATING: &[&str] = &[
    "statistics.rating",
    "rating",
    "statistics.ratingVersions.original",
    "ratingVersions.original",
    "match_rating",
];
const PLAYER_MINUTES: &[&str] = &["statistics.minutesPlayed", "minutesPlayed", "minutes", "time"];
const PLAYER_GOALS: &[&str] = &["statistics.goals", "goals"];
const PLAYER_ASSISTS: &[&str] = &["statistics.goalAssist", "goalAssist", "assists"];
const PLAYER_KEY_PASSES: &[&str] = &["statistics.keyPass", "keyPass", "key_passes"];
const PLAYER_XG: &[&str] = &["statistics.expectedGoals", "expectedGoals", "xG"];

const SHOT_OUTCOME: &[&str] = &["shotType", "result", "outcome"];
const SHOT_MINUTE: &[&str] = &["time", "minute"];
const SHOT_XG: &[&str] = &["xg", "xG", "expectedGoals"];
const SHOT_PLAYER: &[&str] = &["player.name", "player", "player.shortName"];
const SHOT_X: &[&str] = &["playerCoordinates.x"];
const SHOT_Y: &[&str] = &["playerCoordinates.y"];
// Understat: fractions of pitch length towards the attacked goal.
const SHOT_X_FRACTION: &[&str] = &["X"];
const SHOT_Y_FRACTION: &[&str] = &["Y"];

pub fn normalize(raw: &RawMatch) -> MatchStats {
    let info = normalize_info(&raw.info);
    let mut home = normalize_team(Side::Home, &raw.info, &raw.home, &raw.players);
    let mut away = normalize_team(Side::Away, &raw.info, &raw.away, &raw.players);
    (home.possession, away.possession) = possession_pair(&raw.home, &raw.away);

    let mut shots: Vec<ShotEvent> = raw.shots.iter().map(normalize_shot).collect();
    shots.sort_by(|a, b| a.minute.cmp(&b.minute));

    let mut momentum = raw.momentum.clone();
    momentum.retain(|p| p.minute.is_finite() && p.value.is_finite());
    momentum.sort_by(|a, b| a.minute.total_cmp(&b.minute));

    let periods = raw
        .periods
        .iter()
        .filter(|p| !p.period.trim().eq_ignore_ascii_case("ALL"))
        .map(normalize_period)
        .collect();

    let derived = Derived::compute(&home, &away);
    MatchStats {
        info,
        home,
        away,
        shots,
        momentum,
        periods,
        derived,
    }
}

fn normalize_info(table: &RawStatTable) -> MatchInfo {
    let kickoff = table
        .number(KICKOFF_TS)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts as i64, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .or_else(|| table.text(KICKOFF_TEXT));

    MatchInfo {
        competition: text_or_unknown(table, COMPETITION),
        season: text_or_unknown(table, SEASON),
        round: text_or_unknown(table, ROUND),
        venue: text_or_unknown(table, VENUE),
        kickoff: kickoff.unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

fn normalize_team(
    side: Side,
    info: &RawStatTable,
    table: &RawStatTable,
    players: &[RawPlayer],
) -> TeamStats {
    let aliases = match side {
        Side::Home => &HOME_INFO,
        Side::Away => &AWAY_INFO,
    };

    let players: Vec<PlayerRating> = players
        .iter()
        .filter(|p| p.side == side)
        .map(normalize_player)
        .collect();

    let mut team = TeamStats {
        side,
        name: text_or_unknown(info, aliases.name),
        manager: text_or_unknown(info, aliases.manager),
        goals: metric_or_default(info, aliases.goals),
        goals_half_time: metric_or_default(info, aliases.goals_half_time),
        possession: Metric::estimated(0.0),
        shots: Metric::estimated(0.0),
        shots_on_target: Metric::estimated(0.0),
        expected_goals: Metric::estimated(0.0),
        key_passes: Metric::estimated(0.0),
        big_chances: Metric::estimated(0.0),
        corners: Metric::estimated(0.0),
        fouls: Metric::estimated(0.0),
        passes: Metric::estimated(0.0),
        saves: Metric::estimated(0.0),
        yellow_cards: Metric::estimated(0.0),
        red_cards: Metric::estimated(0.0),
        players,
    };

    for field in StatField::ALL {
        if field == StatField::Possession {
            continue;
        }
        *team.metric_mut(field) = metric_or_default(table, field_aliases(field));
    }

    if team.key_passes.estimated {
        let observed: Vec<f64> = team
            .players
            .iter()
            .filter(|p| !p.key_passes.estimated)
            .map(|p| p.key_passes.value)
            .collect();
        if !observed.is_empty() {
            team.key_passes = Metric::observed(observed.iter().sum());
        }
    }

    team
}

// One missing side takes the complement of the other; both missing split evenly.
fn possession_pair(home_table: &RawStatTable, away_table: &RawStatTable) -> (Metric, Metric) {
    let aliases = field_aliases(StatField::Possession);
    let home_raw = home_table.number(aliases).map(|v| v.clamp(0.0, 100.0));
    let away_raw = away_table.number(aliases).map(|v| v.clamp(0.0, 100.0));
    match (home_raw, away_raw) {
        (Some(h), Some(a)) => (Metric::observed(h), Metric::observed(a)),
        (Some(h), None) => (Metric::observed(h), Metric::estimated(100.0 - h)),
        (None, Some(a)) => (Metric::estimated(100.0 - a), Metric::observed(a)),
        (None, None) => (Metric::estimated(50.0), Metric::estimated(50.0)),
    }
}

pub fn normalize_period(raw: &RawPeriod) -> PeriodStats {
    let lines = StatField::ALL
        .into_iter()
        .map(|field| {
            let (home, away) = if field == StatField::Possession {
                possession_pair(&raw.home, &raw.away)
            } else {
                let aliases = field_aliases(field);
                (
                    metric_or_default(&raw.home, aliases),
                    metric_or_default(&raw.away, aliases),
                )
            };
            PeriodLine { field, home, away }
        })
        .collect();
    PeriodStats {
        period: raw.period.trim().to_string(),
        lines,
    }
}

pub fn normalize_player(raw: &RawPlayer) -> PlayerRating {
    let table = &raw.table;
    PlayerRating {
        name: text_or_unknown(table, PLAYER_NAME),
        side: raw.side,
        position: table
            .text(PLAYER_POSITION)
            .map(|p| parse_position(&p))
            .unwrap_or(Position::Unknown),
        rating: metric_or_default(table, PLAYER_RATING),
        minutes: metric_or_default(table, PLAYER_MINUTES),
        goals: metric_or_default(table, PLAYER_GOALS),
        assists: metric_or_default(table, PLAYER_ASSISTS),
        key_passes: metric_or_default(table, PLAYER_KEY_PASSES),
        expected_goals: metric_or_default(table, PLAYER_XG),
    }
}

pub fn parse_position(raw: &str) -> Position {
    match raw.trim().to_ascii_lowercase().as_str() {
        "g" | "gk" | "goalkeeper" | "keeper" => Position::Goalkeeper,
        "d" | "df" | "def" | "defender" | "cb" | "lb" | "rb" | "lwb" | "rwb" => Position::Defender,
        "m" | "mf" | "mid" | "midfielder" | "dm" | "cm" | "am" | "dmc" | "amc" | "lm" | "rm" => {
            Position::Midfielder
        }
        "f" | "fw" | "forward" | "st" | "cf" | "lw" | "rw" | "striker" | "attacker" => {
            Position::Forward
        }
        _ => Position::Unknown,
    }
}

pub fn normalize_shot(raw: &RawShot) -> ShotEvent {
    let table = &raw.table;
    let (x, y, located) = match (table.number(SHOT_X), table.number(SHOT_Y)) {
        (Some(x), y) => (x, y.unwrap_or(50.0), true),
        (None, _) => match (table.number(SHOT_X_FRACTION), table.number(SHOT_Y_FRACTION)) {
            (Some(x), y) => ((1.0 - x) * 100.0, y.unwrap_or(0.5) * 100.0, true),
            (None, _) => (0.0, 50.0, false),
        },
    };

    ShotEvent {
        side: raw.side,
        minute: table
            .number(SHOT_MINUTE)
            .map(|m| m.clamp(0.0, u16::MAX as f64) as u16)
            .unwrap_or(0),
        player: text_or_unknown(table, SHOT_PLAYER),
        outcome: table
            .text(SHOT_OUTCOME)
            .map(|o| parse_outcome(&o))
            .unwrap_or(ShotOutcome::Unknown),
        xg: table.number(SHOT_XG).unwrap_or(0.0).max(0.0),
        x: x.clamp(0.0, 100.0),
        y: y.clamp(0.0, 100.0),
        located,
    }
}

pub fn parse_outcome(raw: &str) -> ShotOutcome {
    let lowered = raw.to_ascii_lowercase();
    if lowered.contains("post") || lowered.contains("woodwork") {
        ShotOutcome::Post
    } else if lowered.contains("goal") {
        ShotOutcome::Goal
    } else if lowered.contains("save") {
        ShotOutcome::Saved
    } else if lowered.contains("block") {
        ShotOutcome::Blocked
    } else if lowered.contains("miss") {
        ShotOutcome::Missed
    } else {
        ShotOutcome::Unknown
    }
}

fn metric_or_default(table: &RawStatTable, aliases: &[&str]) -> Metric {
    match table.number(aliases) {
        Some(value) => Metric::observed(value),
        None => Metric::estimated(0.0),
    }
}

fn text_or_unknown(table: &RawStatTable, aliases: &[&str]) -> String {
    table.text(aliases).unwrap_or_else(|| UNKNOWN.to_string())
}
