use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchIdentifier {
    event_id: u64,
    label: Option<String>,
}

impl MatchIdentifier {
    pub fn new(event_id: u64) -> Self {
        Self {
            event_id,
            label: None,
        }
    }

    pub fn with_label(event_id: u64, label: impl Into<String>) -> Self {
        let label = label.into();
        let label = if label.trim().is_empty() {
            None
        } else {
            Some(label.trim().to_string())
        };
        Self { event_id, label }
    }

    /// Accepts a bare event id, `id:<n>`, or a match page URL ending in `#id:<n>`.
    pub fn parse(raw: &str) -> Result<Self, ReportError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReportError::data_unavailable("empty match identifier"));
        }
        if let Ok(id) = trimmed.parse::<u64>() {
            return Ok(Self::new(id));
        }

        let Some(pos) = trimmed.rfind("id:") else {
            return Err(ReportError::data_unavailable(format!(
                "no event id in match identifier '{trimmed}'"
            )));
        };
        let digits: String = trimmed[pos + 3..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let event_id = digits.parse::<u64>().map_err(|_| {
            ReportError::data_unavailable(format!("invalid event id in '{trimmed}'"))
        })?;

        match slug_from_url(trimmed) {
            Some(slug) => Ok(Self::with_label(event_id, slug)),
            None => Ok(Self::new(event_id)),
        }
    }

    pub fn event_id(&self) -> u64 {
        self.event_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl FromStr for MatchIdentifier {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MatchIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label} (event {})", self.event_id),
            None => write!(f, "event {}", self.event_id),
        }
    }
}

fn slug_from_url(raw: &str) -> Option<String> {
    let (_, rest) = raw.split_once("/match/")?;
    let slug = rest.split(['/', '#', '?']).next()?.trim();
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Reads the leading number of the value: `"55%"` is 55, `"12/20 (60%)"` is 12.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) if n.is_finite() => Some(*n),
            RawValue::Number(_) => None,
            RawValue::Text(s) => leading_number(s),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            RawValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            RawValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        let ok = ch.is_ascii_digit() || ch == '.' || (idx == 0 && (ch == '-' || ch == '+'));
        if !ok {
            break;
        }
        end = idx + ch.len_utf8();
    }
    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStatTable {
    entries: BTreeMap<String, RawValue>,
}

impl RawStatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First alias that yields a number. Exact keys win over case-insensitive ones.
    pub fn number(&self, aliases: &[&str]) -> Option<f64> {
        self.scan(aliases, RawValue::as_number)
    }

    /// First alias that yields non-empty text.
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        self.scan(aliases, |v| {
            let text = v.as_text();
            if text.is_empty() { None } else { Some(text) }
        })
    }

    fn scan<T>(&self, aliases: &[&str], read: impl Fn(&RawValue) -> Option<T>) -> Option<T> {
        for alias in aliases {
            if let Some(found) = self.entries.get(*alias).and_then(&read) {
                return Some(found);
            }
        }
        for alias in aliases {
            let hit = self
                .entries
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(alias))
                .and_then(|(_, v)| read(v));
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawStatTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = RawStatTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayer {
    pub side: Side,
    pub table: RawStatTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShot {
    pub side: Side,
    pub table: RawStatTable,
}

/// Positive values lean towards the home side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumPoint {
    pub minute: f64,
    pub value: f64,
}

/// One half (or other split) of the statistics document, e.g. `1ST` or `2ND`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPeriod {
    pub period: String,
    #[serde(default)]
    pub home: RawStatTable,
    #[serde(default)]
    pub away: RawStatTable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    #[serde(default)]
    pub info: RawStatTable,
    #[serde(default)]
    pub home: RawStatTable,
    #[serde(default)]
    pub away: RawStatTable,
    #[serde(default)]
    pub players: Vec<RawPlayer>,
    #[serde(default)]
    pub shots: Vec<RawShot>,
    #[serde(default)]
    pub momentum: Vec<MomentumPoint>,
    /// Split statistics besides the full match, in source order.
    #[serde(default)]
    pub periods: Vec<RawPeriod>,
}

impl RawMatch {
    /// No team statistics and no players: nothing a report could be built from.
    pub fn is_empty(&self) -> bool {
        self.home.is_empty() && self.away.is_empty() && self.players.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub value: f64,
    pub estimated: bool,
}

impl Metric {
    pub fn observed(value: f64) -> Self {
        Self {
            value,
            estimated: false,
        }
    }

    pub fn estimated(value: f64) -> Self {
        Self {
            value,
            estimated: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StatField {
    Possession,
    Shots,
    ShotsOnTarget,
    ExpectedGoals,
    KeyPasses,
    BigChances,
    Corners,
    Fouls,
    Passes,
    Saves,
    YellowCards,
    RedCards,
}

impl StatField {
    pub const ALL: [StatField; 12] = [
        StatField::Possession,
        StatField::Shots,
        StatField::ShotsOnTarget,
        StatField::ExpectedGoals,
        StatField::KeyPasses,
        StatField::BigChances,
        StatField::Corners,
        StatField::Fouls,
        StatField::Passes,
        StatField::Saves,
        StatField::YellowCards,
        StatField::RedCards,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatField::Possession => "Possession",
            StatField::Shots => "Shots",
            StatField::ShotsOnTarget => "Shots on target",
            StatField::ExpectedGoals => "Expected goals",
            StatField::KeyPasses => "Key passes",
            StatField::BigChances => "Big chances",
            StatField::Corners => "Corners",
            StatField::Fouls => "Fouls",
            StatField::Passes => "Passes",
            StatField::Saves => "Saves",
            StatField::YellowCards => "Yellow cards",
            StatField::RedCards => "Red cards",
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            StatField::Possession => format!("{value:.0}%"),
            StatField::ExpectedGoals => format!("{value:.2}"),
            _ => format!("{value:.0}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Unknown,
}

impl Position {
    pub const ORDER: [Position; 5] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
        Position::Unknown,
    ];

    pub fn short(self) -> &'static str {
        match self {
            Position::Goalkeeper => "G",
            Position::Defender => "D",
            Position::Midfielder => "M",
            Position::Forward => "F",
            Position::Unknown => "?",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeepers",
            Position::Defender => "Defenders",
            Position::Midfielder => "Midfielders",
            Position::Forward => "Forwards",
            Position::Unknown => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRating {
    pub name: String,
    pub side: Side,
    pub position: Position,
    pub rating: Metric,
    pub minutes: Metric,
    pub goals: Metric,
    pub assists: Metric,
    pub key_passes: Metric,
    pub expected_goals: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStats {
    pub side: Side,
    pub name: String,
    pub manager: String,
    pub goals: Metric,
    pub goals_half_time: Metric,
    pub possession: Metric,
    pub shots: Metric,
    pub shots_on_target: Metric,
    pub expected_goals: Metric,
    pub key_passes: Metric,
    pub big_chances: Metric,
    pub corners: Metric,
    pub fouls: Metric,
    pub passes: Metric,
    pub saves: Metric,
    pub yellow_cards: Metric,
    pub red_cards: Metric,
    pub players: Vec<PlayerRating>,
}

impl TeamStats {
    pub fn metric(&self, field: StatField) -> Metric {
        match field {
            StatField::Possession => self.possession,
            StatField::Shots => self.shots,
            StatField::ShotsOnTarget => self.shots_on_target,
            StatField::ExpectedGoals => self.expected_goals,
            StatField::KeyPasses => self.key_passes,
            StatField::BigChances => self.big_chances,
            StatField::Corners => self.corners,
            StatField::Fouls => self.fouls,
            StatField::Passes => self.passes,
            StatField::Saves => self.saves,
            StatField::YellowCards => self.yellow_cards,
            StatField::RedCards => self.red_cards,
        }
    }

    pub fn metric_mut(&mut self, field: StatField) -> &mut Metric {
        match field {
            StatField::Possession => &mut self.possession,
            StatField::Shots => &mut self.shots,
            StatField::ShotsOnTarget => &mut self.shots_on_target,
            StatField::ExpectedGoals => &mut self.expected_goals,
            StatField::KeyPasses => &mut self.key_passes,
            StatField::BigChances => &mut self.big_chances,
            StatField::Corners => &mut self.corners,
            StatField::Fouls => &mut self.fouls,
            StatField::Passes => &mut self.passes,
            StatField::Saves => &mut self.saves,
            StatField::YellowCards => &mut self.yellow_cards,
            StatField::RedCards => &mut self.red_cards,
        }
    }

    pub fn estimated_fields(&self) -> Vec<StatField> {
        StatField::ALL
            .into_iter()
            .filter(|field| self.metric(*field).estimated)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodLine {
    pub field: StatField,
    pub home: Metric,
    pub away: Metric,
}

impl PeriodLine {
    pub fn reported(&self) -> bool {
        !(self.home.estimated && self.away.estimated)
    }
}

/// Schema fields for one half. Every field has a line; unreported ones are estimated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub period: String,
    pub lines: Vec<PeriodLine>,
}

impl PeriodStats {
    pub fn label(&self) -> String {
        match self.period.to_ascii_uppercase().as_str() {
            "1ST" => "1st half".to_string(),
            "2ND" => "2nd half".to_string(),
            "ET1" | "1ET" => "1st extra time".to_string(),
            "ET2" | "2ET" => "2nd extra time".to_string(),
            _ => self.period.clone(),
        }
    }

    pub fn line(&self, field: StatField) -> Option<&PeriodLine> {
        self.lines.iter().find(|l| l.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInfo {
    pub competition: String,
    pub season: String,
    pub round: String,
    pub venue: String,
    pub kickoff: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShotOutcome {
    Goal,
    Saved,
    Missed,
    Blocked,
    Post,
    Unknown,
}

impl ShotOutcome {
    pub fn label(self) -> &'static str {
        match self {
            ShotOutcome::Goal => "goal",
            ShotOutcome::Saved => "saved",
            ShotOutcome::Missed => "missed",
            ShotOutcome::Blocked => "blocked",
            ShotOutcome::Post => "post",
            ShotOutcome::Unknown => "unknown",
        }
    }
}

/// `x` is the distance from the attacked goal line and `y` the position across
/// the pitch, both on a 0-100 scale. `located` is false when the source gave no
/// coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotEvent {
    pub side: Side,
    pub minute: u16,
    pub player: String,
    pub outcome: ShotOutcome,
    pub xg: f64,
    pub x: f64,
    pub y: f64,
    pub located: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Derived {
    pub xg_diff: f64,
    pub shot_diff: f64,
    pub possession_share_home: f64,
}

impl Derived {
    pub fn compute(home: &TeamStats, away: &TeamStats) -> Self {
        let total = home.possession.value + away.possession.value;
        let possession_share_home = if total > 0.0 {
            home.possession.value / total
        } else {
            0.5
        };
        Self {
            xg_diff: home.expected_goals.value - away.expected_goals.value,
            shot_diff: home.shots.value - away.shots.value,
            possession_share_home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStats {
    pub info: MatchInfo,
    pub home: TeamStats,
    pub away: TeamStats,
    pub shots: Vec<ShotEvent>,
    pub momentum: Vec<MomentumPoint>,
    pub periods: Vec<PeriodStats>,
    pub derived: Derived,
}

impl MatchStats {
    pub fn team(&self, side: Side) -> &TeamStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Count of momentum points leaning home and away; level points are skipped.
    pub fn momentum_balance(&self) -> (usize, usize) {
        let home = self.momentum.iter().filter(|p| p.value > 0.0).count();
        let away = self.momentum.iter().filter(|p| p.value < 0.0).count();
        (home, away)
    }
}
