use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::http_client::get_text;
use crate::stats::{
    MatchIdentifier, MomentumPoint, RawMatch, RawPeriod, RawPlayer, RawShot, RawStatTable,
    RawValue, Side,
};

pub const SOFASCORE_API_BASE: &str = "https://api.sofascore.com/api/v1";
const MAX_FLATTEN_DEPTH: usize = 4;

/// Scraping backend boundary.
pub trait StatSource {
    fn fetch(&self, id: &MatchIdentifier) -> Result<RawMatch, ReportError>;
}

pub struct SofascoreSource {
    client: Client,
    base_url: String,
}

impl SofascoreSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn event_url(&self, id: &MatchIdentifier, section: Option<&str>) -> String {
        match section {
            Some(section) => format!("{}/event/{}/{section}", self.base_url, id.event_id()),
            None => format!("{}/event/{}", self.base_url, id.event_id()),
        }
    }

    fn required(&self, id: &MatchIdentifier, section: Option<&str>) -> Result<String, ReportError> {
        let url = self.event_url(id, section);
        debug!(%url, "fetching required section");
        get_text(&self.client, &url).map_err(|err| unavailable(id, err))
    }

    fn optional(&self, id: &MatchIdentifier, section: &str) -> Option<String> {
        let url = self.event_url(id, Some(section));
        match get_text(&self.client, &url) {
            Ok(body) => Some(body),
            Err(err) => {
                warn!(%url, error = %format!("{err:#}"), "optional section unavailable");
                None
            }
        }
    }
}

impl StatSource for SofascoreSource {
    fn fetch(&self, id: &MatchIdentifier) -> Result<RawMatch, ReportError> {
        let event = self.required(id, None)?;
        let statistics = self.required(id, Some("statistics"))?;
        let managers = self.optional(id, "managers");
        let lineups = self.optional(id, "lineups");
        let shotmap = self.optional(id, "shotmap");
        let graph = self.optional(id, "graph");

        let raw = assemble_raw_match(
            &event,
            &statistics,
            managers.as_deref(),
            lineups.as_deref(),
            shotmap.as_deref(),
            graph.as_deref(),
        )
        .map_err(|err| unavailable(id, err))?;

        let raw = require_data(id, raw)?;
        info!(
            match_id = %id,
            players = raw.players.len(),
            shots = raw.shots.len(),
            momentum = raw.momentum.len(),
            "fetched match data"
        );
        Ok(raw)
    }
}

/// Rejects a fetch that came back without team statistics or players.
pub fn require_data(id: &MatchIdentifier, raw: RawMatch) -> Result<RawMatch, ReportError> {
    if raw.is_empty() {
        return Err(ReportError::data_unavailable(format!(
            "no statistics returned for {id}"
        )));
    }
    Ok(raw)
}

fn unavailable(id: &MatchIdentifier, err: anyhow::Error) -> ReportError {
    ReportError::data_unavailable(format!("{id}: {err:#}"))
}

/// Optional sections that fail to parse are dropped; the required ones propagate.
pub fn assemble_raw_match(
    event: &str,
    statistics: &str,
    managers: Option<&str>,
    lineups: Option<&str>,
    shotmap: Option<&str>,
    graph: Option<&str>,
) -> Result<RawMatch> {
    let mut info = parse_event_json(event)?;
    let mut periods = parse_statistics_periods_json(statistics)?;
    let (home, away) = take_full_match(&mut periods);

    if let Some(raw) = managers {
        match parse_managers_json(raw) {
            Ok(table) => {
                for (key, value) in table.iter() {
                    info.insert(key, value.clone());
                }
            }
            Err(err) => warn!(error = %format!("{err:#}"), "ignoring managers"),
        }
    }

    let players = lineups
        .map(parse_lineups_json)
        .transpose()
        .unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring lineups");
            None
        })
        .unwrap_or_default();
    let shots = shotmap
        .map(parse_shotmap_json)
        .transpose()
        .unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring shotmap");
            None
        })
        .unwrap_or_default();
    let momentum = graph
        .map(parse_graph_json)
        .transpose()
        .unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring momentum graph");
            None
        })
        .unwrap_or_default();

    Ok(RawMatch {
        info,
        home,
        away,
        players,
        shots,
        momentum,
        periods,
    })
}

pub fn parse_event_json(raw: &str) -> Result<RawStatTable> {
    let mut table = RawStatTable::new();
    let Some(root) = parse_root(raw, "invalid event json")? else {
        return Ok(table);
    };
    let event = root.get("event").unwrap_or(&root);
    flatten_into(&mut table, "", event, 0);
    Ok(table)
}

pub fn parse_managers_json(raw: &str) -> Result<RawStatTable> {
    let mut table = RawStatTable::new();
    let Some(root) = parse_root(raw, "invalid managers json")? else {
        return Ok(table);
    };
    for key in ["homeManager", "awayManager"] {
        if let Some(value) = root.get(key) {
            flatten_into(&mut table, key, value, 1);
        }
    }
    Ok(table)
}

/// Home and away tables of the `ALL` period, or of the first period listed.
/// Each item is stored under its `key` and under its display name.
pub fn parse_statistics_json(raw: &str) -> Result<(RawStatTable, RawStatTable)> {
    let mut periods = parse_statistics_periods_json(raw)?;
    Ok(take_full_match(&mut periods))
}

/// Every period of the statistics document (`ALL`, `1ST`, `2ND`, ...) in source order.
pub fn parse_statistics_periods_json(raw: &str) -> Result<Vec<RawPeriod>> {
    let Some(root) = parse_root(raw, "invalid statistics json")? else {
        return Ok(Vec::new());
    };
    let Some(periods) = root.get("statistics").and_then(|v| v.as_array()) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for (idx, period) in periods.iter().enumerate() {
        let name = period
            .get("period")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("P{}", idx + 1));
        let (home, away) = parse_period_items(period);
        out.push(RawPeriod {
            period: name,
            home,
            away,
        });
    }
    Ok(out)
}

// Removes the full-match period from the list and returns its tables.
fn take_full_match(periods: &mut Vec<RawPeriod>) -> (RawStatTable, RawStatTable) {
    let idx = periods
        .iter()
        .position(|p| p.period.eq_ignore_ascii_case("ALL"))
        .or_else(|| (!periods.is_empty()).then_some(0));
    match idx {
        Some(idx) => {
            let full = periods.remove(idx);
            (full.home, full.away)
        }
        None => (RawStatTable::new(), RawStatTable::new()),
    }
}

fn parse_period_items(period: &Value) -> (RawStatTable, RawStatTable) {
    let mut home = RawStatTable::new();
    let mut away = RawStatTable::new();
    let groups = period
        .get("groups")
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();
    for group in groups {
        let Some(items) = group.get("statisticsItems").and_then(|v| v.as_array()) else {
            continue;
        };
        for item in items {
            let names: Vec<&str> = ["key", "name"]
                .iter()
                .filter_map(|k| item.get(*k).and_then(|v| v.as_str()))
                .filter(|s| !s.trim().is_empty())
                .collect();
            if names.is_empty() {
                continue;
            }
            let h = item.get("homeValue").or_else(|| item.get("home"));
            let a = item.get("awayValue").or_else(|| item.get("away"));
            for name in names {
                if let Some(v) = h.and_then(scalar) {
                    home.insert(name, v);
                }
                if let Some(v) = a.and_then(scalar) {
                    away.insert(name, v);
                }
            }
        }
    }
    (home, away)
}

pub fn parse_lineups_json(raw: &str) -> Result<Vec<RawPlayer>> {
    let mut out = Vec::new();
    let Some(root) = parse_root(raw, "invalid lineups json")? else {
        return Ok(out);
    };
    for (key, side) in [("home", Side::Home), ("away", Side::Away)] {
        let Some(list) = root
            .get(key)
            .and_then(|v| v.get("players"))
            .and_then(|v| v.as_array())
        else {
            continue;
        };
        for entry in list {
            let mut table = RawStatTable::new();
            flatten_into(&mut table, "", entry, 0);
            if !table.is_empty() {
                out.push(RawPlayer { side, table });
            }
        }
    }
    Ok(out)
}

pub fn parse_shotmap_json(raw: &str) -> Result<Vec<RawShot>> {
    let mut out = Vec::new();
    let Some(root) = parse_root(raw, "invalid shotmap json")? else {
        return Ok(out);
    };
    let Some(list) = root.get("shotmap").and_then(|v| v.as_array()) else {
        return Ok(out);
    };
    for entry in list {
        let side = match entry.get("isHome").and_then(|v| v.as_bool()) {
            Some(false) => Side::Away,
            _ => Side::Home,
        };
        let mut table = RawStatTable::new();
        flatten_into(&mut table, "", entry, 0);
        out.push(RawShot { side, table });
    }
    Ok(out)
}

pub fn parse_graph_json(raw: &str) -> Result<Vec<MomentumPoint>> {
    let mut out = Vec::new();
    let Some(root) = parse_root(raw, "invalid graph json")? else {
        return Ok(out);
    };
    let Some(points) = root.get("graphPoints").and_then(|v| v.as_array()) else {
        return Ok(out);
    };
    for point in points {
        let minute = point.get("minute").and_then(|v| v.as_f64());
        let value = point.get("value").and_then(|v| v.as_f64());
        if let (Some(minute), Some(value)) = (minute, value) {
            out.push(MomentumPoint { minute, value });
        }
    }
    Ok(out)
}

fn parse_root(raw: &str, what: &'static str) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context(what)?;
    Ok(Some(root))
}

// Objects nest into dotted keys; arrays are skipped.
fn flatten_into(table: &mut RawStatTable, prefix: &str, value: &Value, depth: usize) {
    match value {
        Value::Object(map) => {
            if depth > MAX_FLATTEN_DEPTH {
                return;
            }
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(table, &path, child, depth + 1);
            }
        }
        other => {
            if prefix.is_empty() {
                return;
            }
            if let Some(v) = scalar(other) {
                table.insert(prefix, v);
            }
        }
    }
}

fn scalar(value: &Value) -> Option<RawValue> {
    match value {
        Value::Number(n) => n.as_f64().map(RawValue::Number),
        Value::String(s) => Some(RawValue::Text(s.trim().to_string())),
        Value::Bool(b) => Some(RawValue::Text(if *b { "yes" } else { "no" }.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
