use std::env;

use crate::error::ReportError;
use crate::fetch::SOFASCORE_API_BASE;
use crate::narrative::{DEFAULT_MODEL, DEFAULT_MODEL_URL, ModelEndpoint};
use crate::prompt::{MIN_MAX_BYTES, PromptLimits};
use crate::stats::MatchIdentifier;

pub const DEFAULT_MATCH_URL: &str =
    "https://www.sofascore.com/football/match/liverpool-manchester-united/KU#id:12436920";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub match_id: MatchIdentifier,
    pub endpoint: ModelEndpoint,
    pub api_base: String,
    pub limits: PromptLimits,
}

impl ReportConfig {
    pub fn from_process() -> Result<Self, ReportError> {
        let args = env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| env::var(key).ok())
    }

    /// Arguments win over environment, environment over defaults.
    pub fn resolve(
        args: &[String],
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ReportError> {
        let lookup = |flag: &str, key: &str| {
            arg_value(args, flag).or_else(|| env_lookup(key).filter(|v| !v.trim().is_empty()))
        };

        let match_raw = lookup("--match", "MATCH_URL").unwrap_or_else(|| DEFAULT_MATCH_URL.to_string());
        let match_id = MatchIdentifier::parse(&match_raw)?;

        let endpoint = ModelEndpoint {
            url: lookup("--model-url", "OLLAMA_URL").unwrap_or_else(|| DEFAULT_MODEL_URL.to_string()),
            model: lookup("--model", "OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let api_base = env_lookup("SOFASCORE_API_BASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| SOFASCORE_API_BASE.to_string());

        let defaults = PromptLimits::default();
        let limits = PromptLimits {
            max_players_per_side: env_lookup("PROMPT_MAX_PLAYERS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(defaults.max_players_per_side)
                .min(50),
            max_shots: env_lookup("PROMPT_MAX_SHOTS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(defaults.max_shots)
                .min(50),
            max_bytes: env_lookup("PROMPT_MAX_BYTES")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(defaults.max_bytes)
                .max(MIN_MAX_BYTES),
        };

        Ok(Self {
            match_id,
            endpoint,
            api_base,
            limits,
        })
    }
}

/// Reads `--flag value` or `--flag=value`.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
