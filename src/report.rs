use tracing::info;

use crate::error::ReportError;
use crate::fetch::{StatSource, require_data};
use crate::narrative::{Narrative, TextGenerator};
use crate::normalize::normalize;
use crate::prompt::{Prompt, PromptLimits, build_prompt};
use crate::stats::{MatchIdentifier, MatchStats};

#[derive(Debug, Clone)]
pub struct MatchReport {
    pub id: MatchIdentifier,
    pub stats: MatchStats,
    pub prompt: Prompt,
    pub narrative: Narrative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Fetching,
    Normalizing,
    BuildingPrompt,
    Generating,
}

impl ReportStage {
    pub fn label(self) -> &'static str {
        match self {
            ReportStage::Fetching => "Fetching match data",
            ReportStage::Normalizing => "Normalizing statistics",
            ReportStage::BuildingPrompt => "Building prompt",
            ReportStage::Generating => "Generating narrative",
        }
    }
}

/// Fetch, normalize, build the prompt, generate. Either kind of failure aborts
/// the run before anything is returned.
pub fn build_report<S, G>(
    source: &S,
    generator: &G,
    id: &MatchIdentifier,
    limits: &PromptLimits,
) -> Result<MatchReport, ReportError>
where
    S: StatSource + ?Sized,
    G: TextGenerator + ?Sized,
{
    build_report_with_progress(source, generator, id, limits, |_| {})
}

/// `build_report` that calls `on_stage` as each stage starts.
pub fn build_report_with_progress<S, G>(
    source: &S,
    generator: &G,
    id: &MatchIdentifier,
    limits: &PromptLimits,
    mut on_stage: impl FnMut(ReportStage),
) -> Result<MatchReport, ReportError>
where
    S: StatSource + ?Sized,
    G: TextGenerator + ?Sized,
{
    on_stage(ReportStage::Fetching);
    let raw = require_data(id, source.fetch(id)?)?;

    on_stage(ReportStage::Normalizing);

    let stats = normalize(&raw);
    let estimated = stats.home.estimated_fields().len() + stats.away.estimated_fields().len();
    info!(
        match_id = %id,
        home = %stats.home.name,
        away = %stats.away.name,
        estimated_fields = estimated,
        "normalized match stats"
    );

    on_stage(ReportStage::BuildingPrompt);
    let prompt = build_prompt(&stats, limits);
    info!(bytes = prompt.len(), limit = limits.max_bytes, "built prompt");

    on_stage(ReportStage::Generating);
    let narrative = generator.generate(&prompt)?;
    info!(chars = narrative.as_str().chars().count(), "narrative generated");

    Ok(MatchReport {
        id: id.clone(),
        stats,
        prompt,
        narrative,
    })
}
