use std::cell::{Cell, RefCell};
use std::fs;
use std::path::PathBuf;

use match_narrator::error::ReportError;
use match_narrator::fetch::StatSource;
use match_narrator::narrative::{Narrative, TextGenerator};
use match_narrator::prompt::{Prompt, PromptLimits};
use match_narrator::report::{ReportStage, build_report, build_report_with_progress};
use match_narrator::stats::{MatchIdentifier, RawMatch};

struct FixedSource(Result<RawMatch, ReportError>);

impl StatSource for FixedSource {
    fn fetch(&self, _id: &MatchIdentifier) -> Result<RawMatch, ReportError> {
        self.0.clone()
    }
}

struct RecordingGenerator {
    reply: String,
    calls: Cell<usize>,
    last_prompt: RefCell<Option<String>>,
}

impl RecordingGenerator {
    fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Cell::new(0),
            last_prompt: RefCell::new(None),
        }
    }
}

impl TextGenerator for RecordingGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<Narrative, ReportError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_prompt.borrow_mut() = Some(prompt.as_str().to_string());
        Narrative::new(self.reply.clone())
    }
}

fn fixture_match() -> RawMatch {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/raw_match.json");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should parse")
}

fn id() -> MatchIdentifier {
    MatchIdentifier::with_label(12436920, "liverpool-manchester-united")
}

#[test]
fn empty_fetch_is_data_unavailable_and_skips_generation() {
    let source = FixedSource(Ok(RawMatch::default()));
    let generator = RecordingGenerator::replying("should never be used");

    let err = build_report(&source, &generator, &id(), &PromptLimits::default()).unwrap_err();
    assert!(err.is_data_unavailable(), "{err}");
    assert_eq!(generator.calls.get(), 0);
}

#[test]
fn source_failure_is_passed_through() {
    let source = FixedSource(Err(ReportError::data_unavailable("http 404")));
    let generator = RecordingGenerator::replying("unused");

    let err = build_report(&source, &generator, &id(), &PromptLimits::default()).unwrap_err();
    assert_eq!(err, ReportError::DataUnavailable("http 404".to_string()));
    assert_eq!(generator.calls.get(), 0);
}

#[test]
fn empty_model_output_is_generation_failed() {
    let source = FixedSource(Ok(fixture_match()));
    let generator = RecordingGenerator::replying("  \n ");

    let err = build_report(&source, &generator, &id(), &PromptLimits::default()).unwrap_err();
    assert!(err.is_generation_failed(), "{err}");
    assert_eq!(generator.calls.get(), 1);
}

#[test]
fn successful_run_carries_all_stages() {
    let source = FixedSource(Ok(fixture_match()));
    let generator = RecordingGenerator::replying("Liverpool cruised past United at Anfield.");
    let limits = PromptLimits::default();

    let report = build_report(&source, &generator, &id(), &limits).expect("report should build");

    assert_eq!(generator.calls.get(), 1);
    assert_eq!(report.id.event_id(), 12436920);
    assert_eq!(report.stats.home.name, "Liverpool");
    assert_eq!(
        report.narrative.as_str(),
        "Liverpool cruised past United at Anfield."
    );
    assert!(report.prompt.len() <= limits.max_bytes);
    assert_eq!(
        generator.last_prompt.borrow().as_deref(),
        Some(report.prompt.as_str())
    );
}

#[test]
fn stub_source_can_be_used_through_a_trait_object() {
    let source: Box<dyn StatSource> = Box::new(FixedSource(Ok(fixture_match())));
    let generator: Box<dyn TextGenerator> = Box::new(RecordingGenerator::replying("Report."));

    let report = build_report(
        source.as_ref(),
        generator.as_ref(),
        &id(),
        &PromptLimits::default(),
    )
    .expect("report should build");
    assert_eq!(report.narrative.to_string(), "Report.");
}

#[test]
fn stages_are_reported_in_order() {
    let source = FixedSource(Ok(fixture_match()));
    let generator = RecordingGenerator::replying("Report.");
    let mut stages = Vec::new();

    build_report_with_progress(&source, &generator, &id(), &PromptLimits::default(), |stage| {
        stages.push(stage)
    })
    .expect("report should build");
    assert_eq!(
        stages,
        [
            ReportStage::Fetching,
            ReportStage::Normalizing,
            ReportStage::BuildingPrompt,
            ReportStage::Generating,
        ]
    );
}

#[test]
fn generation_stage_is_not_announced_when_fetch_fails() {
    let source = FixedSource(Ok(RawMatch::default()));
    let generator = RecordingGenerator::replying("unused");
    let mut stages = Vec::new();

    let err = build_report_with_progress(&source, &generator, &id(), &PromptLimits::default(), |stage| {
        stages.push(stage)
    })
    .unwrap_err();
    assert!(err.is_data_unavailable());
    assert_eq!(stages, [ReportStage::Fetching]);
}
