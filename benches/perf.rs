use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

use match_narrator::fetch::{assemble_raw_match, parse_lineups_json, parse_statistics_json};
use match_narrator::normalize::normalize;
use match_narrator::prompt::{PromptLimits, build_prompt};
use match_narrator::stats::{MomentumPoint, RawMatch, RawPlayer, RawShot, RawValue, Side};

const EVENT_JSON: &str = include_str!("../tests/fixtures/sofascore_event.json");
const STATISTICS_JSON: &str = include_str!("../tests/fixtures/sofascore_statistics.json");
const MANAGERS_JSON: &str = include_str!("../tests/fixtures/sofascore_managers.json");
const LINEUPS_JSON: &str = include_str!("../tests/fixtures/sofascore_lineups.json");
const SHOTMAP_JSON: &str = include_str!("../tests/fixtures/sofascore_shotmap.json");
const GRAPH_JSON: &str = include_str!("../tests/fixtures/sofascore_graph.json");

fn fixture_match() -> RawMatch {
    assemble_raw_match(
        EVENT_JSON,
        STATISTICS_JSON,
        Some(MANAGERS_JSON),
        Some(LINEUPS_JSON),
        Some(SHOTMAP_JSON),
        Some(GRAPH_JSON),
    )
    .expect("valid fixture json")
}

// Full squads, a busy shot map and a minute-by-minute momentum graph.
fn crowded_match(seed: u64) -> RawMatch {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut raw = fixture_match();

    raw.players = (0..50)
        .map(|idx| RawPlayer {
            side: if idx % 2 == 0 { Side::Home } else { Side::Away },
            table: [
                ("player.name", RawValue::from(format!("Squad Player {idx}"))),
                ("position", RawValue::from(["G", "D", "M", "F"][idx % 4])),
                ("statistics.rating", RawValue::from(rng.gen_range(5.5..9.5))),
                ("statistics.minutesPlayed", RawValue::from(rng.gen_range(1.0..90.0))),
                ("statistics.keyPass", RawValue::from(rng.gen_range(0.0..5.0_f64).floor())),
            ]
            .into_iter()
            .collect(),
        })
        .collect();

    raw.shots = (0..40)
        .map(|idx| RawShot {
            side: if rng.gen_bool(0.55) { Side::Home } else { Side::Away },
            table: [
                ("player.name", RawValue::from(format!("Squad Player {}", idx % 50))),
                ("shotType", RawValue::from("save")),
                ("time", RawValue::from(rng.gen_range(1.0..95.0_f64).floor())),
                ("xg", RawValue::from(rng.gen_range(0.01..0.8))),
                ("playerCoordinates.x", RawValue::from(rng.gen_range(2.0..35.0))),
                ("playerCoordinates.y", RawValue::from(rng.gen_range(10.0..90.0))),
            ]
            .into_iter()
            .collect(),
        })
        .collect();

    raw.momentum = (1..=95)
        .map(|minute| MomentumPoint {
            minute: minute as f64,
            value: rng.gen_range(-100.0..100.0),
        })
        .collect();
    raw
}

fn bench_fixture_assembly(c: &mut Criterion) {
    c.bench_function("assemble_fixture_match", |b| {
        b.iter(|| {
            let raw = fixture_match();
            black_box(raw.players.len());
        })
    });
    c.bench_function("parse_statistics_and_lineups", |b| {
        b.iter(|| {
            let tables = parse_statistics_json(black_box(STATISTICS_JSON)).unwrap();
            let players = parse_lineups_json(black_box(LINEUPS_JSON)).unwrap();
            black_box((tables.0.len(), players.len()));
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let raw = crowded_match(11);
    c.bench_function("normalize_crowded_match", |b| {
        b.iter(|| {
            let stats = normalize(black_box(&raw));
            black_box(stats.derived.xg_diff);
        })
    });
}

fn bench_prompt(c: &mut Criterion) {
    let stats = normalize(&crowded_match(11));
    let limits = PromptLimits::default();
    c.bench_function("build_prompt_crowded_match", |b| {
        b.iter(|| {
            let prompt = build_prompt(black_box(&stats), &limits);
            black_box(prompt.len());
        })
    });

    let tight = PromptLimits {
        max_bytes: 1024,
        ..PromptLimits::default()
    };
    c.bench_function("build_prompt_tight_limit", |b| {
        b.iter(|| {
            let prompt = build_prompt(black_box(&stats), &tight);
            black_box(prompt.len());
        })
    });
}

criterion_group!(benches, bench_fixture_assembly, bench_normalize, bench_prompt);
criterion_main!(benches);
