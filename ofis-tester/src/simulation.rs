use std::collections::BTreeMap;

use log::debug;
use ofis_game::{DeckData, Ending, GameSession, encode_friendly};
use serde::Serialize;

use crate::policy::PolicyKind;

/// Metrics for one completed (or capped) run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub seed_code: String,
    pub days: u32,
    pub turns: u32,
    pub ending: Option<Ending>,
}

/// Aggregate over every run a policy played.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub policy: String,
    pub runs: usize,
    pub mean_days: f64,
    pub min_days: u32,
    pub max_days: u32,
    pub win_rate: f64,
    pub capped: usize,
    pub endings: BTreeMap<String, usize>,
}

/// Drive one seeded session to its ending or the day cap.
pub fn run_one(deck: &DeckData, seed: u64, kind: PolicyKind, day_cap: u32) -> RunRecord {
    let mut policy = kind.create(seed);
    let mut session = GameSession::new(deck, seed).expect("deck validated at load");
    session.begin();

    let mut turns = 0_u32;
    while !session.is_game_over() && session.resources().day < day_cap {
        let choice = match session.current_card() {
            Some(card) => policy.decide(session.resources(), card),
            // calm day: any swipe advances the clock
            None => true,
        };
        session.apply_choice(choice);
        turns += 1;
    }

    let record = RunRecord {
        seed,
        seed_code: encode_friendly(seed),
        days: session.days_survived(),
        turns,
        ending: session.ending(),
    };
    debug!(
        "run seed={} policy={} days={} ending={:?}",
        record.seed_code,
        kind.label(),
        record.days,
        record.ending
    );
    record
}

/// Run `iterations` sessions per base seed and fold them into a summary.
pub fn run_batch(
    deck: &DeckData,
    seeds: &[u64],
    iterations: usize,
    kind: PolicyKind,
    day_cap: u32,
) -> (Vec<RunRecord>, BatchSummary) {
    let mut records = Vec::with_capacity(seeds.len() * iterations);
    for &seed in seeds {
        for iteration in 0..iterations {
            let run_seed = derive_seed(seed, iteration);
            records.push(run_one(deck, run_seed, kind, day_cap));
        }
    }
    let summary = summarize(kind, &records);
    (records, summary)
}

// SplitMix-style spread so per-iteration seeds do not collide across bases.
fn derive_seed(base: u64, iteration: usize) -> u64 {
    base.wrapping_add((iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn summarize(kind: PolicyKind, records: &[RunRecord]) -> BatchSummary {
    let runs = records.len();
    let mut endings: BTreeMap<String, usize> = BTreeMap::new();
    let mut wins = 0_usize;
    let mut capped = 0_usize;
    let mut total_days = 0_u64;
    let mut min_days = u32::MAX;
    let mut max_days = 0_u32;

    for record in records {
        total_days += u64::from(record.days);
        min_days = min_days.min(record.days);
        max_days = max_days.max(record.days);
        match record.ending {
            Some(ending) => {
                if ending.is_win() {
                    wins += 1;
                }
                *endings.entry(ending.to_string()).or_default() += 1;
            }
            None => capped += 1,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_days = if runs == 0 {
        0.0
    } else {
        total_days as f64 / runs as f64
    };
    #[allow(clippy::cast_precision_loss)]
    let win_rate = if runs == 0 {
        0.0
    } else {
        wins as f64 / runs as f64
    };

    BatchSummary {
        policy: kind.label().to_string(),
        runs,
        mean_days,
        min_days: if runs == 0 { 0 } else { min_days },
        max_days,
        win_rate,
        capped,
        endings,
    }
}
