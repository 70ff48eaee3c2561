mod policy;
mod reports;
mod simulation;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use ofis_game::{DeckData, decode_to_seed};
use policy::PolicyKind;
use simulation::{BatchSummary, RunRecord, run_batch};

#[derive(Debug, Parser)]
#[command(name = "ofis-tester", version = "0.1.0")]
#[command(about = "Automated QA for the Ofis engine - seeded batch simulations with decision policies")]
struct Args {
    /// Path to the deck JSON file
    #[arg(long, default_value = "ofis-tester/assets/deck.json")]
    deck: PathBuf,

    /// Seeds to run (comma-separated numbers or OF-WORD## share codes)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Policies to run (comma-separated, or "all")
    #[arg(long, default_value = "random")]
    policies: String,

    /// Number of iterations per seed and policy
    #[arg(long, default_value_t = 25)]
    iterations: usize,

    /// Stop a run once the day counter reaches this value
    #[arg(long, default_value_t = 400)]
    day_cap: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("{}", "Ofis Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());

    let start_time = Instant::now();
    let deck = load_deck(&args.deck)?;
    let seeds = resolve_seeds(&args.seeds)?;
    let kinds = resolve_policies(&args.policies)?;

    let mut all_records: Vec<RunRecord> = Vec::new();
    let mut summaries: Vec<BatchSummary> = Vec::new();
    for kind in kinds {
        let (records, summary) = run_batch(&deck, &seeds, args.iterations, kind, args.day_cap);
        println!(
            "{} {}: {} runs, {:.1} mean days",
            "done".green(),
            kind,
            summary.runs,
            summary.mean_days
        );
        all_records.extend(records);
        summaries.push(summary);
    }

    let mut output = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(output.writer(), &summaries, &all_records)?,
        _ => reports::generate_console_report(output.writer(), &summaries)?,
    }
    writeln!(output.writer(), "Total time: {:?}", start_time.elapsed())?;
    output.flush_inner()?;

    Ok(())
}

fn load_deck(path: &PathBuf) -> Result<DeckData> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file {}", path.display()))?;
    let deck = DeckData::from_json(&json)
        .with_context(|| format!("failed to parse deck file {}", path.display()))?;
    if deck.is_empty() {
        bail!("deck file {} contains no cards", path.display());
    }
    Ok(deck)
}

fn resolve_seeds(tokens: &str) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in split_csv(tokens) {
        if let Ok(seed) = token.parse::<u64>() {
            seeds.push(seed);
        } else if let Some(seed) = decode_to_seed(&token) {
            seeds.push(seed);
        } else {
            bail!("seed token {token:?} is neither a number nor a share code");
        }
    }
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    Ok(seeds)
}

fn resolve_policies(tokens: &str) -> Result<Vec<PolicyKind>> {
    let tokens = split_csv(tokens);
    if tokens.iter().any(|token| token == "all") {
        return Ok(PolicyKind::ALL.to_vec());
    }
    let mut kinds = Vec::new();
    for token in tokens {
        let Some(kind) = PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.label() == token || format!("{kind:?}").to_lowercase() == token)
        else {
            bail!("unknown policy {token:?}");
        };
        kinds.push(kind);
    }
    if kinds.is_empty() {
        bail!("no policies given");
    }
    Ok(kinds)
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
