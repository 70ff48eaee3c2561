use std::io::Write;

use anyhow::Result;
use colored::Colorize;

use crate::simulation::{BatchSummary, RunRecord};

/// Human-readable console summary, one block per policy.
pub fn generate_console_report(out: &mut dyn Write, summaries: &[BatchSummary]) -> Result<()> {
    writeln!(out, "{}", "Survival Summary".bold())?;
    writeln!(out, "{}", "-".repeat(40))?;
    for summary in summaries {
        writeln!(
            out,
            "{}  runs:{}  days avg:{:.1} min:{} max:{}  wins:{:.1}%  capped:{}",
            summary.policy.bright_cyan(),
            summary.runs,
            summary.mean_days,
            summary.min_days,
            summary.max_days,
            summary.win_rate * 100.0,
            summary.capped,
        )?;
        for (ending, count) in &summary.endings {
            writeln!(out, "    {ending:15} {count}")?;
        }
    }
    Ok(())
}

/// Machine-readable dump of both summaries and per-run records.
pub fn generate_json_report(
    out: &mut dyn Write,
    summaries: &[BatchSummary],
    records: &[RunRecord],
) -> Result<()> {
    let report = serde_json::json!({
        "summaries": summaries,
        "runs": records,
    });
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
