mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use cli::Cli;
use linefate::analysis::{AnalysisReport, LifespanBucket};
use linefate::logging;
use linefate::repository::{GitSource, reporter};
use linefate::util::{format_duration, format_percent, format_timestamp};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet))?;

    let config = cli.analysis_config()?;
    let source = GitSource::open(&cli.repo_path)?;
    tracing::info!(repo = %source.repo_path().display(), head = %source.head_id(), "analyzing");

    let progress = reporter(!cli.quiet);
    let report = linefate::analyze(&source, config, progress.as_ref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &report).context("Failed to write JSON report")?;
        writeln!(out)?;
    } else {
        print_summary(&mut out, &report)?;
    }
    Ok(())
}

fn print_summary(out: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
    let h = &report.history;
    writeln!(
        out,
        "History: {} commits, {} paths ever, {} at final state ({} lines)",
        h.commits, h.paths_ever, h.final_files, h.final_lines
    )?;
    if let (Some(first), Some(last)) = (h.first_timestamp, h.last_timestamp) {
        writeln!(
            out,
            "Span:    {} .. {} ({})",
            format_timestamp(first),
            format_timestamp(last),
            format_duration(last - first)
        )?;
    }

    let s = &report.survival;
    writeln!(out)?;
    writeln!(
        out,
        "Survival: {} of {} lines ({}), {} commits with nothing surviving",
        s.total_survived,
        s.total_added,
        format_percent(s.overall_rate),
        s.zero_survival_commits
    )?;
    let phases: Vec<String> = s.phases.iter().map(|p| format_percent(p.rate)).collect();
    writeln!(
        out,
        "  by phase: {}  -> {}",
        phases.join(" | "),
        report.verdict.convergence.as_str()
    )?;
    for c in &s.by_category {
        writeln!(
            out,
            "  {:<8} {:>8} / {:<8} {}",
            c.category,
            c.survived,
            c.added,
            format_percent(c.rate)
        )?;
    }

    let t = &report.trajectory;
    writeln!(out)?;
    writeln!(
        out,
        "Trajectories: {} learning, {} thrashing, {} mixed, {} with too few samples",
        t.tally.learning, t.tally.thrashing, t.tally.mixed, t.tally.insufficient_data
    )?;
    writeln!(
        out,
        "  files with oscillating lines: {} ({} flagged)",
        t.oscillation.len(),
        t.flagged_files
    )?;
    let retention: Vec<String> = t
        .retention_by_phase
        .iter()
        .map(|p| p.rate.map_or_else(|| "n/a".to_string(), format_percent))
        .collect();
    writeln!(
        out,
        "  retention after {} commits by phase: {}",
        t.retention_window,
        retention.join(" | ")
    )?;

    let c = &report.coordination;
    writeln!(out)?;
    writeln!(
        out,
        "Coordination: {} thrash incidents, {} rapid overwrites over {} touches",
        c.thrash_incidents, c.rapid_overwrites, c.total_touches
    )?;
    for spot in c.hotspots.iter().take(10) {
        writeln!(out, "  {:>5}  {}", spot.incidents, spot.path)?;
    }

    let a = &report.abandoned;
    writeln!(out)?;
    writeln!(
        out,
        "Abandoned: {} of {} files, {} lines invested, {} replaced",
        a.abandoned_files, a.files_ever, a.invested_lines, a.replaced_files
    )?;
    for (bucket, group) in LifespanBucket::ALL.iter().zip(&a.by_bucket) {
        writeln!(
            out,
            "  {:<20} {:>5} files {:>8} lines",
            bucket.as_str(),
            group.files,
            group.investment_lines
        )?;
    }
    for record in a.records.iter().take(10) {
        let replaced = record
            .replaced_by
            .as_deref()
            .map(|p| format!(" -> {}", p))
            .unwrap_or_default();
        writeln!(
            out,
            "  {:>8}  {} ({}){}",
            record.investment_lines,
            record.path,
            format_duration(record.lifespan_secs),
            replaced
        )?;
    }
    Ok(())
}
