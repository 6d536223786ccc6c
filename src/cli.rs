//! Terminal output helpers for the annotation binary. Everything goes to stderr so that
//! annotation records on stdout stay machine readable.

use std::time::{Duration, Instant};

use colored::Colorize;

pub fn banner(subtitle: &str) {
    eprintln!();
    eprintln!("{} {}", "Clarus".bold().cyan(), subtitle.dimmed());
    eprintln!("{}", "(c) 2026 Michael Stromberg".dimmed());
    eprintln!();
}

pub fn section(title: &str) {
    let bar = "─".repeat(50);
    eprintln!("{} {}", title.bold().blue(), bar.dimmed());
}

pub fn kv(key: &str, value: &str) {
    eprintln!("  {:<20} {}", key.dimmed(), value);
}

pub fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg.yellow());
}

/// Counters reported once a run finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunCounts {
    pub variants: usize,
    pub annotated_transcripts: usize,
    pub skipped: usize,
}

pub fn print_summary(start: Instant, counts: RunCounts) {
    let elapsed = start.elapsed();
    eprintln!();
    eprintln!(
        "{}  {}\n{}  {}\n{}  {}",
        "Variants".dimmed(),
        counts.variants.to_string().bold(),
        "Transcripts".dimmed(),
        counts.annotated_transcripts.to_string().bold(),
        "Time".dimmed(),
        format_elapsed(elapsed).bold(),
    );
    if counts.variants > 0 {
        eprintln!("{}  {}", "Throughput".dimmed(), format_rate(counts.variants, elapsed).bold());
    }
    if counts.skipped > 0 {
        warning(&format!("{} variants skipped", counts.skipped));
    }
    eprintln!();
}

/// Formats a duration as HH:MM:SS.d (tenths of a second).
#[must_use]
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let tenths = d.subsec_millis() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{tenths}")
}

/// Variants per second, scaled to K or M when large.
#[must_use]
pub fn format_rate(count: usize, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return "N/A".to_string();
    }

    let rate = count as f64 / secs;
    if rate >= 1_000_000.0 {
        format!("{:.1} M variants/s", rate / 1_000_000.0)
    } else if rate >= 1_000.0 {
        format!("{:.1} K variants/s", rate / 1_000.0)
    } else {
        format!("{rate:.1} variants/s")
    }
}
