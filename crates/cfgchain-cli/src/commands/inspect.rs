//! Read-only commands: log, verify and diff.

use super::load_chain;
use crate::settings::Settings;
use anyhow::{anyhow, bail, Context, Result};
use camino::Utf8Path;
use cfgchain_diff::{
    diff_lines, to_side_by_side_rows, to_unified_text, DiffKind, DiffStats, NO_CHANGES,
};
use cfgchain_integrity::{read_chain_file, verify_chain_with, BlockReport, BlockStatus};
use cfgchain_model::Chain;
use colored::Colorize;
use serde_json::Value;
use std::thread;
use std::time::Duration;

/// How `cfgchain diff` lays out its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLayout {
    Unified,
    SideBySide,
}

/// Handle the `cfgchain log` command.
pub fn cmd_log(chain_path: &Utf8Path) -> Result<()> {
    let chain = load_chain(chain_path)?;

    if chain.is_empty() {
        println!("{}", "Chain is empty".yellow());
        return Ok(());
    }

    println!("{}", "Configuration Chain".bold().underline());
    println!("{}: {}", "File".bold(), chain_path);
    println!("{}: {}", "Device".bold(), chain.device_id().unwrap_or("-"));
    println!("{}: {}", "Blocks".bold(), chain.len());
    println!();

    for block in &chain {
        println!(
            "{} {}",
            "Version".bold().cyan(),
            block.data.version.to_string().cyan()
        );
        println!("  {}: {}", "Block".bold(), block.index);
        let recorded_at = match block.timestamp.as_datetime() {
            Ok(at) => at.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
            Err(_) => format!("{} (unparsed)", block.timestamp),
        };
        println!("  {}: {}", "Timestamp".bold(), recorded_at);
        println!("  {}: {}", "Operator".bold(), block.data.operator);
        println!("  {}: {}", "Change".bold(), block.data.change_type);
        println!("  {}: {}", "Summary".bold(), block.data.summary);
        println!("  {}: {}", "Hash".bold(), block.hash);
        println!("  {}: {}", "Previous".bold(), block.prev_hash);
        println!();
    }

    Ok(())
}

fn print_report(chain: &Chain<Value>, report: &BlockReport) {
    let version = chain
        .get(report.position)
        .and_then(|block| block.data.get("version"))
        .map_or_else(|| "?".to_string(), Value::to_string);
    let label = format!("Block {} (version {})", report.position, version);

    match &report.status {
        BlockStatus::Verified => {
            println!("{} {} {}", "✓".green().bold(), label, report.status.label());
        }
        failure => {
            println!(
                "{} {} {}",
                "✗".red().bold(),
                label,
                failure.label().red().bold()
            );
            match failure {
                BlockStatus::OutOfSequence { expected, found } => {
                    println!("    expected index {expected}, found {found}");
                }
                BlockStatus::BrokenLink { expected, found } => {
                    println!("    expected prev_hash {expected}");
                    println!("    found prev_hash    {found}");
                }
                BlockStatus::Tampered { stored, recomputed } => {
                    println!("    stored hash     {stored}");
                    println!("    recomputed hash {recomputed}");
                }
                BlockStatus::Verified => {}
            }
        }
    }
}

/// Handle the `cfgchain verify` command.
///
/// One line is printed per block as soon as it is checked; verification
/// stops at the first failing block and the command then fails.
pub fn cmd_verify(settings: &Settings, chain_path: &Utf8Path, delay_ms: u64) -> Result<()> {
    // Untyped payloads: a block whose data no longer fits the schema must still
    // be reported at its own position.
    let chain: Chain<Value> = read_chain_file(chain_path)
        .with_context(|| format!("failed to load chain from {chain_path}"))?;
    let fingerprinter = settings.fingerprinter();
    let delay = Duration::from_millis(delay_ms);

    let verdict = verify_chain_with(&chain, &fingerprinter, |report| {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        print_report(&chain, report);
    })
    .with_context(|| format!("failed to verify {chain_path}"))?;

    if chain.is_empty() {
        println!("{}", "Chain is empty".yellow());
    }

    println!();
    println!("{}", "Summary:".bold().underline());
    println!("  {}: {}", "Blocks".bold(), chain.len());
    println!("  {}: {}", "Checked".bold(), verdict.checked);
    println!("  {}: {}", "Algorithm".bold(), fingerprinter.algorithm());

    match verdict.first_invalid {
        None => {
            println!("  {}: {}", "Status".bold(), "VALID".green().bold());
            Ok(())
        }
        Some(position) => {
            println!("  {}: {}", "Status".bold(), "INVALID".red().bold());
            bail!("chain verification failed at block {position}")
        }
    }
}

fn config_of<'c>(chain: &'c Chain, version: u64, chain_path: &Utf8Path) -> Result<&'c str> {
    chain
        .find_version(version)
        .map(|block| block.data.config.as_str())
        .ok_or_else(|| anyhow!("version {version} not found in {chain_path}"))
}

/// Handle the `cfgchain diff` command.
pub fn cmd_diff(chain_path: &Utf8Path, from: u64, to: u64, layout: DiffLayout) -> Result<()> {
    let chain = load_chain(chain_path)?;
    let old = config_of(&chain, from, chain_path)?;
    let new = config_of(&chain, to, chain_path)?;

    let entries = diff_lines(old, new);
    let stats = DiffStats::of(&entries);

    println!("{}", format!("--- version {from}").red());
    println!("{}", format!("+++ version {to}").green());

    if stats.is_unchanged() {
        println!("{NO_CHANGES}");
        return Ok(());
    }

    match layout {
        DiffLayout::Unified => {
            for line in to_unified_text(&entries).split('\n') {
                let styled = if line.starts_with('+') {
                    line.green()
                } else if line.starts_with('-') {
                    line.red()
                } else {
                    line.normal()
                };
                println!("{styled}");
            }
        }
        DiffLayout::SideBySide => {
            let rows = to_side_by_side_rows(&entries);
            let width = rows
                .iter()
                .filter_map(|row| row.left_line)
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0)
                .min(60);

            for row in &rows {
                let number = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_default();
                let left = format!(
                    "{:>4} {:<width$}",
                    number(row.left_num),
                    row.left_line.unwrap_or("")
                );
                let right = format!(
                    "{:>4} {}",
                    number(row.right_num),
                    row.right_line.unwrap_or("")
                );
                let (left, right) = match row.kind {
                    DiffKind::Removed => (left.red(), right.normal()),
                    DiffKind::Added => (left.normal(), right.green()),
                    DiffKind::Common => (left.normal(), right.normal()),
                };
                println!("{left} | {right}");
            }
        }
    }

    println!();
    println!(
        "{} line(s) added, {} line(s) removed, {} unchanged",
        stats.added, stats.removed, stats.common
    );
    Ok(())
}
