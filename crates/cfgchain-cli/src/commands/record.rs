//! Commands that append blocks: init, commit and rollback.

use super::{load_chain, save_chain};
use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use cfgchain_annotate::{BlockBuilder, Proposal};
use cfgchain_diff::{decode_text, Side};
use cfgchain_integrity::verify_chain;
use cfgchain_model::{Block, Chain};
use colored::Colorize;
use std::fs;

fn block_builder(settings: &Settings) -> Result<BlockBuilder> {
    BlockBuilder::new(settings.fingerprinter(), &settings.annotation)
        .context("failed to set up the annotation provider")
}

fn read_config(path: &Utf8Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read configuration from {path}"))?;
    let text = decode_text(&bytes, Side::Right)
        .with_context(|| format!("{path} is not a configuration text file"))?;
    Ok(text.to_string())
}

/// Refuse to extend a chain that no longer verifies.
fn ensure_valid(settings: &Settings, chain: &Chain, path: &Utf8Path) -> Result<()> {
    let verdict = verify_chain(chain, &settings.fingerprinter())
        .with_context(|| format!("failed to verify {path}"))?;
    if let Some(position) = verdict.first_invalid {
        bail!("{path} fails verification at block {position}; run `cfgchain verify` for details");
    }
    Ok(())
}

/// Owned copy of a proposal, so it can be reported once the chain is saved.
struct Recorded {
    block: Block,
    annotated: bool,
}

impl From<Proposal<'_>> for Recorded {
    fn from(proposal: Proposal<'_>) -> Self {
        Self {
            block: proposal.block.clone(),
            annotated: proposal.annotated,
        }
    }
}

fn print_recorded(headline: &str, recorded: &Recorded) {
    let block = &recorded.block;
    println!("{} {}", "✓".green().bold(), headline);
    println!("  {}: {}", "Device".bold(), block.data.device_id);
    println!(
        "  {}: {}",
        "Version".bold(),
        block.data.version.to_string().cyan()
    );
    println!("  {}: {}", "Block".bold(), block.index);
    println!("  {}: {}", "Hash".bold(), block.hash);
    println!("  {}: {}", "Summary".bold(), block.data.summary);
    if !recorded.annotated {
        println!(
            "  {}",
            "annotator unavailable, basic diff recorded".yellow()
        );
    }
}

/// Handle `cfgchain init`.
pub fn cmd_init(
    settings: &Settings,
    chain_path: &Utf8Path,
    device: &str,
    config_path: &Utf8Path,
    operator: &str,
) -> Result<()> {
    if chain_path.exists() {
        bail!("{chain_path} already exists; refusing to overwrite");
    }
    let config = read_config(config_path)?;
    let builder = block_builder(settings)?;

    let mut chain = Chain::new();
    let proposal = builder.genesis(&mut chain, device, operator, &config)?;
    let recorded = Recorded::from(proposal);

    save_chain(&chain, chain_path)?;
    print_recorded("Chain initialized", &recorded);
    Ok(())
}

/// Handle `cfgchain commit`.
pub fn cmd_commit(
    settings: &Settings,
    chain_path: &Utf8Path,
    config_path: &Utf8Path,
    operator: &str,
) -> Result<()> {
    let mut chain = load_chain(chain_path)?;
    ensure_valid(settings, &chain, chain_path)?;
    let config = read_config(config_path)?;
    let builder = block_builder(settings)?;

    let proposal = builder.update(&mut chain, operator, &config)?;
    let recorded = Recorded::from(proposal);

    save_chain(&chain, chain_path)?;
    print_recorded("Configuration committed", &recorded);
    Ok(())
}

/// Handle `cfgchain rollback`.
pub fn cmd_rollback(
    settings: &Settings,
    chain_path: &Utf8Path,
    target_version: u64,
    operator: &str,
) -> Result<()> {
    let mut chain = load_chain(chain_path)?;
    ensure_valid(settings, &chain, chain_path)?;
    let builder = block_builder(settings)?;

    let proposal = builder.rollback(&mut chain, target_version, operator)?;
    let recorded = Recorded::from(proposal);

    save_chain(&chain, chain_path)?;
    print_recorded(&format!("Rolled back to version {target_version}"), &recorded);
    Ok(())
}
