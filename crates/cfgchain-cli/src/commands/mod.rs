//! Subcommand handlers.

mod inspect;
mod record;

pub use inspect::{cmd_diff, cmd_log, cmd_verify, DiffLayout};
pub use record::{cmd_commit, cmd_init, cmd_rollback};

use anyhow::{Context, Result};
use camino::Utf8Path;
use cfgchain_integrity::ChainExt;
use cfgchain_model::Chain;

fn load_chain(path: &Utf8Path) -> Result<Chain> {
    <Chain as ChainExt>::load_from_file(path)
        .with_context(|| format!("failed to load chain from {path}"))
}

fn save_chain(chain: &Chain, path: &Utf8Path) -> Result<()> {
    chain
        .save_to_file(path)
        .with_context(|| format!("failed to write chain to {path}"))
}
