//! The `import` subcommand: load a JSON dataset into the SQLite database.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file with `candidates`, `committees`, `contributors` and `contributions` arrays
    pub file: PathBuf,
}

pub fn run(args: &ImportArgs, ctx: &Context) -> Result<()> {
    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let db = ctx.open_db()?;
    db.init()?;
    let counts = db.import_json(&json)?;
    eprintln!(
        "Imported {} candidates, {} committees, {} contributors, {} contributions into {}",
        counts.candidates,
        counts.committees,
        counts.contributors,
        counts.contributions,
        ctx.settings.database_path.display()
    );
    Ok(())
}
