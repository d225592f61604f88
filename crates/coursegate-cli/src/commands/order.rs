//! The `coursegate order` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use coursegate_core::sequencing::{order_of, Sibling};

pub fn execute(siblings_path: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&siblings_path)
        .with_context(|| format!("failed to read siblings: {}", siblings_path.display()))?;
    let siblings: Vec<Sibling> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", siblings_path.display()))?;

    println!("{}", serde_json::to_string(&order_of(&siblings))?);
    Ok(())
}
