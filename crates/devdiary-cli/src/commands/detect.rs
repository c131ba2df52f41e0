//! Detect command
//!
//! Handles `devdiary detect [FILE]`: prints the language of a file or stdin.

use anyhow::{Context, Result};
use devdiary_core::language;
use std::io::Read;
use std::path::Path;

pub fn run(file: Option<&Path>, show_scores: bool) -> Result<()> {
    let code = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    println!("{}", language::detect(&code));

    if show_scores {
        for (lang, score) in language::score_all(&code).iter().filter(|(_, s)| *s > 0) {
            println!("  {:<12} {}", lang.label(), score);
        }
    }
    Ok(())
}
