//! Publish command
//!
//! Handles `devdiary publish FILE`: sends an existing markdown diary to every
//! configured destination.

use anyhow::{Context, Result};
use chrono::Local;
use devdiary_adapters::CmarkRenderer;
use devdiary_core::generator::extract_title;
use devdiary_core::ports::Diary;
use std::path::{Path, PathBuf};

use super::print_publish_report;
use crate::app::AppContext;
use crate::wiring::build_publisher;

pub async fn run(ctx: &AppContext, file: PathBuf, title: Option<String>) -> Result<()> {
    let diary = load_diary(&file, title)?;

    let publisher = build_publisher(ctx.config(), &ctx.credentials);
    if publisher.is_empty() {
        println!("No destinations are configured.");
        println!("  Run 'devdiary status' to see which settings and credentials are missing.");
        return Ok(());
    }

    println!("Publishing \"{}\"...", diary.title());
    println!();
    let result = publisher
        .publish(&diary)
        .await
        .context("Failed to publish diary")?;
    print_publish_report(&result);
    Ok(())
}

/// Reads a markdown diary; the title defaults to its first level-1 heading.
fn load_diary(path: &Path, title: Option<String>) -> Result<Diary> {
    let markdown = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| extract_title(&markdown, Local::now().date_naive()));
    Ok(Diary::render(title, markdown, &CmarkRenderer::new()))
}
