//! Generate command
//!
//! Handles `devdiary generate`: drafts a diary from today's activity (or from
//! an edited activity file) and saves it to the diaries directory.

use anyhow::{Context, Result};
use chrono::Local;
use devdiary_core::ports::ActivityData;
use devdiary_core::DiaryExporter;
use std::path::{Path, PathBuf};

use crate::app::AppContext;
use crate::wiring::build_coordinator;

pub async fn run(ctx: &AppContext, input: Option<PathBuf>, no_save: bool) -> Result<()> {
    let activity = match &input {
        Some(path) => Some(read_activity(path)?),
        None => None,
    };

    let coordinator = build_coordinator(ctx.config(), &ctx.dirs, &ctx.credentials).await?;
    println!(
        "Generating diary with {}...",
        coordinator.backend_name()
    );
    let diary = coordinator
        .generate_diary(activity)
        .await
        .context("Failed to generate diary")?;

    println!();
    println!("{}", diary.markdown());

    if no_save {
        return Ok(());
    }

    let exporter = DiaryExporter::new(ctx.dirs.diaries_dir());
    let saved = exporter
        .save(&diary, Local::now().date_naive())
        .context("Failed to save diary")?;
    println!();
    println!("Saved: {}", saved.markdown_path.display());
    println!("       {}", saved.html_path.display());
    println!("Publish it with: devdiary publish {}", saved.markdown_path.display());
    Ok(())
}

fn read_activity(path: &Path) -> Result<ActivityData> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    DiaryExporter::activity_from_json(&json)
        .with_context(|| format!("{} is not a valid activity file", path.display()))
}
