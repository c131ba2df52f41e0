//! Run command
//!
//! Handles `devdiary run`: one full collect, generate and publish cycle.

use anyhow::{Context, Result};
use chrono::Local;
use devdiary_core::DiaryExporter;
use tracing::warn;

use super::print_publish_report;
use crate::app::AppContext;
use crate::wiring::build_coordinator;

pub async fn run(ctx: &AppContext) -> Result<()> {
    let coordinator = build_coordinator(ctx.config(), &ctx.dirs, &ctx.credentials).await?;

    println!(
        "Creating today's diary with {}...",
        coordinator.backend_name()
    );
    let run = coordinator
        .create_and_publish_diary()
        .await
        .context("Diary run failed")?;

    println!();
    println!("Title: {}", run.diary.title());

    // A local copy is kept even when every destination failed.
    let exporter = DiaryExporter::new(ctx.dirs.diaries_dir());
    match exporter.save(&run.diary, Local::now().date_naive()) {
        Ok(saved) => println!("Saved: {}", saved.markdown_path.display()),
        Err(e) => warn!(error = %e, "Could not save a local copy of the diary"),
    }
    println!();
    print_publish_report(&run.publish_result);
    Ok(())
}
