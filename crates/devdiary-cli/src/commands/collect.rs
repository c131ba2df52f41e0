//! Collect command
//!
//! Handles `devdiary collect`: gathers today's activity and prints it as JSON
//! together with snippet insights.

use anyhow::{Context, Result};
use devdiary_core::ports::ActivityData;
use devdiary_core::{ActivityCollector, DiaryExporter, SnippetInsights};
use std::fmt::Write;
use std::path::PathBuf;

use crate::app::AppContext;
use crate::wiring::{build_snippet_store, build_vcs};

pub async fn run(ctx: &AppContext, output: Option<PathBuf>) -> Result<()> {
    let config = ctx.config();

    // Collection needs no generative backend, so no credential is required.
    let collector = ActivityCollector::new(
        build_snippet_store(config, &ctx.dirs, &ctx.credentials).await?,
        build_vcs(config),
    );
    let activity = collector.collect().await;
    let json =
        DiaryExporter::activity_to_json(&activity).context("Failed to serialize activity")?;
    let report = format_report(&activity);

    match output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Activity written to {}", path.display());
            println!();
            print!("{}", report);
        }
        None => {
            // stdout stays valid JSON; the report goes to stderr
            println!("{}", json);
            eprint!("{}", report);
        }
    }
    Ok(())
}

fn format_report(activity: &ActivityData) -> String {
    let insights = SnippetInsights::from_snippets(&activity.snippets);
    let mut out = String::new();

    let _ = writeln!(out, "Snippet Insights");
    let _ = writeln!(out, "================");
    if insights.is_empty() {
        let _ = writeln!(out, "  No snippets captured today.");
    } else {
        let _ = writeln!(out, "  Total: {}", insights.total);
        let _ = writeln!(out, "  By language:");
        for (language, count) in &insights.by_language {
            let _ = writeln!(out, "    {:<12} {}", language, count);
        }
        let _ = writeln!(out, "  By project:");
        for (project, count) in &insights.by_project {
            let _ = writeln!(out, "    {:<12} {}", project, count);
        }
        if !insights.top_tags.is_empty() {
            let tags: Vec<String> = insights
                .top_tags
                .iter()
                .map(|(tag, count)| format!("{} ({})", tag, count))
                .collect();
            let _ = writeln!(out, "  Top tags: {}", tags.join(", "));
        }
    }

    let _ = writeln!(
        out,
        "  Commits: {}  Branches: {}",
        activity.git_activity.commits.len(),
        activity.git_activity.branches.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use devdiary_core::ports::Snippet;

    #[test]
    fn test_report_without_snippets() {
        let report = format_report(&ActivityData::default());
        assert!(report.contains("No snippets captured today."));
        assert!(report.contains("Commits: 0  Branches: 0"));
    }

    #[test]
    fn test_report_counts() {
        let activity = ActivityData {
            snippets: vec![
                Snippet::new("fn a() {}", "Rust")
                    .unwrap()
                    .with_project("diary")
                    .with_tags(["rust", "cli"]),
                Snippet::new("def b(): pass", "Python")
                    .unwrap()
                    .with_tags(["python", "cli"]),
            ],
            ..ActivityData::default()
        };

        let report = format_report(&activity);
        assert!(report.contains("Total: 2"));
        assert!(report.contains("Rust"));
        assert!(report.contains("Unknown"));
        assert!(report.contains("Top tags: cli (2), python (1), rust (1)"));
    }
}
