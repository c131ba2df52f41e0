//! Status command
//!
//! Handles `devdiary status`: shows configuration, credential availability and
//! the destinations a publish would attempt.

use anyhow::Result;
use devdiary_core::ports::DestinationKind;
use devdiary_core::{Config, Credential, CredentialManager};
use std::path::Path;

use crate::app::AppContext;
use crate::wiring::enabled_destinations;

pub fn run(ctx: &AppContext) -> Result<()> {
    let config = ctx.config();

    println!("DevDiary Status");
    println!("===============");
    println!();
    println!("Configuration");
    println!("-------------");
    println!("  Data directory: {}", ctx.dirs.data_dir().display());
    println!(
        "  Saved diaries: {}",
        count_diaries(&ctx.dirs.diaries_dir())
    );
    println!("  AI provider: {}", config.ai.provider);
    println!(
        "  Model: {}",
        if config.ai.model.is_empty() {
            "(provider default)"
        } else {
            config.ai.model.as_str()
        }
    );
    println!("  Snippet source: {}", config.snippets.source);
    match &config.git.repository_path {
        Some(path) => println!("  Git repository: {}", path.display()),
        None => println!("  Git repository: (not configured)"),
    }
    println!(
        "  Schedule interval: {} seconds",
        config.schedule.interval_seconds
    );
    println!();

    println!("Credentials");
    println!("-----------");
    for credential in Credential::ALL {
        let state = match ctx.credentials.get(credential) {
            Some(key) => format!("set {}", key),
            None => "not set".to_string(),
        };
        println!(
            "  {:<10} {:<20} {}",
            credential.display_name(),
            credential.env_var_name(),
            state
        );
    }
    println!();

    println!("Destinations");
    println!("------------");
    let enabled = enabled_destinations(config, &ctx.credentials);
    for kind in [
        DestinationKind::Notion,
        DestinationKind::Github,
        DestinationKind::Telegram,
    ] {
        if enabled.contains(&kind) {
            println!("  {:<10} enabled", kind.as_str());
        } else {
            println!(
                "  {:<10} disabled ({})",
                kind.as_str(),
                disabled_reason(kind, config, &ctx.credentials)
            );
        }
    }

    if let Some(credential) = Credential::for_provider(&config.ai.provider) {
        if !ctx.credentials.is_available(credential) {
            println!();
            eprintln!("{}", CredentialManager::missing_key_guidance(credential));
        }
    }

    Ok(())
}

/// What is missing for a destination to be enabled
fn disabled_reason(kind: DestinationKind, config: &Config, credentials: &CredentialManager) -> String {
    let (configured, setting, credential) = match kind {
        DestinationKind::Notion => (
            config.notion.database_id.is_some(),
            "notion.database_id",
            Credential::Notion,
        ),
        DestinationKind::Github => (config.gist.enabled, "gist.enabled", Credential::GitHub),
        DestinationKind::Telegram => (
            config.telegram.chat_id.is_some(),
            "telegram.chat_id",
            Credential::Telegram,
        ),
    };

    if !configured {
        format!("set {} in the config file", setting)
    } else if !credentials.is_available(credential) {
        format!("set {}", credential.env_var_name())
    } else {
        "unknown".to_string()
    }
}

/// Number of markdown diaries in `dir`; 0 when it cannot be read
fn count_diaries(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
                .count()
        })
        .unwrap_or(0)
}
