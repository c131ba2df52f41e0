//! DevDiary CLI - developer diary from snippets, commits and notes
//!
//! Main entry point for the `devdiary` binary.

mod app;
mod commands;
mod wiring;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use app::{initialize, InitOptions};

#[derive(Parser, Debug)]
#[command(name = "devdiary", version, about = "Turns a day of coding activity into a published diary")]
struct Cli {
    /// Debug logging, mirrored to stdout
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.devdiary/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the detected language of a file or of stdin
    Detect {
        /// File to inspect; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Collect today's activity as JSON, with snippet insights
    Collect {
        /// Write the activity JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a diary from fresh or supplied activity
    Generate {
        /// Activity JSON produced by `collect`
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the diary without saving it to the diaries directory
        #[arg(long)]
        no_save: bool,
    },
    /// Publish a markdown file to every configured destination
    Publish {
        /// Markdown file to publish
        file: PathBuf,

        /// Diary title (default: first heading of the file)
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Collect, generate and publish in one go
    Run,
    /// Watch the clipboard for code in the foreground until Ctrl-C
    Watch {
        /// Also create and publish a diary every `schedule.interval_seconds`
        #[arg(long)]
        schedule: bool,
    },
    /// Show configuration, credentials and enabled destinations
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Language detection is pure and needs no configuration.
    if let Commands::Detect { file } = &cli.command {
        return commands::detect::run(file.as_deref(), cli.verbose);
    }

    let ctx = initialize(InitOptions::command(cli.config.clone(), cli.verbose))?;

    match cli.command {
        Commands::Detect { .. } => Ok(()),
        Commands::Collect { output } => commands::collect::run(&ctx, output).await,
        Commands::Generate { input, no_save } => {
            commands::generate::run(&ctx, input, no_save).await
        }
        Commands::Publish { file, title } => commands::publish::run(&ctx, file, title).await,
        Commands::Run => commands::run::run(&ctx).await,
        Commands::Watch { schedule } => commands::watch::run(&ctx, schedule).await,
        Commands::Status => commands::status::run(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::parse_from(["devdiary", "generate", "--input", "day.json", "--no-save"]);
        match cli.command {
            Commands::Generate { input, no_save } => {
                assert_eq!(input, Some(PathBuf::from("day.json")));
                assert!(no_save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["devdiary", "watch", "--schedule", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Watch { schedule: true }));
    }

    #[test]
    fn test_publish_requires_file() {
        assert!(Cli::try_parse_from(["devdiary", "publish"]).is_err());
        let cli = Cli::try_parse_from(["devdiary", "publish", "d.md", "--title", "Day"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Publish { title: Some(ref t), .. } if t == "Day"
        ));
    }
}
