//! CLI command implementations
//!
//! Each subcommand has its own module with the implementation logic.

pub mod collect;
pub mod detect;
pub mod generate;
pub mod publish;
pub mod run;
pub mod status;
pub mod watch;

use devdiary_core::ports::PublishResult;

/// Prints one line per attempted destination followed by the overall outcome
pub(crate) fn print_publish_report(result: &PublishResult) {
    println!("Publishing");
    println!("----------");
    if let Some(entry) = &result.notion {
        println!("  notion:   {}", entry.url);
    }
    if let Some(gist) = &result.github {
        println!("  github:   {}", gist.url);
    }
    if result.telegram == Some(true) {
        println!("  telegram: sent");
    }
    for failure in &result.failures {
        println!("  {}: FAILED ({})", failure.destination, failure.error);
    }
    println!();
    println!("{}", result.summary());
}
