//! Watch command
//!
//! Handles `devdiary watch`: runs the clipboard watcher in the foreground and
//! persists every accepted snippet to the local store. With `--schedule` the
//! periodic diary scheduler runs alongside it. Ctrl-C stops both.

use anyhow::{Context, Result};
use devdiary_adapters::SystemClipboard;
use devdiary_core::ports::{Snippet, SnippetStorePort};
use devdiary_core::{ClipboardWatcher, DiaryScheduler, SnippetListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::app::AppContext;
use crate::wiring::{build_coordinator, open_local_store};

pub async fn run(ctx: &AppContext, schedule: bool) -> Result<()> {
    let config = ctx.config();

    let watcher = if SystemClipboard::is_available() {
        Arc::new(ClipboardWatcher::with_reader(Arc::new(SystemClipboard::new())))
    } else {
        Arc::new(ClipboardWatcher::unsupported())
    };
    watcher.start();

    if !watcher.is_active() && !schedule {
        println!("No system clipboard is available in this session; nothing to watch.");
        return Ok(());
    }

    let store: Arc<dyn SnippetStorePort> = open_local_store(&ctx.dirs).await?;
    let saved = Arc::new(AtomicUsize::new(0));
    let listener = persisting_listener(store, Arc::clone(&saved));
    watcher.add_listener(Arc::clone(&listener));

    let scheduler = if schedule {
        let coordinator = build_coordinator(config, &ctx.dirs, &ctx.credentials).await?;
        let scheduler = DiaryScheduler::from_config(Arc::new(coordinator), &config.schedule);
        scheduler.start().context("Failed to start diary scheduler")?;
        println!(
            "Diary scheduler running every {}s",
            scheduler.interval().as_secs()
        );
        Some(scheduler)
    } else {
        None
    };

    if watcher.is_active() {
        println!(
            "Watching the clipboard every {}s. Press Ctrl-C to stop.",
            config.clipboard.poll_interval_seconds
        );
    } else {
        println!("Clipboard unavailable; only the scheduler is running. Press Ctrl-C to stop.");
    }

    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.clipboard.poll_interval_seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            _ = ticker.tick(), if watcher.is_active() => {
                // Each poll stands in for the host regaining focus.
                if let Some(snippet) = watcher.on_focus_regained().await {
                    println!(
                        "Captured {} snippet ({} chars)",
                        snippet.language(),
                        snippet.code().chars().count()
                    );
                }
            }
        }
    }

    watcher.remove_listener(&listener);
    watcher.stop();
    if let Some(scheduler) = scheduler {
        if scheduler.is_running() {
            scheduler.stop().await.context("Failed to stop diary scheduler")?;
        }
        println!("Scheduled diaries published: {}", scheduler.completed_runs());
    }

    println!();
    println!("Snippets saved: {}", saved.load(Ordering::SeqCst));
    info!("Watch stopped");
    Ok(())
}

/// Listener that saves each snippet on a background task
fn persisting_listener(store: Arc<dyn SnippetStorePort>, saved: Arc<AtomicUsize>) -> SnippetListener {
    Arc::new(move |snippet: &Snippet| {
        let store = Arc::clone(&store);
        let saved = Arc::clone(&saved);
        let snippet = snippet.clone();
        tokio::spawn(async move {
            match store.save_snippet(&snippet).await {
                Ok(()) => {
                    saved.fetch_add(1, Ordering::SeqCst);
                    debug!(snippet_id = snippet.id(), "Saved clipboard snippet");
                }
                Err(e) => warn!(error = %e, snippet_id = snippet.id(), "Could not save snippet"),
            }
        });
    })
}
