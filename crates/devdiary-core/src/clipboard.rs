//! Clipboard watcher
//!
//! Turns copy/paste activity into snippet events. Two trigger paths feed one
//! content processor: paste payloads handed in by the host, and a clipboard
//! read when the host regains focus. Accepted text is classified with
//! [`crate::language::detect`] and dispatched to every registered listener.
//!
//! At most one watcher should be active per process. [`WatcherRegistry`] hands
//! out one shared watcher per process-level key so independent parts of the
//! host reuse it instead of attaching a second one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::language;
use crate::ports::{ClipboardReaderPort, Snippet};

/// Shortest text, in characters, considered as code
pub const MIN_CODE_CHARS: usize = 10;
/// Longest text, in characters, considered as code
pub const MAX_CODE_CHARS: usize = 10_000;
/// Indicators required to accept text as code
pub const MIN_INDICATORS: usize = 2;

pub const EXTERNAL_PROJECT: &str = "External Source";
pub const EXTERNAL_SOURCE: &str = "External Clipboard";
pub const EXTERNAL_TAG: &str = "external";

const LITERAL_INDICATORS: &[&str] = &[
    "{", "}", "()", "[]", "=>", "->", ";", "function", "return", "const", "let", "var",
    "class", "import", "export", "def", "if", "else", "for", "while", "try", "catch",
];

static INDENTED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s+\w").expect("indentation pattern must compile"));

/// Callback invoked with every accepted snippet
pub type SnippetListener = Arc<dyn Fn(&Snippet) + Send + Sync>;

/// Observation state of a watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Active,
}

/// Heuristic check for code-like text
///
/// Rejects text outside 10..=10000 characters, then counts distinct
/// indicators: literal tokens, an indented line, and more than two lines.
pub fn looks_like_code(text: &str) -> bool {
    let len = text.chars().count();
    if !(MIN_CODE_CHARS..=MAX_CODE_CHARS).contains(&len) {
        return false;
    }

    let literal_hits = LITERAL_INDICATORS
        .iter()
        .filter(|indicator| text.contains(**indicator))
        .count();
    let indented = usize::from(INDENTED_LINE.is_match(text));
    let multi_line = usize::from(text.split('\n').count() > 2);

    literal_hits + indented + multi_line >= MIN_INDICATORS
}

struct Inner {
    state: WatcherState,
    last_text: Option<String>,
    listeners: Vec<SnippetListener>,
}

/// Watches clipboard activity and emits snippets
pub struct ClipboardWatcher {
    inner: Mutex<Inner>,
    reader: Option<Arc<dyn ClipboardReaderPort>>,
    supported: bool,
}

impl Default for ClipboardWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWatcher {
    /// A watcher that only receives paste payloads
    pub fn new() -> Self {
        Self::build(None, true)
    }

    /// A watcher that also reads the system clipboard on focus regain
    pub fn with_reader(reader: Arc<dyn ClipboardReaderPort>) -> Self {
        Self::build(Some(reader), true)
    }

    /// A watcher for a host without clipboard capability; `start` does nothing
    pub fn unsupported() -> Self {
        Self::build(None, false)
    }

    fn build(reader: Option<Arc<dyn ClipboardReaderPort>>, supported: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: WatcherState::Idle,
                last_text: None,
                listeners: Vec::new(),
            }),
            reader,
            supported,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> WatcherState {
        self.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == WatcherState::Active
    }

    /// Idle -> Active. No-op when already active or unsupported.
    pub fn start(&self) {
        if !self.supported {
            debug!("Clipboard not available in this environment, watcher stays idle");
            return;
        }
        let mut inner = self.lock();
        if inner.state == WatcherState::Active {
            return;
        }
        inner.state = WatcherState::Active;
        info!("Clipboard monitoring started");
    }

    /// Active -> Idle. No-op when already idle.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if inner.state == WatcherState::Idle {
            return;
        }
        inner.state = WatcherState::Idle;
        info!("Clipboard monitoring stopped");
    }

    pub fn add_listener(&self, listener: SnippetListener) {
        self.lock().listeners.push(listener);
    }

    /// Removes every registration of `listener` (compared by reference).
    pub fn remove_listener(&self, listener: &SnippetListener) {
        let target = Arc::as_ptr(listener) as *const ();
        self.lock()
            .listeners
            .retain(|l| Arc::as_ptr(l) as *const () != target);
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Paste path: processes text delivered with a paste event.
    ///
    /// Returns the emitted snippet, if any.
    pub fn on_paste(&self, text: &str) -> Option<Snippet> {
        if !self.is_active() || text.is_empty() {
            return None;
        }
        self.process(text)
    }

    /// Focus path: reads the system clipboard and processes its text.
    ///
    /// Read failures are logged and swallowed.
    pub async fn on_focus_regained(&self) -> Option<Snippet> {
        if !self.is_active() {
            return None;
        }
        let reader = match &self.reader {
            Some(reader) => reader,
            None => {
                debug!("No clipboard reader configured, skipping focus check");
                return None;
            }
        };

        match reader.read_text().await {
            Ok(Some(text)) if !text.is_empty() => self.process(&text),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Could not access clipboard");
                None
            }
        }
    }

    fn process(&self, text: &str) -> Option<Snippet> {
        let listeners = {
            let mut inner = self.lock();
            if inner.last_text.as_deref() == Some(text) || !looks_like_code(text) {
                return None;
            }
            inner.last_text = Some(text.to_string());
            inner.listeners.clone()
        };

        let language = language::detect(text);
        let snippet = Snippet::new(text, language.label())
            .ok()?
            .with_id(format!("external-{}", uuid::Uuid::new_v4()))
            .with_project(EXTERNAL_PROJECT)
            .with_tags([language.label().to_lowercase().as_str(), EXTERNAL_TAG])
            .with_source(EXTERNAL_SOURCE);

        debug!(
            snippet_id = snippet.id(),
            language = %language,
            listeners = listeners.len(),
            "Clipboard snippet captured"
        );

        // Dispatch outside the lock so listeners may (un)register freely.
        for listener in &listeners {
            listener(&snippet);
        }
        Some(snippet)
    }
}

/// Process key used by [`WatcherRegistry::get_instance`]
pub const DEFAULT_WATCHER_KEY: &str = "default";

/// Hands out one shared watcher per process-level key
#[derive(Default)]
pub struct WatcherRegistry {
    watchers: Mutex<HashMap<String, Arc<ClipboardWatcher>>>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared paste-only watcher under the default key
    pub fn get_instance(&self) -> Arc<ClipboardWatcher> {
        self.get_or_create(DEFAULT_WATCHER_KEY, ClipboardWatcher::new)
    }

    /// Returns the watcher registered under `key`, creating it with `make`
    /// on first use. Later calls ignore `make`.
    pub fn get_or_create<F>(&self, key: &str, make: F) -> Arc<ClipboardWatcher>
    where
        F: FnOnce() -> ClipboardWatcher,
    {
        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            watchers
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(make())),
        )
    }
}
