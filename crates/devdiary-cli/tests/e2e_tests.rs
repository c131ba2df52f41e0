//! End-to-End Tests for DevDiary
//!
//! These tests wire the real core pipeline to real adapters:
//! - Clipboard capture into the local SQLite store
//! - Collection, two-pass generation and publishing
//! - Partial destination failure
//! - Diary export and activity files
//! - The `devdiary` binary itself
//!
//! Remote services are replaced by wiremock servers; nothing leaves the host.

use async_trait::async_trait;
use devdiary_adapters::{
    CmarkRenderer, GeminiAdapter, GistAdapter, NotionAdapter, SqliteSnippetStore,
    TelegramAdapter,
};
use devdiary_core::ports::{
    AIError, AIProviderPort, ClipboardError, ClipboardReaderPort, CompletionRequest,
    DestinationKind, Snippet, SnippetStorePort,
};
use devdiary_core::{
    ActivityCollector, ChatNotifierDestination, ClipboardWatcher, DiaryCoordinator,
    DiaryExporter, DiaryGenerator, DocumentDatabaseDestination, GenerationSettings,
    GistHostDestination, PublishCoordinator, SnippetListener,
};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RUST_CODE: &str = "fn parse(input: &str) -> Result<Ast, Error> {\n    let tokens = lex(input)?;\n    build(tokens)\n}";

/// Test environment with an isolated DevDiary data directory
struct TestEnv {
    temp_dir: TempDir,
    data_dir: PathBuf,
    config_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join(".devdiary");
        let config_path = temp_dir.path().join("config.toml");

        fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            temp_dir,
            data_dir,
            config_path,
        }
    }

    fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).expect("Failed to write config");
    }

    fn default_config(&self) -> String {
        format!(
            r#"[storage]
data_dir = "{}"

[ai]
provider = "gemini"

[snippets]
source = "local"

[gist]
enabled = true
"#,
            self.data_dir.display()
        )
    }

    fn db_path(&self) -> PathBuf {
        self.data_dir.join("snippets.db")
    }

    fn diaries_dir(&self) -> PathBuf {
        self.data_dir.join("diaries")
    }
}

/// Backend that returns a fixed diary and counts calls
struct CannedBackend {
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl CannedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AIProviderPort for CannedBackend {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, AIError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        Ok("# Parser Day\n\nRewrote the lexer and fixed two bugs in the AST builder.\n\n#rust #parsing".to_string())
    }
}

/// Clipboard that always holds the same text
struct FixedClipboard(String);

#[async_trait]
impl ClipboardReaderPort for FixedClipboard {
    async fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        Ok(Some(self.0.clone()))
    }
}

async fn wait_for(counter: &AtomicUsize, expected: usize) {
    for _ in 0..100 {
        if counter.load(Ordering::SeqCst) >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ============================================================================
// Capture
// ============================================================================

mod capture {
    use super::*;

    /// Test: a clipboard snippet reaches the store and the next collection
    #[tokio::test]
    async fn test_clipboard_snippet_is_collected() {
        let env = TestEnv::new();
        let store = Arc::new(SqliteSnippetStore::new(&env.db_path()).await.unwrap());

        let watcher =
            ClipboardWatcher::with_reader(Arc::new(FixedClipboard(RUST_CODE.to_string())));
        watcher.start();

        let saved = Arc::new(AtomicUsize::new(0));
        let listener: SnippetListener = {
            let store = Arc::clone(&store);
            let saved = Arc::clone(&saved);
            Arc::new(move |snippet: &Snippet| {
                let store = Arc::clone(&store);
                let saved = Arc::clone(&saved);
                let snippet = snippet.clone();
                tokio::spawn(async move {
                    store.save_snippet(&snippet).await.unwrap();
                    saved.fetch_add(1, Ordering::SeqCst);
                });
            })
        };
        watcher.add_listener(listener);

        let captured = watcher.on_focus_regained().await.expect("code accepted");
        assert_eq!(captured.language(), "Rust");
        // Same clipboard content again is not a new snippet.
        assert!(watcher.on_focus_regained().await.is_none());
        wait_for(&saved, 1).await;

        let collector = ActivityCollector::new(Some(store.clone() as Arc<dyn SnippetStorePort>), None);
        let activity = collector.collect().await;
        assert_eq!(activity.snippets.len(), 1);
        assert_eq!(activity.snippets[0].id(), captured.id());
        assert_eq!(activity.snippets[0].project(), "External Source");
        assert!(activity.snippets[0].tags().contains(&"external".to_string()));
    }
}

// ============================================================================
// Full cycle
// ============================================================================

mod pipeline {
    use super::*;

    async fn mount_gist(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/gists"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "abc123",
                "html_url": "https://gist.github.com/abc123"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    /// Test: collect, generate and publish with the gist link in the chat message
    #[tokio::test]
    async fn test_create_and_publish_diary() {
        let env = TestEnv::new();
        let store = Arc::new(SqliteSnippetStore::new(&env.db_path()).await.unwrap());
        let snippet = Snippet::new(RUST_CODE, "Rust")
            .unwrap()
            .with_project("diary");
        store.save_snippet(&snippet).await.unwrap();

        let github = MockServer::start().await;
        mount_gist(&github).await;

        let telegram = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .and(body_string_contains("https://gist.github.com/abc123"))
            .and(body_string_contains("Rewrote the lexer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&telegram)
            .await;

        let backend = CannedBackend::new();
        let publisher = PublishCoordinator::new()
            .with_destination(Box::new(GistHostDestination::new(Arc::new(
                GistAdapter::new("ghp").with_base_url(github.uri()),
            ))))
            .with_destination(Box::new(ChatNotifierDestination::new(Arc::new(
                TelegramAdapter::new("tok", "42").with_base_url(telegram.uri()),
            ))));
        let coordinator = DiaryCoordinator::new(
            ActivityCollector::new(Some(store.clone() as Arc<dyn SnippetStorePort>), None),
            DiaryGenerator::new(
                backend.clone(),
                Arc::new(CmarkRenderer::new()),
                GenerationSettings::default(),
            ),
            publisher,
        );

        let run = coordinator.create_and_publish_diary().await.unwrap();

        assert_eq!(run.diary.title(), "Parser Day");
        assert!(run.diary.html().contains("<h1>Parser Day</h1>"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        let first_prompt = backend.requests.lock().unwrap()[0].user_prompt.clone();
        assert!(first_prompt.contains("fn parse"));

        let result = run.publish_result;
        assert_eq!(result.github.as_ref().unwrap().id, "abc123");
        assert_eq!(result.telegram, Some(true));
        assert!(result.notion.is_none());
        assert!(result.is_complete_success());
        assert_eq!(result.summary(), "published to 2 of 2 destinations");

        let stored = store.get_today_snippets().await;
        assert!(stored.iter().all(|s| s.is_enriched()));
    }

    /// Test: a failing destination does not stop the others
    #[tokio::test]
    async fn test_partial_publish_failure() {
        let notion = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&notion)
            .await;
        let github = MockServer::start().await;
        mount_gist(&github).await;

        let publisher = PublishCoordinator::new()
            .with_destination(Box::new(DocumentDatabaseDestination::new(Arc::new(
                NotionAdapter::new("secret", "db").with_base_url(notion.uri()),
            ))))
            .with_destination(Box::new(GistHostDestination::new(Arc::new(
                GistAdapter::new("ghp").with_base_url(github.uri()),
            ))));
        let coordinator = DiaryCoordinator::new(
            ActivityCollector::empty(),
            DiaryGenerator::new(
                CannedBackend::new(),
                Arc::new(CmarkRenderer::new()),
                GenerationSettings::default(),
            ),
            publisher,
        );

        let run = coordinator.create_and_publish_diary().await.unwrap();
        let result = run.publish_result;

        assert!(result.notion.is_none());
        assert!(result.github.is_some());
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].destination, DestinationKind::Notion);
        assert_eq!(result.summary(), "published to 1 of 2 destinations");
    }

    /// Test: the Gemini adapter drives both generation passes
    #[tokio::test]
    async fn test_generate_with_gemini() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "# Release Prep\n\nTagged v0.3."}], "role": "model"}
                }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let coordinator = DiaryCoordinator::new(
            ActivityCollector::empty(),
            DiaryGenerator::new(
                Arc::new(GeminiAdapter::new("key", "").with_base_url(server.uri())),
                Arc::new(CmarkRenderer::new()),
                GenerationSettings::default(),
            ),
            PublishCoordinator::new(),
        );

        let diary = coordinator.generate_diary(None).await.unwrap();
        assert_eq!(diary.title(), "Release Prep");

        let result = coordinator.publish_diary(&diary).await.unwrap();
        assert_eq!(result.summary(), "no destinations configured");
    }

    /// Test: backend failure on the first pass fails the run
    #[tokio::test]
    async fn test_backend_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let coordinator = DiaryCoordinator::new(
            ActivityCollector::empty(),
            DiaryGenerator::new(
                Arc::new(GeminiAdapter::new("bad", "").with_base_url(server.uri())),
                Arc::new(CmarkRenderer::new()),
                GenerationSettings::default(),
            ),
            PublishCoordinator::new(),
        );

        assert!(coordinator.create_and_publish_diary().await.is_err());
    }
}

// ============================================================================
// Export
// ============================================================================

mod export {
    use super::*;

    /// Test: an edited activity file feeds generation and the diary is saved
    #[tokio::test]
    async fn test_activity_file_to_saved_diary() {
        let env = TestEnv::new();
        let activity_path = env.temp_dir.path().join("day.json");
        fs::write(
            &activity_path,
            r#"{"notes": ["Paired on the release"], "decisions": ["Ship on Friday"]}"#,
        )
        .unwrap();

        let activity =
            DiaryExporter::activity_from_json(&fs::read_to_string(&activity_path).unwrap())
                .unwrap();
        let backend = CannedBackend::new();
        let coordinator = DiaryCoordinator::new(
            ActivityCollector::empty(),
            DiaryGenerator::new(
                backend.clone(),
                Arc::new(CmarkRenderer::new()),
                GenerationSettings::default(),
            ),
            PublishCoordinator::new(),
        );
        let diary = coordinator.generate_diary(Some(activity)).await.unwrap();
        assert!(backend.requests.lock().unwrap()[0]
            .user_prompt
            .contains("Ship on Friday"));

        let exporter = DiaryExporter::new(env.diaries_dir());
        let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let saved = exporter.save(&diary, date).unwrap();

        assert_eq!(
            saved.markdown_path,
            env.diaries_dir().join("2024-05-17-parser-day.md")
        );
        assert_eq!(
            fs::read_to_string(&saved.markdown_path).unwrap(),
            diary.markdown()
        );
        assert!(fs::read_to_string(&saved.html_path)
            .unwrap()
            .contains("<h1>Parser Day</h1>"));
    }
}

// ============================================================================
// Binary
// ============================================================================

mod binary {
    use super::*;

    fn devdiary() -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_devdiary"));
        for var in [
            "GEMINI_API_KEY",
            "OPENAI_API_KEY",
            "NOTION_API_KEY",
            "GITHUB_TOKEN",
            "TELEGRAM_BOT_TOKEN",
            "PIECES_API_KEY",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Test: `detect` prints the language of a file
    #[test]
    fn test_detect_file() {
        let env = TestEnv::new();
        let file = env.temp_dir.path().join("snippet.txt");
        fs::write(&file, RUST_CODE).unwrap();

        let output = devdiary().arg("detect").arg(&file).output().unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Rust");
    }

    /// Test: `status` reports missing credentials without failing
    #[test]
    fn test_status_without_credentials() {
        let env = TestEnv::new();
        env.write_config(&env.default_config());

        let output = devdiary()
            .arg("--config")
            .arg(&env.config_path)
            .arg("status")
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("DevDiary Status"));
        assert!(stdout.contains("github     disabled (set GITHUB_TOKEN)"));
        assert!(String::from_utf8_lossy(&output.stderr).contains("export GEMINI_API_KEY="));
        assert!(env.diaries_dir().exists());
    }

    /// Test: `run` fails with guidance when the backend key is missing
    #[test]
    fn test_run_without_backend_key() {
        let env = TestEnv::new();
        env.write_config(&env.default_config());

        let output = devdiary()
            .arg("--config")
            .arg(&env.config_path)
            .arg("run")
            .output()
            .unwrap();
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("GEMINI_API_KEY"));
    }
}
