//! Diary coordinator
//!
//! Composition root of one activity cycle: collect, generate, publish.

use serde::Serialize;
use tracing::info;

use crate::collector::ActivityCollector;
use crate::generator::{DiaryGenerator, GenerateError};
use crate::ports::{ActivityData, Diary, PublishError, PublishResult};
use crate::publisher::PublishCoordinator;

/// Result of a full collect, generate and publish cycle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryRun {
    pub diary: Diary,
    pub publish_result: PublishResult,
}

/// Errors from a full cycle
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Owns the collector, generator and publisher of one diary pipeline
pub struct DiaryCoordinator {
    collector: ActivityCollector,
    generator: DiaryGenerator,
    publisher: PublishCoordinator,
}

impl DiaryCoordinator {
    pub fn new(
        collector: ActivityCollector,
        generator: DiaryGenerator,
        publisher: PublishCoordinator,
    ) -> Self {
        Self {
            collector,
            generator,
            publisher,
        }
    }

    pub fn collector(&self) -> &ActivityCollector {
        &self.collector
    }

    pub fn publisher(&self) -> &PublishCoordinator {
        &self.publisher
    }

    pub fn backend_name(&self) -> &str {
        self.generator.backend_name()
    }

    /// Gathers today's activity. Never fails.
    pub async fn collect_activities(&self) -> ActivityData {
        self.collector.collect().await
    }

    /// Generates a diary from `activity`, or from freshly collected activity
    /// when `None`. Snippets that made it into the diary are flagged enriched.
    pub async fn generate_diary(
        &self,
        activity: Option<ActivityData>,
    ) -> Result<Diary, GenerateError> {
        let activity = match activity {
            Some(activity) => activity,
            None => self.collect_activities().await,
        };
        let diary = self.generator.generate(&activity).await?;
        self.collector.mark_enriched(&activity.snippets).await;
        Ok(diary)
    }

    /// Publishes `diary` to every configured destination.
    pub async fn publish_diary(&self, diary: &Diary) -> Result<PublishResult, PublishError> {
        self.publisher.publish(diary).await
    }

    /// collect, then generate, then publish
    pub async fn create_and_publish_diary(&self) -> Result<DiaryRun, RunError> {
        let activity = self.collect_activities().await;
        let diary = self.generate_diary(Some(activity)).await?;
        let publish_result = self.publish_diary(&diary).await?;
        info!(title = diary.title(), outcome = %publish_result.summary(), "Diary cycle complete");
        Ok(DiaryRun {
            diary,
            publish_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationSettings;
    use crate::ports::{
        AIError, AIProviderPort, CompletionRequest, GistDocument, GistHostPort,
        MarkdownRendererPort, Snippet, SnippetStoreError, SnippetStorePort,
    };
    use crate::publisher::GistHostDestination;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct EchoBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl AIProviderPort for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<String, AIError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AIError::RequestFailed("offline".to_string()));
            }
            let notes = if request.user_prompt.contains("standup") {
                "standup"
            } else {
                "none"
            };
            Ok(format!("# Daily Log\n\nNotes: {}", notes))
        }
    }

    struct Plain;

    impl MarkdownRendererPort for Plain {
        fn render(&self, markdown: &str) -> String {
            markdown.to_string()
        }
    }

    #[derive(Default)]
    struct Store {
        enriched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SnippetStorePort for Store {
        async fn get_today_snippets(&self) -> Vec<Snippet> {
            vec![Snippet::new("SELECT 1;", "SQL").unwrap().with_id("s1")]
        }

        async fn save_snippet(&self, _snippet: &Snippet) -> Result<(), SnippetStoreError> {
            Ok(())
        }

        async fn mark_enriched(&self, id: &str) -> Result<(), SnippetStoreError> {
            self.enriched.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    struct Gist;

    #[async_trait]
    impl GistHostPort for Gist {
        async fn create_document(
            &self,
            _title: &str,
            _body: &str,
            _is_public: bool,
        ) -> Result<GistDocument, PublishError> {
            Ok(GistDocument {
                url: "https://gist.example/1".to_string(),
                id: "1".to_string(),
            })
        }
    }

    fn coordinator(fail: bool, store: Arc<Store>) -> (DiaryCoordinator, Arc<EchoBackend>) {
        let backend = Arc::new(EchoBackend {
            calls: AtomicUsize::new(0),
            fail,
        });
        let coordinator = DiaryCoordinator::new(
            ActivityCollector::new(Some(store), None),
            DiaryGenerator::new(backend.clone(), Arc::new(Plain), GenerationSettings::default()),
            PublishCoordinator::new().with_destination(Box::new(GistHostDestination::new(Arc::new(Gist)))),
        );
        (coordinator, backend)
    }

    #[tokio::test]
    async fn test_create_and_publish() {
        let store = Arc::new(Store::default());
        let (coordinator, backend) = coordinator(false, store.clone());

        let run = coordinator.create_and_publish_diary().await.unwrap();
        assert_eq!(run.diary.title(), "Daily Log");
        assert_eq!(run.publish_result.github.as_ref().unwrap().id, "1");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert_eq!(*store.enriched.lock().unwrap(), vec!["s1".to_string()]);
    }

    #[tokio::test]
    async fn test_generate_with_supplied_activity() {
        let store = Arc::new(Store::default());
        let (coordinator, _) = coordinator(false, store.clone());

        let mut activity = ActivityData::default();
        activity.notes.push("standup moved".to_string());
        let diary = coordinator.generate_diary(Some(activity)).await.unwrap();

        assert!(diary.markdown().contains("Notes: standup"));
        // Supplied activity had no snippets to flag.
        assert!(store.enriched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_stops_cycle() {
        let store = Arc::new(Store::default());
        let (coordinator, _) = coordinator(true, store.clone());

        let result = coordinator.create_and_publish_diary().await;
        assert!(matches!(result, Err(RunError::Generate(_))));
        assert!(store.enriched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collect_activities() {
        let (coordinator, _) = coordinator(false, Arc::new(Store::default()));
        let activity = coordinator.collect_activities().await;
        assert_eq!(activity.snippets.len(), 1);
        assert_eq!(coordinator.backend_name(), "echo");
    }

    #[test]
    fn test_run_serializes_camel_case() {
        let run = DiaryRun {
            diary: Diary::render("T", "# T", &Plain),
            publish_result: PublishResult::default(),
        };
        let json = serde_json::to_value(&run).unwrap();
        assert!(json.get("publishResult").is_some());
        assert_eq!(json["diary"]["title"], "T");
    }
}
