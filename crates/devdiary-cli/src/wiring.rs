//! Builds the diary pipeline from configuration and credentials
//!
//! Every collaborator is optional except the generative backend; a
//! destination is only wired when both its configuration and its credential
//! are present.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use devdiary_adapters::{
    CmarkRenderer, GeminiAdapter, GistAdapter, GitRepositoryAdapter, NotionAdapter,
    OpenAIAdapter, PiecesSnippetStore, SqliteSnippetStore, TelegramAdapter,
};
use devdiary_core::ports::{AIProviderPort, DestinationKind, SnippetStorePort, VcsPort};
use devdiary_core::{
    ActivityCollector, AiConfig, ChatNotifierDestination, Config, Credential, CredentialManager,
    DiaryCoordinator, DiaryGenerator, DirectoryManager, DocumentDatabaseDestination,
    GenerationSettings, GistHostDestination, PublishCoordinator,
};
use tracing::{debug, info};

/// Generative backend named by `ai.provider`
pub fn build_backend(
    config: &AiConfig,
    credentials: &CredentialManager,
) -> Result<Arc<dyn AIProviderPort>> {
    let credential = Credential::for_provider(&config.provider)
        .with_context(|| format!("Unknown AI provider '{}'", config.provider))?;
    let key = credentials
        .require(credential)
        .map_err(|e| anyhow!(CredentialManager::missing_key_guidance(e.0)))?;

    match credential {
        Credential::OpenAI => Ok(Arc::new(OpenAIAdapter::new(key.expose(), &config.model))),
        _ => Ok(Arc::new(GeminiAdapter::new(key.expose(), &config.model))),
    }
}

/// The local SQLite store, regardless of the configured snippet source.
/// Used by the clipboard watcher to persist what it captures.
pub async fn open_local_store(dirs: &DirectoryManager) -> Result<Arc<SqliteSnippetStore>> {
    let store = SqliteSnippetStore::new(&dirs.database_path())
        .await
        .context("Failed to open local snippet database")?;
    Ok(Arc::new(store))
}

/// Snippet source named by `snippets.source`; `None` when disabled
pub async fn build_snippet_store(
    config: &Config,
    dirs: &DirectoryManager,
    credentials: &CredentialManager,
) -> Result<Option<Arc<dyn SnippetStorePort>>> {
    match config.snippets.source.to_lowercase().as_str() {
        "local" => {
            let store: Arc<dyn SnippetStorePort> = open_local_store(dirs).await?;
            Ok(Some(store))
        }
        "pieces" => {
            let mut store = PiecesSnippetStore::new(&config.snippets.pieces_base_url);
            if let Some(key) = credentials.get(Credential::Pieces) {
                store = store.with_api_key(key.expose());
            }
            Ok(Some(Arc::new(store)))
        }
        _ => {
            debug!("Snippet collection disabled");
            Ok(None)
        }
    }
}

/// Git adapter for `git.repository_path`, when configured
pub fn build_vcs(config: &Config) -> Option<Arc<dyn VcsPort>> {
    config
        .git
        .repository_path
        .as_ref()
        .map(|path| Arc::new(GitRepositoryAdapter::new(path.clone())) as Arc<dyn VcsPort>)
}

/// Destinations that are configured and have credentials, in publish order
pub fn enabled_destinations(
    config: &Config,
    credentials: &CredentialManager,
) -> Vec<DestinationKind> {
    let mut kinds = Vec::new();
    if config.notion.database_id.is_some() && credentials.is_available(Credential::Notion) {
        kinds.push(DestinationKind::Notion);
    }
    if config.gist.enabled && credentials.is_available(Credential::GitHub) {
        kinds.push(DestinationKind::Github);
    }
    if config.telegram.chat_id.is_some() && credentials.is_available(Credential::Telegram) {
        kinds.push(DestinationKind::Telegram);
    }
    kinds
}

pub fn build_publisher(config: &Config, credentials: &CredentialManager) -> PublishCoordinator {
    let mut publisher = PublishCoordinator::new();

    if let (Some(database_id), Some(key)) = (
        &config.notion.database_id,
        credentials.get(Credential::Notion),
    ) {
        let adapter = NotionAdapter::new(key.expose(), database_id);
        publisher =
            publisher.with_destination(Box::new(DocumentDatabaseDestination::new(Arc::new(adapter))));
    }

    if config.gist.enabled {
        if let Some(token) = credentials.get(Credential::GitHub) {
            let adapter = GistAdapter::new(token.expose()).with_filename(&config.gist.filename);
            publisher = publisher.with_destination(Box::new(
                GistHostDestination::new(Arc::new(adapter)).public(config.gist.public),
            ));
        }
    }

    if let (Some(chat_id), Some(token)) = (
        &config.telegram.chat_id,
        credentials.get(Credential::Telegram),
    ) {
        let adapter = TelegramAdapter::new(token.expose(), chat_id);
        publisher =
            publisher.with_destination(Box::new(ChatNotifierDestination::new(Arc::new(adapter))));
    }

    publisher
}

/// Full pipeline: collector, generator and publisher
pub async fn build_coordinator(
    config: &Config,
    dirs: &DirectoryManager,
    credentials: &CredentialManager,
) -> Result<DiaryCoordinator> {
    let backend = build_backend(&config.ai, credentials)?;
    let collector = ActivityCollector::new(
        build_snippet_store(config, dirs, credentials).await?,
        build_vcs(config),
    );
    let generator = DiaryGenerator::new(
        backend,
        Arc::new(CmarkRenderer::new()),
        GenerationSettings::from(&config.ai),
    );
    let publisher = build_publisher(config, credentials);

    info!(
        provider = generator.backend_name(),
        snippets = collector.has_snippet_source(),
        vcs = collector.has_vcs(),
        destinations = publisher.destination_kinds().len(),
        "Diary pipeline ready"
    );
    Ok(DiaryCoordinator::new(collector, generator, publisher))
}
