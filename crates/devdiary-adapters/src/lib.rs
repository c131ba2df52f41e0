//! DevDiary Adapters - Infrastructure implementations
//!
//! Concrete implementations of the ports defined in devdiary-core: generative
//! backends, snippet stores, the git reader, publishing destinations, the
//! markdown renderer and the system clipboard.

pub mod ai;
pub mod clipboard;
pub mod publish;
pub mod render;
pub mod snippets;
pub mod vcs;

pub use ai::{GeminiAdapter, OpenAIAdapter};
pub use clipboard::SystemClipboard;
pub use publish::{GistAdapter, NotionAdapter, TelegramAdapter};
pub use render::CmarkRenderer;
pub use snippets::{PiecesSnippetStore, SqliteSnippetStore};
pub use vcs::GitRepositoryAdapter;

#[cfg(test)]
mod tests {
    use devdiary_core::config::Config;

    #[test]
    fn test_default_config_matches_adapter_defaults() {
        let config = Config::default();
        assert_eq!(config.snippets.pieces_base_url, super::snippets::DEFAULT_PIECES_BASE_URL);
        assert_eq!(config.gist.filename, super::publish::DEFAULT_GIST_FILENAME);
    }
}
