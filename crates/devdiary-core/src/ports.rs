//! Port definitions for Hexagonal Architecture
//!
//! These traits define the boundaries between the core domain and external adapters.

pub mod activity;
pub mod ai;
pub mod clipboard;
pub mod publish;
pub mod render;
pub mod snippet;
pub mod vcs;

pub use activity::{ActivityData, GitActivity, PullRequest, Task};
pub use ai::{AIError, AIProviderPort, CompletionRequest};
pub use clipboard::{ClipboardError, ClipboardReaderPort};
pub use publish::{
    ChatNotifierPort, DatabaseEntry, DestinationFailure, DestinationKind, Diary, DiaryLink,
    DocumentDatabasePort, GistDocument, GistHostPort, PublishError, PublishResult,
};
pub use render::MarkdownRendererPort;
pub use snippet::{InvalidSnippet, Snippet, SnippetStoreError, SnippetStorePort, UNKNOWN_LANGUAGE};
pub use vcs::{Commit, VcsError, VcsPort};
