//! Snippet store adapters

mod local;
mod pieces;

pub use local::SqliteSnippetStore;
pub use pieces::{PiecesSnippetStore, DEFAULT_PIECES_BASE_URL};
