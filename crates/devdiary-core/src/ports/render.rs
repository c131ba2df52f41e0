//! Markdown renderer port definition

/// Port for converting markdown to HTML
///
/// Rendering is pure and synchronous and exposes no failure mode.
pub trait MarkdownRendererPort: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}
