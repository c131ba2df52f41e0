//! Markdown to HTML rendering with pulldown-cmark

use devdiary_core::ports::MarkdownRendererPort;
use pulldown_cmark::{html, Options, Parser};

/// CommonMark renderer with tables, strikethrough and task lists enabled
#[derive(Debug, Default, Clone, Copy)]
pub struct CmarkRenderer;

impl CmarkRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MarkdownRendererPort for CmarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(markdown, options);

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_and_paragraph() {
        let html = CmarkRenderer.render("# Dev Diary\n\nShipped the **parser**.");
        assert!(html.contains("<h1>Dev Diary</h1>"));
        assert!(html.contains("<strong>parser</strong>"));
    }

    #[test]
    fn test_render_code_block_language() {
        let html = CmarkRenderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains("<code class=\"language-rust\">"));
    }

    #[test]
    fn test_render_extensions() {
        let html = CmarkRenderer.render("- [x] done\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("checkbox"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(CmarkRenderer.render(""), "");
    }
}
