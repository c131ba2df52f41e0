//! Snippet statistics for the day

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::ports::Snippet;

const TOP_TAGS: usize = 10;
const UNASSIGNED_PROJECT: &str = "Unknown";

/// Counts over a set of snippets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetInsights {
    pub total: usize,
    pub by_language: BTreeMap<String, usize>,
    pub by_project: BTreeMap<String, usize>,
    /// Most frequent tags, highest first; equal counts sort alphabetically
    pub top_tags: Vec<(String, usize)>,
}

impl SnippetInsights {
    pub fn from_snippets(snippets: &[Snippet]) -> Self {
        let mut insights = Self {
            total: snippets.len(),
            ..Self::default()
        };
        let mut tags: HashMap<&str, usize> = HashMap::new();

        for snippet in snippets {
            *insights
                .by_language
                .entry(snippet.language().to_string())
                .or_default() += 1;

            let project = match snippet.project().trim() {
                "" => UNASSIGNED_PROJECT,
                project => project,
            };
            *insights.by_project.entry(project.to_string()).or_default() += 1;

            for tag in snippet.tags() {
                *tags.entry(tag.as_str()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = tags
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(TOP_TAGS);
        insights.top_tags = ranked;

        insights
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
