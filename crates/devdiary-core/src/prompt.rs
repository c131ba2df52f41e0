//! Prompt construction for diary generation
//!
//! Builds the first-pass diary prompt from activity data and the second-pass
//! enhance prompt from a draft. Large activity payloads can be truncated to
//! fit a backend's input budget.

use chrono::NaiveDate;

use crate::ports::ai::AIError;
use crate::ports::{ActivityData, Snippet};

/// Snippets kept when truncating
pub const MAX_SNIPPETS: usize = 5;
/// Characters of snippet code kept when truncating
pub const MAX_SNIPPET_CHARS: usize = 1000;
/// Notes kept when truncating
pub const MAX_NOTES: usize = 10;
/// Commits kept when truncating
pub const MAX_COMMITS: usize = 10;
/// Share of the input budget a payload may use before it is truncated
pub const BUDGET_SHARE: f64 = 0.7;

const ELLIPSIS: &str = "...";

/// System and user prompt pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Rough token estimate (about four characters per token)
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Whether a serialized payload should be truncated under `budget`
pub fn exceeds_budget(payload: &str, budget: Option<usize>) -> bool {
    match budget {
        Some(budget) => estimate_tokens(payload) as f64 > budget as f64 * BUDGET_SHARE,
        None => false,
    }
}

/// Shrinks activity to the first 5 snippets (code capped at 1000 characters),
/// the first 10 notes and the first 10 commits. Other sections are kept.
pub fn truncate_activity(activity: &ActivityData) -> ActivityData {
    let mut truncated = activity.clone();

    truncated.snippets.truncate(MAX_SNIPPETS);
    truncated.snippets = truncated
        .snippets
        .into_iter()
        .map(|snippet| {
            if snippet.code().chars().count() <= MAX_SNIPPET_CHARS {
                return snippet;
            }
            let head: String = snippet.code().chars().take(MAX_SNIPPET_CHARS).collect();
            rebuild_with_code(&snippet, format!("{}{}", head, ELLIPSIS))
        })
        .collect();

    truncated.notes.truncate(MAX_NOTES);
    truncated.git_activity.commits.truncate(MAX_COMMITS);
    truncated
}

fn rebuild_with_code(snippet: &Snippet, code: String) -> Snippet {
    // Truncating non-empty code cannot produce empty code.
    let Ok(rebuilt) = Snippet::new(code, snippet.language()) else {
        return snippet.clone();
    };
    let mut rebuilt = rebuilt
        .with_id(snippet.id())
        .with_project(snippet.project())
        .with_tags(snippet.tags())
        .with_timestamp(snippet.timestamp())
        .with_source(snippet.source());
    if snippet.is_enriched() {
        rebuilt.mark_enriched();
    }
    rebuilt
}

/// Builder for diary prompts
pub struct PromptBuilder;

impl PromptBuilder {
    /// First-pass prompt asking for a structured diary of `activity`.
    ///
    /// # Errors
    /// `AIError::InvalidRequest` if the activity cannot be serialized.
    pub fn build_diary_prompt(activity: &ActivityData, date: NaiveDate) -> Result<Prompt, AIError> {
        let payload = serde_json::to_string(activity)
            .map_err(|e| AIError::InvalidRequest(format!("activity serialization: {}", e)))?;
        Ok(Self::diary_prompt_from_payload(&payload, date))
    }

    pub(crate) fn diary_prompt_from_payload(payload: &str, date: NaiveDate) -> Prompt {
        Prompt {
            system: Self::diary_system_message(),
            user: format!(
                "Today's date is {}. Please create a developer diary entry based on the following activity data: {}",
                date.format("%Y-%m-%d"),
                payload
            ),
        }
    }

    /// Second-pass prompt asking to polish `draft` without changing its facts.
    pub fn build_enhance_prompt(draft: &str) -> Prompt {
        Prompt {
            system: Self::enhance_system_message(),
            user: format!("Please enhance the following developer diary: {}", draft),
        }
    }

    fn diary_system_message() -> String {
        r#"You are an expert developer diary assistant. Your task is to summarize the developer's daily
activities, code snippets, decisions, and other information into a clean, well-structured markdown diary.
The diary should include:
1. A level-1 markdown heading as the title, containing the current date
2. A brief executive summary of the day's work
3. Code highlights with proper markdown formatting and syntax highlighting
4. Key decisions and their rationale
5. Challenges faced and solutions implemented
6. Next steps or plans for tomorrow
Use a professional but conversational tone. Format the diary in a way that's easy to read and well-organized."#
            .to_string()
    }

    fn enhance_system_message() -> String {
        r#"You are an expert developer diary assistant. Your task is to enhance the provided developer diary
by adding valuable insights, better organization, and professional polish. Consider:
1. Adding helpful section headers if missing
2. Suggesting optimizations or best practices based on code snippets
3. Highlighting potential areas for future improvement
4. Adding context to technical decisions
Maintain the original content and facts, only enhance the presentation and add insights.
Keep the level-1 title heading as the first line."#
            .to_string()
    }
}
