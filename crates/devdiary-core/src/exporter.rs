//! Diary and activity export
//!
//! Writes generated diaries to `<data_dir>/diaries/` as markdown and HTML,
//! and converts activity data to and from editable JSON.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::ports::{ActivityData, Diary};

const MAX_SLUG_CHARS: usize = 60;
const FALLBACK_SLUG: &str = "diary";

/// Paths written by [`DiaryExporter::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDiary {
    pub markdown_path: PathBuf,
    pub html_path: PathBuf,
}

pub struct DiaryExporter {
    diaries_dir: PathBuf,
}

impl DiaryExporter {
    pub fn new(diaries_dir: impl Into<PathBuf>) -> Self {
        Self {
            diaries_dir: diaries_dir.into(),
        }
    }

    pub fn diaries_dir(&self) -> &Path {
        &self.diaries_dir
    }

    /// Writes `<date>-<slug>.md` and `<date>-<slug>.html`, replacing any
    /// earlier export with the same name.
    pub fn save(&self, diary: &Diary, date: NaiveDate) -> std::io::Result<ExportedDiary> {
        fs::create_dir_all(&self.diaries_dir)?;

        let stem = format!("{}-{}", date.format("%Y-%m-%d"), slugify(diary.title()));
        let markdown_path = self.diaries_dir.join(format!("{}.md", stem));
        let html_path = self.diaries_dir.join(format!("{}.html", stem));

        fs::write(&markdown_path, diary.markdown())?;
        fs::write(&html_path, html_document(diary))?;

        tracing::info!(path = %markdown_path.display(), "Saved diary");
        Ok(ExportedDiary {
            markdown_path,
            html_path,
        })
    }

    /// Pretty JSON for `activity`, suitable for hand editing
    pub fn activity_to_json(activity: &ActivityData) -> serde_json::Result<String> {
        serde_json::to_string_pretty(activity)
    }

    /// Parses activity JSON; missing sections default to empty
    pub fn activity_from_json(json: &str) -> serde_json::Result<ActivityData> {
        serde_json::from_str(json)
    }
}

/// Lowercase ASCII slug of `title`; runs of other characters become one `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let mut slug: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

fn html_document(diary: &Diary) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(diary.title()),
        diary.html()
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
