//! Telegram bot notifier

use async_trait::async_trait;
use devdiary_core::ports::{ChatNotifierPort, DestinationKind, DiaryLink, PublishError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{error_for_status, transport_error};
use crate::ai::http_client;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const KIND: DestinationKind = DestinationKind::Telegram;

/// Markdown message: bold title, summary, then one link per line
pub fn format_summary_message(title: &str, summary: &str, links: &[DiaryLink]) -> String {
    let mut message = format!("*{}*\n\n{}", title, summary);
    if !links.is_empty() {
        let lines: Vec<String> = links
            .iter()
            .map(|link| format!("[{}]({})", link.title, link.url))
            .collect();
        message.push_str("\n\n*Links:*\n");
        message.push_str(&lines.join("\n"));
    }
    message
}

pub struct TelegramAdapter {
    client: Client,
    token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            token: token.into(),
            chat_id: chat_id.into(),
            base_url: TELEGRAM_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl ChatNotifierPort for TelegramAdapter {
    async fn send_summary(
        &self,
        title: &str,
        summary: &str,
        links: &[DiaryLink],
    ) -> Result<bool, PublishError> {
        let text = format_summary_message(title, summary, links);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        };

        let response = self
            .client
            .post(format!("{}/bot{}/sendMessage", self.base_url, self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(KIND, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(KIND, status, error_body));
        }

        let reply: BotResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(KIND, e.to_string()))?;
        if !reply.ok {
            warn!(description = ?reply.description, "Telegram did not deliver the summary");
        } else {
            debug!(links = links.len(), "Sent Telegram summary");
        }
        Ok(reply.ok)
    }
}
