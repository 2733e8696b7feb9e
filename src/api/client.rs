use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::chat::{ConnectionStatus, Message};
use crate::config::ApiSettings;
use crate::error::TurnError;

/// Longest slice of an error body kept for display.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    history: Vec<HistoryEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct HistoryEntry<'a> {
    role: &'static str,
    content: &'a str,
}

// The reference agent server answers with `answer`; other deployments use
// `reply`, and some send both.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    reply: Option<String>,
    answer: Option<String>,
}

/// HTTP client for the agent API server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    settings: ApiSettings,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("agent-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, settings })
    }

    pub const fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Sends one chat turn and returns the assistant's reply text.
    ///
    /// `history` is the transcript before this turn.
    pub async fn query(&self, query: &str, history: &[Message]) -> Result<String, TurnError> {
        let url = self.settings.chat_url();
        let request = QueryRequest {
            query,
            history: history
                .iter()
                .map(|m| HistoryEntry {
                    role: m.role().as_str(),
                    content: m.text(),
                })
                .collect(),
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.settings.timeout)
            .send()
            .await
            .map_err(|e| classify(e, self.settings.timeout.as_secs()))?;

        let status = response.status();
        tracing::debug!(
            %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat request answered"
        );

        let body = response
            .text()
            .await
            .map_err(|e| classify(e, self.settings.timeout.as_secs()))?;

        if !status.is_success() {
            return Err(TurnError::Status {
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY),
            });
        }

        parse_reply(&body)
    }

    /// Probes the health endpoint and reports what happened.
    ///
    /// Never fails: an unreachable server is a status, not an error.
    pub async fn check_health(&self) -> ConnectionStatus {
        let url = self.settings.health_url();
        let result = self
            .client
            .get(&url)
            .timeout(self.settings.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) => {
                let code = response.status().as_u16();
                if response.status().is_success() {
                    tracing::debug!(%url, status = code, "API server connected");
                } else {
                    tracing::warn!(%url, status = code, "API server answered health check with a problem");
                }
                ConnectionStatus::answered(code, Utc::now())
            }
            Err(e) => {
                let err = classify(e, self.settings.health_timeout.as_secs());
                tracing::error!(%url, error = %err, "API server health check failed");
                ConnectionStatus::unreachable(err.to_string(), Utc::now())
            }
        }
    }
}

fn classify(err: reqwest::Error, secs: u64) -> TurnError {
    if err.is_timeout() {
        TurnError::Timeout { secs }
    } else {
        err.into()
    }
}

fn parse_reply(body: &str) -> Result<String, TurnError> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| TurnError::MalformedResponse(e.to_string()))?;
    response
        .reply
        .or(response.answer)
        .ok_or_else(|| TurnError::MalformedResponse("missing `reply` or `answer` field".to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_field() {
        assert_eq!(parse_reply(r#"{"reply": "Hi there"}"#).unwrap(), "Hi there");
    }

    #[test]
    fn test_parse_answer_field() {
        assert_eq!(
            parse_reply(r#"{"answer": "Use form 12-B.", "sources": []}"#).unwrap(),
            "Use form 12-B."
        );
    }

    #[test]
    fn test_parse_both_fields_prefers_reply() {
        assert_eq!(parse_reply(r#"{"answer": "A", "reply": "A"}"#).unwrap(), "A");
        assert_eq!(
            parse_reply(r#"{"reply": "short", "answer": "long form"}"#).unwrap(),
            "short"
        );
    }

    #[test]
    fn test_parse_null_reply_falls_back_to_answer() {
        assert_eq!(
            parse_reply(r#"{"reply": null, "answer": "fallback"}"#).unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_parse_missing_field() {
        let err = parse_reply(r#"{"text": "nope"}"#).unwrap_err();
        assert!(matches!(err, TurnError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_reply("<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, TurnError::MalformedResponse(_)));
    }

    #[test]
    fn test_request_serialization() {
        let history = [Message::user("Hello"), Message::assistant("Hi there")];
        let request = QueryRequest {
            query: "How are you?",
            history: history
                .iter()
                .map(|m| HistoryEntry {
                    role: m.role().as_str(),
                    content: m.text(),
                })
                .collect(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"], "How are you?");
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][1]["content"], "Hi there");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("エラーが発生しました", 3), "エラー...");
    }
}
