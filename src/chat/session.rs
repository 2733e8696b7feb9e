use chrono::Utc;
use std::fmt::Write;
use std::time::Instant;

use super::command::{Input, SLASH_COMMANDS, SlashCommand, parse_input};
use super::message::{Message, Role};
use super::status::ConnectionStatus;
use super::ui::{self, PageContext};
use crate::api::ApiClient;
use crate::error::TurnError;

/// One user action from the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Text typed into the chat box. May be a slash command.
    Submit(String),
    /// The "check connection" button.
    CheckConnection,
    /// The "clear conversation" button.
    Clear,
    /// A page load. Re-checks the connection when the last check is stale.
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

/// A message shown once above the chat box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    /// The API server could not be reached or did not answer in time.
    /// Shown with a retry affordance.
    Connectivity(String),
    Info(String),
}

/// The state of one browser session: transcript, connection status and the
/// pending inline notice.
#[derive(Debug)]
pub struct ChatSession {
    id: String,
    transcript: Vec<Message>,
    status: Option<ConnectionStatus>,
    notice: Option<Notice>,
    phase: Phase,
}

impl ChatSession {
    pub const fn new(id: String) -> Self {
        Self {
            id,
            transcript: Vec::new(),
            status: None,
            notice: None,
            phase: Phase::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub const fn status(&self) -> Option<&ConnectionStatus> {
        self.status.as_ref()
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Applies one user action to the session.
    pub async fn handle(&mut self, api: &ApiClient, event: UiEvent) {
        match event {
            UiEvent::Submit(raw) => match parse_input(&raw) {
                Input::Text(text) => {
                    // Failures are already recorded as a notice.
                    let _ = self.submit_message(api, &text).await;
                }
                Input::Empty => {
                    self.notice = Some(Notice::Error(TurnError::EmptyInput.to_string()));
                }
                Input::Command(cmd) => self.handle_command(api, cmd).await,
            },
            UiEvent::CheckConnection => {
                self.notice = None;
                self.check_connection(api).await;
            }
            UiEvent::Clear => {
                self.notice = None;
                self.clear();
            }
            UiEvent::Refresh => self.refresh_status(api).await,
        }
    }

    async fn handle_command(&mut self, api: &ApiClient, cmd: SlashCommand) {
        match cmd {
            SlashCommand::Clear => {
                self.clear();
                self.notice = Some(Notice::Info("Conversation cleared".to_string()));
            }
            SlashCommand::Status => {
                self.notice = None;
                self.check_connection(api).await;
            }
            SlashCommand::Help => {
                let mut help = String::from("Available commands:");
                for (cmd, desc) in SLASH_COMMANDS {
                    let _ = write!(help, " {cmd} ({desc})");
                }
                self.notice = Some(Notice::Info(help));
            }
            SlashCommand::Unknown(cmd) => {
                self.notice = Some(Notice::Error(format!("Unknown command: /{cmd}")));
            }
        }
    }

    /// Runs one chat turn.
    ///
    /// The user message is appended before the request goes out; the
    /// assistant message is appended only when the API server answered with
    /// a usable reply. Empty input is rejected without touching the transcript.
    pub async fn submit_message(&mut self, api: &ApiClient, text: &str) -> Result<(), TurnError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TurnError::EmptyInput);
        }

        let prior = self.transcript.len();
        self.transcript.push(Message::user(text));
        self.phase = Phase::AwaitingResponse;
        self.notice = None;

        let started = Instant::now();
        let result = api.query(text, &self.transcript[..prior]).await;
        self.phase = Phase::Idle;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(reply) => {
                tracing::info!(
                    session = %self.id,
                    turn = self.turns(),
                    elapsed_ms,
                    "Answer received"
                );
                self.transcript.push(Message::assistant(reply));
                Ok(())
            }
            Err(err) => {
                tracing::error!(session = %self.id, elapsed_ms, error = %err, "Chat turn failed");
                if matches!(err, TurnError::Connect(_)) {
                    self.status = Some(ConnectionStatus::unreachable(err.to_string(), Utc::now()));
                }
                self.notice = Some(if err.is_connectivity() {
                    Notice::Connectivity(err.to_string())
                } else {
                    Notice::Error(err.to_string())
                });
                Err(err)
            }
        }
    }

    /// Probes the API server and records the result for the status indicator.
    pub async fn check_connection(&mut self, api: &ApiClient) -> &ConnectionStatus {
        let status = api.check_health().await;
        self.status.insert(status)
    }

    /// Re-checks the connection if it was never checked or the last check is
    /// older than the configured freshness window.
    pub async fn refresh_status(&mut self, api: &ApiClient) {
        let ttl = api.settings().status_ttl;
        let stale = self
            .status
            .as_ref()
            .is_none_or(|s| s.is_stale(ttl, Utc::now()));
        if stale {
            self.check_connection(api).await;
        }
    }

    pub fn clear(&mut self) {
        tracing::info!(session = %self.id, messages = self.transcript.len(), "Conversation cleared");
        self.transcript.clear();
    }

    /// Takes the pending notice so it is shown exactly once.
    pub const fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Renders the current state as a complete HTML page.
    pub fn render(&self, context: &PageContext) -> String {
        ui::chat_page(self, context)
    }

    fn turns(&self) -> usize {
        self.transcript.iter().filter(|m| m.role() == Role::User).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiSettings;
    use std::time::Duration;

    fn offline_client() -> ApiClient {
        // Port 9 (discard) is closed on test machines; requests fail fast.
        ApiClient::new(ApiSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            health_timeout: Duration::from_secs(2),
            ..ApiSettings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_submission_leaves_transcript_alone() {
        let api = offline_client();
        let mut session = ChatSession::new("s1".to_string());

        let err = session.submit_message(&api, "   ").await.unwrap_err();

        assert!(matches!(err, TurnError::EmptyInput));
        assert!(session.transcript().is_empty());
        assert!(session.status().is_none());
    }

    #[tokio::test]
    async fn test_empty_event_shows_notice() {
        let api = offline_client();
        let mut session = ChatSession::new("s1".to_string());

        session.handle(&api, UiEvent::Submit(String::new())).await;

        assert!(session.transcript().is_empty());
        assert!(matches!(session.notice(), Some(Notice::Error(_))));
    }

    #[tokio::test]
    async fn test_unreachable_turn_keeps_user_message_only() {
        let api = offline_client();
        let mut session = ChatSession::new("s1".to_string());

        let result = session.submit_message(&api, "Hello").await;

        assert!(result.unwrap_err().is_connectivity());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].text(), "Hello");
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.status().unwrap().reachable);
        assert!(matches!(session.notice(), Some(Notice::Connectivity(_))));
    }

    #[tokio::test]
    async fn test_help_and_unknown_commands() {
        let api = offline_client();
        let mut session = ChatSession::new("s1".to_string());

        session.handle(&api, UiEvent::Submit("/help".to_string())).await;
        let Some(Notice::Info(help)) = session.take_notice() else {
            panic!("expected help notice");
        };
        assert!(help.contains("/clear"));
        assert!(session.notice().is_none());

        session.handle(&api, UiEvent::Submit("/nope".to_string())).await;
        assert_eq!(
            session.notice(),
            Some(&Notice::Error("Unknown command: /nope".to_string()))
        );
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_check_connection_unreachable() {
        let api = offline_client();
        let mut session = ChatSession::new("s1".to_string());

        let status = session.check_connection(&api).await;

        assert!(!status.reachable);
        assert!(status.error.is_some());
    }
}
