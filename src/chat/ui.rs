//! Chat page rendering.
//!
//! Simple inline HTML templates without a template engine. Rendering only
//! reads the session.

use chrono::Local;
use std::fmt::Write;

use super::message::{Message, Role};
use super::session::{ChatSession, Notice};
use super::status::{ConnectionStatus, Health};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_TITLE: &str = "Ask the AI agent";

/// Values the page needs that do not belong to the session.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
    /// Base URL of the API server, shown in the sidebar.
    pub api_url: String,
}

impl PageContext {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            api_url: api_url.into(),
        }
    }
}

const STYLES: &str = r#"
    * { box-sizing: border-box; }
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        margin: 0;
        display: flex;
        min-height: 100vh;
        background: #f5f5f5;
        color: #333;
    }
    aside {
        width: 280px;
        padding: 24px 20px;
        background: #f0f2f6;
        border-right: 1px solid #ddd;
    }
    main {
        flex: 1;
        max-width: 860px;
        margin: 0 auto;
        padding: 24px 32px 140px;
    }
    h1 {
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    .status {
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
        font-size: 14px;
    }
    .status.connected { background: #dff0d8; color: #3c763d; }
    .status.degraded { background: #fcf8e3; color: #8a6d3b; }
    .status.unreachable { background: #f2dede; color: #a94442; }
    .status.unknown { background: #eee; color: #666; }
    .hint { font-size: 13px; color: #666; }
    .meta { font-size: 12px; color: #888; }
    .code {
        font-family: monospace;
        background: #fff;
        padding: 2px 6px;
        border-radius: 3px;
        font-size: 12px;
        word-break: break-all;
    }
    .message {
        display: flex;
        gap: 12px;
        margin: 14px 0;
        padding: 12px 14px;
        border-radius: 8px;
        background: white;
        box-shadow: 0 1px 3px rgba(0,0,0,0.08);
    }
    .message.assistant { background: #f9fbff; }
    .avatar {
        flex: none;
        width: 32px;
        height: 32px;
        border-radius: 6px;
        display: flex;
        align-items: center;
        justify-content: center;
        color: white;
        font-weight: bold;
        font-size: 13px;
    }
    .user .avatar { background: #ff4b4b; }
    .assistant .avatar { background: #ffa421; }
    .text { white-space: pre-wrap; line-height: 1.5; flex: 1; }
    .empty { color: #888; font-style: italic; }
    .notice {
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .notice.error { color: #d9534f; background: #f2dede; }
    .notice.info { color: #31708f; background: #d9edf7; }
    .notice form { display: inline; margin-left: 8px; }
    #chat-form {
        position: fixed;
        bottom: 0;
        left: 280px;
        right: 0;
        padding: 16px 32px;
        background: #f5f5f5;
        display: flex;
        gap: 8px;
    }
    #chat-form textarea {
        flex: 1;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        resize: none;
        font-family: inherit;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 18px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover { background: #0052a3; }
    button:disabled { background: #999; cursor: wait; }
    button.secondary { background: #999; }
    aside form { margin: 8px 0; }
    #pending { display: none; color: #666; font-style: italic; }
"#;

// Disables the form while the request is in flight and submits on Enter.
const SCRIPT: &str = r#"
    const form = document.getElementById('chat-form');
    const box = form.querySelector('textarea');
    box.addEventListener('keydown', (e) => {
        if (e.key === 'Enter' && !e.shiftKey && !e.isComposing) {
            e.preventDefault();
            form.requestSubmit();
        }
    });
    form.addEventListener('submit', () => {
        form.querySelector('button').disabled = true;
        box.readOnly = true;
        document.getElementById('pending').style.display = 'block';
    });
    window.scrollTo(0, document.body.scrollHeight);
    box.focus();
"#;

/// Renders the whole chat page for a session.
pub fn chat_page(session: &ChatSession, context: &PageContext) -> String {
    let title = html_escape(&context.title);
    let sidebar = sidebar(session.status(), &context.api_url);
    let transcript = transcript(session.transcript());
    let notice = session.notice().map_or_else(String::new, notice_html);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{STYLES}</style>
</head>
<body>
    <aside>
        {sidebar}
        <form method="POST" action="/clear">
            <button type="submit" class="secondary">Clear conversation</button>
        </form>
        <p class="meta">agent-chat v{VERSION}</p>
    </aside>
    <main>
        <h1>{title}</h1>
        {transcript}
        <p id="pending">Generating answer...</p>
        {notice}
        <form id="chat-form" method="POST" action="/chat">
            <textarea name="message" rows="2" placeholder="Type a message, /help for commands"></textarea>
            <button type="submit">Send</button>
        </form>
    </main>
    <script>{SCRIPT}</script>
</body>
</html>"#
    )
}

fn sidebar(status: Option<&ConnectionStatus>, api_url: &str) -> String {
    let api_url = html_escape(api_url);
    let mut html = String::from("<h3>Connection</h3>");

    match status {
        None => {
            html.push_str(r#"<div class="status unknown">Connection not checked yet</div>"#);
        }
        Some(status) => {
            let (class, label) = match status.health() {
                Health::Connected => ("connected", "Connected to the AI agent server".to_string()),
                Health::Degraded => (
                    "degraded",
                    format!(
                        "The AI agent server answered with status {}",
                        status.status_code.unwrap_or_default()
                    ),
                ),
                Health::Unreachable => (
                    "unreachable",
                    "Cannot connect to the AI agent server".to_string(),
                ),
            };
            let _ = write!(html, r#"<div class="status {class}">{label}</div>"#);

            if status.health() == Health::Unreachable {
                let _ = write!(
                    html,
                    r#"<p class="hint">Start the AI agent server at <span class="code">{api_url}</span>, then check again.</p>"#
                );
                if let Some(error) = &status.error {
                    let _ = write!(html, r#"<p class="meta">{}</p>"#, html_escape(error));
                }
            }

            let checked = status.last_checked.with_timezone(&Local).format("%H:%M:%S");
            let _ = write!(html, r#"<p class="meta">Last checked {checked}</p>"#);
        }
    }

    let _ = write!(
        html,
        r#"<p class="meta">API server <span class="code">{api_url}</span></p>
        <form method="POST" action="/status">
            <button type="submit">Check connection</button>
        </form>"#
    );
    html
}

fn transcript(messages: &[Message]) -> String {
    if messages.is_empty() {
        return r#"<p class="empty">No messages yet. Ask a question below.</p>"#.to_string();
    }

    messages.iter().fold(String::new(), |mut html, message| {
        let (class, avatar) = match message.role() {
            Role::User => ("user", "You"),
            Role::Assistant => ("assistant", "AI"),
        };
        let time = message.timestamp().map_or_else(String::new, |ts| {
            format!(
                r#"<div class="meta">{}</div>"#,
                ts.with_timezone(&Local).format("%H:%M")
            )
        });
        let _ = write!(
            html,
            r#"<div class="message {class}"><div class="avatar">{avatar}</div><div class="text">{}</div>{time}</div>"#,
            html_escape(message.text())
        );
        html
    })
}

fn notice_html(notice: &Notice) -> String {
    match notice {
        Notice::Error(text) => format!(r#"<div class="notice error">{}</div>"#, html_escape(text)),
        Notice::Connectivity(text) => format!(
            r#"<div class="notice error">{}<form method="POST" action="/status"><button type="submit">Retry connection</button></form></div>"#,
            html_escape(text)
        ),
        Notice::Info(text) => format!(r#"<div class="notice info">{}</div>"#, html_escape(text)),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_empty_transcript_placeholder() {
        assert!(transcript(&[]).contains("No messages yet"));
    }

    #[test]
    fn test_transcript_keeps_order_and_escapes() {
        let html = transcript(&[Message::user("<b>Hello</b>"), Message::assistant("Hi there")]);

        let user_pos = html.find("&lt;b&gt;Hello&lt;/b&gt;");
        let assistant_pos = html.find("Hi there");
        assert!(user_pos.is_some());
        assert!(user_pos < assistant_pos);
        assert!(!html.contains("<b>Hello</b>"));
    }

    #[test]
    fn test_sidebar_states() {
        let now = Utc::now();
        assert!(sidebar(None, "http://localhost:8000").contains("not checked yet"));
        assert!(
            sidebar(Some(&ConnectionStatus::answered(200, now)), "http://x").contains("connected")
        );
        assert!(
            sidebar(Some(&ConnectionStatus::answered(502, now)), "http://x").contains("status 502")
        );

        let unreachable = sidebar(
            Some(&ConnectionStatus::unreachable("connection refused", now)),
            "http://localhost:8000",
        );
        assert!(unreachable.contains("Cannot connect"));
        assert!(unreachable.contains("connection refused"));
        assert!(unreachable.contains("Start the AI agent server"));
    }

    #[test]
    fn test_connectivity_notice_offers_retry() {
        let html = notice_html(&Notice::Connectivity("timed out".to_string()));
        assert!(html.contains("Retry connection"));
        assert!(!notice_html(&Notice::Error("bad".to_string())).contains("Retry"));
    }

    #[test]
    fn test_chat_page_includes_form_and_title() {
        let session = ChatSession::new("s1".to_string());
        let page = chat_page(&session, &PageContext::new("http://localhost:8000"));

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(DEFAULT_TITLE));
        assert!(page.contains(r#"action="/chat""#));
        assert!(page.contains(r#"name="message""#));
    }
}
