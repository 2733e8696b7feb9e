//! HTTP handlers. Each POST maps to one [`UiEvent`] and redirects back to the
//! page, which renders once.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::State,
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

use super::sessions::{SessionStore, SharedSession};
use crate::api::ApiClient;
use crate::chat::{PageContext, UiEvent};

pub const SESSION_COOKIE: &str = "agent_chat_session";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub sessions: SessionStore,
    pub page: Arc<PageContext>,
}

impl AppState {
    pub fn new(api: ApiClient) -> Self {
        Self::with_sessions(api, SessionStore::new())
    }

    pub fn with_sessions(api: ApiClient, sessions: SessionStore) -> Self {
        let page = PageContext::new(api.settings().base_url.clone());
        Self {
            api,
            sessions,
            page: Arc::new(page),
        }
    }
}

/// Chat form data
#[derive(Deserialize)]
struct ChatForm {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    sessions: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_page))
        .route("/chat", post(handle_chat))
        .route("/status", post(handle_check_connection))
        .route("/clear", post(handle_clear))
        .route("/health", get(handle_health))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Finds the session named by the cookie, or starts a new one.
async fn session_for(state: &AppState, cookies: &Cookies) -> SharedSession {
    if let Some(cookie) = cookies.get(SESSION_COOKIE)
        && let Some(session) = state.sessions.get(cookie.value()).await
    {
        return session;
    }

    let (token, session) = state.sessions.create_session().await;
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    session
}

async fn dispatch(state: &AppState, cookies: &Cookies, event: UiEvent) {
    let session = session_for(state, cookies).await;
    session.lock().await.handle(&state.api, event).await;
}

/// Handler for GET / - render the chat page
async fn handle_page(State(state): State<AppState>, cookies: Cookies) -> Html<String> {
    let session = session_for(&state, &cookies).await;
    let mut session = session.lock().await;

    session.handle(&state.api, UiEvent::Refresh).await;
    let html = session.render(&state.page);
    session.take_notice();
    Html(html)
}

/// Handler for POST /chat - submit a message or slash command
async fn handle_chat(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<ChatForm>,
) -> Redirect {
    dispatch(&state, &cookies, UiEvent::Submit(form.message)).await;
    Redirect::to("/")
}

/// Handler for POST /status - re-check the API server
async fn handle_check_connection(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    dispatch(&state, &cookies, UiEvent::CheckConnection).await;
    Redirect::to("/")
}

/// Handler for POST /clear - drop the transcript
async fn handle_clear(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    dispatch(&state, &cookies, UiEvent::Clear).await;
    Redirect::to("/")
}

/// Handler for GET /health - liveness of this process
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "agent-chat",
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.sessions.session_count().await,
    })
}
