//! The local web process serving the chat page.

mod routes;
mod server;
mod sessions;

pub use routes::{AppState, SESSION_COOKIE, router};
pub use server::serve;
pub use sessions::{SessionStore, SessionToken, SharedSession};
