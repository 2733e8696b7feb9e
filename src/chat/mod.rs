//! The chat session: transcript, connection status and event handling.
//!
//! Each browser session owns one [`ChatSession`]. Every user action is one
//! [`UiEvent`] handled by [`ChatSession::handle`], followed by one render.

/// Slash command parsing.
pub mod command;
mod message;
mod session;
mod status;
/// HTML rendering of a session.
pub mod ui;

pub use message::{Message, Role};
pub use session::{ChatSession, Notice, Phase, UiEvent};
pub use status::{ConnectionStatus, Health};
pub use ui::PageContext;
