//! Chat session module for conversations with Gemini.
//!
//! # Architecture
//!
//! - [`turn`]: the `ChatTurn` value type
//! - [`store`]: the append-only message history
//! - [`session`]: the session state machine and its controller
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing
//! - [`render`]: terminal rendering and the progress indicator

mod commands;
mod config;
mod render;
mod session;
mod store;
mod turn;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PROGRESS_FRAMES, PROGRESS_INTERVAL, PlainTextRenderer, ProgressIndicator, Renderer};
pub use session::{
    ChatView, Outcome, STOPPED_PLACEHOLDER, Session, SessionController, Status, StopMode,
};
pub use store::MessageStore;
pub use turn::{ChatTurn, Role};
