//! Core chat session management.
//!
//! [`SessionController`] owns one [`Session`] and drives the interaction
//! state machine: a submission moves the session from idle to generating,
//! the gateway result is resolved into an [`Outcome`], and the session
//! returns to idle. `stop` and `clear` may be called from other tasks while
//! a submission is awaiting the gateway.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::chat::store::MessageStore;
use crate::chat::turn::ChatTurn;
use crate::error::{Error, Result};
use crate::gateway::CompletionGateway;
use crate::observability::{
    SESSION_CLEARS, SESSION_COMMITTED, SESSION_DISCARDED, SESSION_FAILED, SESSION_REJECTED,
    SESSION_STOPPED, SESSION_SUBMISSIONS, SESSION_TURN_DURATION,
};

/// Text displayed in place of a reply after the user stopped it.
pub const STOPPED_PLACEHOLDER: &str = "⚠️ Response stopped.";

/// Display status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Ready for a submission.
    Idle,
    /// A completion request is outstanding.
    Generating,
    /// The last submission was stopped by the user.
    Stopped,
    /// The last submission failed.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("idle"),
            Status::Generating => f.write_str("generating"),
            Status::Stopped => f.write_str("stopped"),
            Status::Error => f.write_str("error"),
        }
    }
}

/// What `stop` does to a completion request that is still in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopMode {
    /// Drop the outstanding request as soon as stop is requested.
    #[default]
    Abort,
    /// Let the request finish, then discard its result.
    Discard,
}

impl FromStr for StopMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(StopMode::Abort),
            "discard" => Ok(StopMode::Discard),
            _ => Err(Error::configuration(format!(
                "stop mode must be 'abort' or 'discard', got '{s}'"
            ))),
        }
    }
}

/// How a submission was resolved.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The exchange was appended to the history.
    Committed {
        /// The reply text.
        reply: String,
    },
    /// The user stopped the submission; nothing was appended.
    Stopped,
    /// The gateway failed; nothing was appended.
    Failed {
        /// The gateway error.
        error: Error,
    },
    /// The history was cleared while generating; the reply is shown but not
    /// appended.
    Discarded {
        /// The reply text.
        reply: String,
    },
}

impl Outcome {
    /// The text to display for this outcome.
    pub fn display_text(&self) -> String {
        match self {
            Outcome::Committed { reply } | Outcome::Discarded { reply } => reply.clone(),
            Outcome::Stopped => STOPPED_PLACEHOLDER.to_string(),
            Outcome::Failed { error } => format!("⚠️ Error: {error}"),
        }
    }

    /// Returns true if the exchange was appended to the history.
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }
}

/// The outbound view model for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    /// The committed history.
    pub history: Vec<ChatTurn>,
    /// The current status.
    pub status: Status,
}

/// State for one chat connection.
#[derive(Debug)]
pub struct Session {
    history: MessageStore,
    cancel_requested: bool,
    status: Status,
    epoch: u64,
    cancel: Option<CancellationToken>,
}

impl Session {
    /// Creates an idle session with an empty history.
    pub fn new() -> Self {
        Self {
            history: MessageStore::new(),
            cancel_requested: false,
            status: Status::Idle,
            epoch: 0,
            cancel: None,
        }
    }

    /// The committed history.
    pub fn history(&self) -> &MessageStore {
        &self.history
    }

    /// The current status.
    pub fn status(&self) -> Status {
        self.status
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a [`Session`] against a [`CompletionGateway`].
///
/// Cloning a controller yields another handle to the same session.
pub struct SessionController<G: CompletionGateway + ?Sized> {
    gateway: Arc<G>,
    session: Arc<Mutex<Session>>,
    stop_mode: StopMode,
}

impl<G: CompletionGateway + ?Sized> Clone for SessionController<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            session: Arc::clone(&self.session),
            stop_mode: self.stop_mode,
        }
    }
}

impl<G: CompletionGateway + ?Sized> SessionController<G> {
    /// Creates a controller with a fresh session.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            session: Arc::new(Mutex::new(Session::new())),
            stop_mode: StopMode::default(),
        }
    }

    /// Sets the stop mode.
    pub fn with_stop_mode(mut self, stop_mode: StopMode) -> Self {
        self.stop_mode = stop_mode;
        self
    }

    /// The configured stop mode.
    pub fn stop_mode(&self) -> StopMode {
        self.stop_mode
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submits user text and waits for the exchange to resolve.
    ///
    /// Gateway failures are not errors here; they resolve to
    /// [`Outcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank text and [`Error::Busy`] if
    /// another submission is still generating. Neither touches the session.
    pub async fn submit(&self, text: &str) -> Result<Outcome> {
        if text.trim().is_empty() {
            return Err(Error::validation("message is empty"));
        }
        let (token, epoch) = {
            let mut session = self.lock();
            if session.status == Status::Generating {
                SESSION_REJECTED.click();
                return Err(Error::busy("a reply is still being generated"));
            }
            session.cancel_requested = false;
            session.status = Status::Generating;
            let token = CancellationToken::new();
            session.cancel = Some(token.clone());
            (token, session.epoch)
        };
        SESSION_SUBMISSIONS.click();
        debug!("submission accepted ({} bytes)", text.len());

        let mut in_flight = InFlight {
            session: &self.session,
            armed: true,
        };
        let start = Instant::now();
        let result = match self.stop_mode {
            StopMode::Abort => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = self.gateway.complete(text) => Some(result),
            },
            StopMode::Discard => Some(self.gateway.complete(text).await),
        };
        SESSION_TURN_DURATION.add(start.elapsed().as_secs_f64());
        in_flight.armed = false;

        Ok(self.resolve(text, epoch, result))
    }

    fn resolve(&self, prompt: &str, epoch: u64, result: Option<Result<String>>) -> Outcome {
        let mut session = self.lock();
        session.cancel = None;
        let cancel_requested = session.cancel_requested;
        let outcome = match result {
            _ if cancel_requested => Outcome::Stopped,
            None => Outcome::Stopped,
            Some(Ok(reply)) if session.epoch != epoch => Outcome::Discarded { reply },
            Some(Ok(reply)) => {
                session.history.append(ChatTurn::user(prompt));
                session.history.append(ChatTurn::assistant(reply.clone()));
                Outcome::Committed { reply }
            }
            Some(Err(error)) => Outcome::Failed { error },
        };
        session.status = match &outcome {
            Outcome::Committed { .. } | Outcome::Discarded { .. } => Status::Idle,
            Outcome::Stopped => Status::Stopped,
            Outcome::Failed { .. } => Status::Error,
        };
        match &outcome {
            Outcome::Committed { .. } => SESSION_COMMITTED.click(),
            Outcome::Stopped => SESSION_STOPPED.click(),
            Outcome::Failed { .. } => SESSION_FAILED.click(),
            Outcome::Discarded { .. } => SESSION_DISCARDED.click(),
        }
        debug!("submission resolved; status={}", session.status);
        outcome
    }

    /// Requests that the in-flight submission be stopped.
    ///
    /// Returns true if a submission was generating. The submission resolves
    /// to [`Outcome::Stopped`] regardless of what the gateway returns.
    pub fn stop(&self) -> bool {
        let mut session = self.lock();
        if session.status != Status::Generating {
            return false;
        }
        session.cancel_requested = true;
        if let Some(token) = &session.cancel {
            token.cancel();
        }
        info!("stop requested ({:?})", self.stop_mode);
        true
    }

    /// Empties the history immediately.
    ///
    /// A submission that is generating keeps running, but its reply will not
    /// be appended.
    pub fn clear(&self) {
        let mut session = self.lock();
        session.history.clear();
        session.epoch = session.epoch.wrapping_add(1);
        SESSION_CLEARS.click();
        info!("history cleared");
    }

    /// A snapshot of the history and status.
    pub fn view(&self) -> ChatView {
        let session = self.lock();
        ChatView {
            history: session.history.snapshot(),
            status: session.status,
        }
    }

    /// A snapshot of the committed history.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.lock().history.snapshot()
    }

    /// Number of committed turns.
    pub fn turn_count(&self) -> usize {
        self.lock().history.len()
    }

    /// The current status.
    pub fn status(&self) -> Status {
        self.lock().status
    }

    /// Returns true while a submission is generating.
    pub fn is_generating(&self) -> bool {
        self.status() == Status::Generating
    }

    /// Returns true if stop was requested for the current submission.
    pub fn cancel_requested(&self) -> bool {
        self.lock().cancel_requested
    }
}

/// Returns the session to idle if a submission future is dropped before it
/// resolves.
struct InFlight<'a> {
    session: &'a Mutex<Session>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            session.cancel = None;
            session.status = Status::Idle;
        }
    }
}
