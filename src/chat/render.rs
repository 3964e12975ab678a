//! Output rendering for the chat application.
//!
//! [`Renderer`] is the presentation boundary: it displays committed turns,
//! the outcome of each submission, and a progress indicator while the
//! session is generating. [`PlainTextRenderer`] writes to a terminal with
//! optional ANSI styling.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crate::chat::session::Outcome;
use crate::chat::turn::{ChatTurn, Role};

/// ANSI escape code for dim text (used for the progress indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for user turns).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for stopped replies).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to erase the current line.
const ANSI_ERASE_LINE: &str = "\x1b[2K";

/// Frames cycled by the progress indicator.
pub const PROGRESS_FRAMES: [&str; 3] = ["Responding.", "Responding..", "Responding..."];

/// How often the progress indicator advances.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(700);

/// Cycles through [`PROGRESS_FRAMES`].
#[derive(Debug, Default, Clone)]
pub struct ProgressIndicator {
    tick: usize,
}

impl ProgressIndicator {
    /// Creates an indicator positioned before the first frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next frame.
    pub fn next_frame(&mut self) -> &'static str {
        let frame = PROGRESS_FRAMES[self.tick % PROGRESS_FRAMES.len()];
        self.tick = self.tick.wrapping_add(1);
        frame
    }
}

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print the greeting shown at startup.
    fn print_banner(&mut self, model: &str);

    /// Print one committed turn.
    fn print_turn(&mut self, turn: &ChatTurn);

    /// Print the result of a submission.
    fn print_outcome(&mut self, outcome: &Outcome);

    /// Show a progress frame in place of the previous one.
    fn print_progress(&mut self, frame: &str);

    /// Remove the progress indicator.
    fn finish_progress(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    progress_visible: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer over an arbitrary writer.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            progress_visible: false,
        }
    }

    /// Consumes the renderer and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Flushes output to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn styled(&mut self, style: &str, text: &str) {
        if self.use_color {
            let _ = write!(self.out, "{style}{text}{ANSI_RESET}");
        } else {
            let _ = write!(self.out, "{text}");
        }
    }

    fn label(&mut self, role: Role) {
        let label = match role {
            Role::User => "You: ",
            Role::Assistant => "Gemini: ",
        };
        self.styled(ANSI_BOLD, label);
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_banner(&mut self, model: &str) {
        self.styled(ANSI_BOLD, "🤖 AI Chatbot");
        let _ = writeln!(self.out, " (model: {model})");
        let _ = writeln!(self.out, "Chat with AI and fix your problems!");
        let _ = writeln!(self.out, "Type /help for commands, Ctrl+C to stop a reply, /quit to exit\n");
        self.flush();
    }

    fn print_turn(&mut self, turn: &ChatTurn) {
        self.finish_progress();
        self.label(turn.role());
        match turn.role() {
            Role::User => self.styled(ANSI_CYAN, turn.text()),
            Role::Assistant => {
                let _ = write!(self.out, "{}", turn.text());
            }
        }
        let _ = writeln!(self.out);
        self.flush();
    }

    fn print_outcome(&mut self, outcome: &Outcome) {
        self.finish_progress();
        self.label(Role::Assistant);
        let text = outcome.display_text();
        match outcome {
            Outcome::Committed { .. } | Outcome::Discarded { .. } => {
                let _ = write!(self.out, "{text}");
            }
            Outcome::Stopped => self.styled(ANSI_YELLOW, &text),
            Outcome::Failed { .. } => self.styled(ANSI_RED, &text),
        }
        let _ = writeln!(self.out);
        if let Outcome::Discarded { .. } = outcome {
            self.print_info("(history was cleared; this reply was not saved)");
        }
        self.flush();
    }

    fn print_progress(&mut self, frame: &str) {
        let _ = write!(self.out, "\r");
        if self.use_color {
            let _ = write!(self.out, "{ANSI_ERASE_LINE}");
        }
        self.styled(ANSI_DIM, frame);
        self.progress_visible = true;
        self.flush();
    }

    fn finish_progress(&mut self) {
        if !self.progress_visible {
            return;
        }
        if self.use_color {
            let _ = write!(self.out, "\r{ANSI_ERASE_LINE}");
        } else {
            let _ = writeln!(self.out);
        }
        self.progress_visible = false;
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.finish_progress();
        if self.use_color {
            let _ = writeln!(self.out, "{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            let _ = writeln!(self.out, "Error: {error}");
        }
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        self.finish_progress();
        let _ = writeln!(self.out, "{info}");
        self.flush();
    }
}
