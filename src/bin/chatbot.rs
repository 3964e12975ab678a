//! Interactive terminal chat with Gemini.
//!
//! # Usage
//!
//! ```bash
//! # GOOGLE_API_KEY must be set
//! chatbot
//!
//! # Pick a model and let a stopped request finish in the background
//! chatbot --model gemini-1.5-flash --stop-mode discard
//!
//! # Retry transient failures twice, with a 30 second timeout
//! chatbot --max-retries 2 --timeout-secs 30
//! ```
//!
//! Press Ctrl+C while a reply is generating to stop it. Type `/help` for
//! the slash commands.

use std::process::ExitCode;

use arrrg::CommandLine;
use log::error;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use chatbot::chat::{
    ChatArgs, ChatCommand, ChatConfig, PROGRESS_INTERVAL, PlainTextRenderer, ProgressIndicator,
    Renderer, SessionController, help_text, parse_command,
};
use chatbot::{API_KEY_ENV, CompletionGateway, GeminiGateway};

/// Main entry point for the chatbot application.
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let (args, _) = ChatArgs::from_command_line_relaxed("chatbot [OPTIONS]");
    let config = match ChatConfig::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let gateway = match config.gateway(None) {
        Ok(gateway) => gateway,
        Err(err) if err.is_configuration() => {
            eprintln!("🚨 API Key is missing! Set {API_KEY_ENV} in the environment.");
            error!("{err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("⚠️ Model loading error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(config, gateway).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ChatConfig, gateway: GeminiGateway) -> Result<(), Box<dyn std::error::Error>> {
    let model = gateway.model().to_string();
    let controller =
        SessionController::new(std::sync::Arc::new(gateway)).with_stop_mode(config.stop_mode);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C at the prompt is handled by rustyline; this only fires while a
    // reply is generating.
    let stopper = controller.clone();
    ctrlc::set_handler(move || {
        stopper.stop();
    })?;

    renderer.print_banner(&model);

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            controller.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::History => {
                            let history = controller.history();
                            if history.is_empty() {
                                renderer.print_info("(no messages yet)");
                            }
                            for turn in &history {
                                renderer.print_turn(turn);
                            }
                        }
                        ChatCommand::Status => {
                            let view = controller.view();
                            renderer.print_info(&format!(
                                "Model: {model}\nStatus: {}\nMessages: {}\nStop mode: {:?}",
                                view.status,
                                view.history.len(),
                                controller.stop_mode()
                            ));
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                generate(&controller, &mut renderer, line).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Submits `line` and animates the progress indicator until it resolves.
async fn generate<G: CompletionGateway + ?Sized>(
    controller: &SessionController<G>,
    renderer: &mut dyn Renderer,
    line: &str,
) {
    let submission = controller.submit(line);
    tokio::pin!(submission);
    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
    let mut progress = ProgressIndicator::new();
    loop {
        tokio::select! {
            result = &mut submission => {
                match result {
                    Ok(outcome) => renderer.print_outcome(&outcome),
                    Err(err) => renderer.print_error(&err.to_string()),
                }
                break;
            }
            _ = ticker.tick() => renderer.print_progress(progress.next_frame()),
        }
    }
}
