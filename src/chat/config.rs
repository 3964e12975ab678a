//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration used to build the gateway and the session controller.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::chat::session::StopMode;
use crate::client::Gemini;
use crate::error::{Error, Result};
use crate::gateway::{GeminiGateway, RetryPolicy};
use crate::types::{GenerationConfig, Model};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Command-line arguments for the chatbot tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-1.5-pro)", "MODEL")]
    pub model: Option<String>,

    /// System instruction sent with every prompt.
    #[arrrg(optional, "System instruction for the model", "PROMPT")]
    pub system: Option<String>,

    /// Sampling temperature.
    #[arrrg(optional, "Sampling temperature between 0.0 and 2.0", "TEMP")]
    pub temperature: Option<String>,

    /// Maximum tokens per reply.
    #[arrrg(optional, "Max output tokens per reply", "TOKENS")]
    pub max_output_tokens: Option<u32>,

    /// Request timeout.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Retries for transient failures.
    #[arrrg(optional, "Retries for transient failures (default: 0)", "N")]
    pub max_retries: Option<u32>,

    /// What stop does to an in-flight request.
    #[arrrg(optional, "Stop behavior: abort or discard (default: abort)", "MODE")]
    pub stop_mode: Option<String>,

    /// Override for the API endpoint.
    #[arrrg(optional, "API base URL", "URL")]
    pub base_url: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating replies.
    pub model: Model,

    /// Optional system instruction.
    pub system_prompt: Option<String>,

    /// Optional sampling temperature.
    pub temperature: Option<f32>,

    /// Optional cap on reply length.
    pub max_output_tokens: Option<u32>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Retries for transient gateway failures.
    pub max_retries: u32,

    /// What stop does to an in-flight request.
    pub stop_mode: StopMode,

    /// Optional override for the API endpoint.
    pub base_url: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-1.5-pro
    /// - Timeout: 60 seconds
    /// - Retries: none
    /// - Stop: abort the in-flight request
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            system_prompt: None,
            temperature: None,
            max_output_tokens: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            stop_mode: StopMode::default(),
            base_url: None,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system instruction.
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the reply length cap.
    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the stop mode.
    pub fn with_stop_mode(mut self, stop_mode: StopMode) -> Self {
        self.stop_mode = stop_mode;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Builds a Gemini gateway from this configuration.
    ///
    /// `api_key` falls back to the `GOOGLE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no credential is available.
    pub fn gateway(&self, api_key: Option<String>) -> Result<GeminiGateway> {
        let client = Gemini::with_options(api_key, self.base_url.clone(), Some(self.timeout))?;
        Ok(GeminiGateway::new(client, self.model.clone())
            .with_system_instruction(self.system_prompt.clone())
            .with_generation_config(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            })
            .with_retry_policy(RetryPolicy::none().with_max_retries(self.max_retries)))
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let temperature = args
            .temperature
            .as_deref()
            .map(parse_temperature)
            .transpose()?;
        let stop_mode = args
            .stop_mode
            .as_deref()
            .map(str::parse::<StopMode>)
            .transpose()?
            .unwrap_or_default();
        if args.timeout_secs == Some(0) {
            return Err(Error::configuration("--timeout-secs must be positive"));
        }

        Ok(ChatConfig {
            model: args.model.map(Model::from).unwrap_or_default(),
            system_prompt: args.system,
            temperature,
            max_output_tokens: args.max_output_tokens,
            timeout: args
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            max_retries: args.max_retries.unwrap_or(0),
            stop_mode,
            base_url: args.base_url,
            use_color: !args.no_color,
        })
    }
}

fn parse_temperature(value: &str) -> Result<f32> {
    let parsed: f32 = value.trim().parse().map_err(|_| {
        Error::configuration(format!("--temperature expects a number, got '{value}'"))
    })?;
    if parsed.is_finite() && (0.0..=2.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(Error::configuration(
            "--temperature expects a value between 0.0 and 2.0",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, Model::Known(KnownModel::Gemini15Pro));
        assert!(config.system_prompt.is_none());
        assert!(config.temperature.is_none());
        assert!(config.max_output_tokens.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.stop_mode, StopMode::Abort);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("gemini-1.5-flash".to_string()),
            system: Some("You are helpful.".to_string()),
            temperature: Some("0.7".to_string()),
            max_output_tokens: Some(512),
            timeout_secs: Some(15),
            max_retries: Some(2),
            stop_mode: Some("discard".to_string()),
            base_url: Some("http://localhost:8080/".to_string()),
            no_color: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.model, Model::Known(KnownModel::Gemini15Flash));
        assert_eq!(config.system_prompt.as_deref(), Some("You are helpful."));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_output_tokens, Some(512));
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.stop_mode, StopMode::Discard);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/"));
        assert!(!config.use_color);
    }

    #[test]
    fn invalid_args_are_configuration_errors() {
        let args = ChatArgs {
            temperature: Some("hot".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_configuration());

        let args = ChatArgs {
            temperature: Some("3.5".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_configuration());

        let args = ChatArgs {
            stop_mode: Some("sometimes".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_configuration());

        let args = ChatArgs {
            timeout_secs: Some(0),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_configuration());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model(Model::Known(KnownModel::Gemini20Flash))
            .with_system_prompt("Test prompt".to_string())
            .with_temperature(Some(0.2))
            .with_max_output_tokens(Some(128))
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(3)
            .with_stop_mode(StopMode::Discard)
            .without_color();

        assert_eq!(config.model, Model::Known(KnownModel::Gemini20Flash));
        assert_eq!(config.system_prompt, Some("Test prompt".to_string()));
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.max_output_tokens, Some(128));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.stop_mode, StopMode::Discard);
        assert!(!config.use_color);
    }

    #[test]
    fn gateway_uses_configured_model() {
        let config = ChatConfig::new().with_model(Model::Known(KnownModel::Gemini25Flash));
        let gateway = config.gateway(Some("test-key".to_string())).unwrap();
        assert_eq!(gateway.model(), &Model::Known(KnownModel::Gemini25Flash));
    }

    #[test]
    fn gateway_requires_a_credential() {
        let err = ChatConfig::new()
            .gateway(Some(String::new()))
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
