use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Represents a Gemini model identifier.
///
/// This can be a predefined model or a custom string value for models
/// released after this crate was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or tuned models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 1.5 Pro
    #[serde(rename = "gemini-1.5-pro")]
    Gemini15Pro,

    /// Gemini 1.5 Flash
    #[serde(rename = "gemini-1.5-flash")]
    Gemini15Flash,

    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
}

impl KnownModel {
    /// All known models, in the order they are listed to users.
    pub const ALL: [KnownModel; 5] = [
        KnownModel::Gemini15Pro,
        KnownModel::Gemini15Flash,
        KnownModel::Gemini20Flash,
        KnownModel::Gemini25Pro,
        KnownModel::Gemini25Flash,
    ];

    /// The identifier used in API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini15Pro => "gemini-1.5-pro",
            KnownModel::Gemini15Flash => "gemini-1.5-flash",
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gemini15Pro)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The API also accepts the resource form `models/<id>`.
        let id = s.trim().strip_prefix("models/").unwrap_or(s.trim());
        KnownModel::ALL
            .into_iter()
            .find(|model| model.as_str() == id)
            .ok_or_else(|| Error::configuration(format!("unknown model: {s}")))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(model.trim().to_string()),
        }
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::from(model.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Gemini15Pro);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-1.5-pro""#);
    }

    #[test]
    fn model_deserialization() {
        let model: Model = serde_json::from_str(r#""gemini-1.5-flash""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini15Flash));

        let model: Model = serde_json::from_str(r#""gemini-exp-1206""#).unwrap();
        assert_eq!(model, Model::Custom("gemini-exp-1206".to_string()));
    }

    #[test]
    fn from_str_recognizes_known_and_resource_names() {
        assert_eq!(
            Model::from("gemini-2.0-flash"),
            Model::Known(KnownModel::Gemini20Flash)
        );
        assert_eq!(
            Model::from("models/gemini-2.5-pro"),
            Model::Known(KnownModel::Gemini25Pro)
        );
        assert_eq!(
            Model::from("tunedModels/my-model"),
            Model::Custom("tunedModels/my-model".to_string())
        );
    }

    #[test]
    fn unknown_model_is_a_configuration_error() {
        let err = "gpt-4o".parse::<KnownModel>().unwrap_err();
        assert!(err.is_configuration());
        assert!(!err.is_validation());
    }

    #[test]
    fn default_is_pro() {
        assert_eq!(Model::default().to_string(), "gemini-1.5-pro");
    }
}
