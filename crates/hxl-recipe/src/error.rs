//! Error types for recipes.

use hxl_core::HxlError;

/// Errors that can occur while reading, validating or applying a recipe.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// A pattern, predicate or tagspec in a step was rejected by the core.
    #[error(transparent)]
    Core(#[from] HxlError),

    /// JSON (de)serialization failed.
    #[error("JSON recipe error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization failed.
    #[error("YAML recipe error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A step needs a parameter that was not supplied.
    #[error("Step {step} requires parameter '{name}'.")]
    MissingParameter { step: usize, name: String },

    /// A parameter value could not be interpreted.
    #[error("Invalid value '{value}' for parameter '{name}'.")]
    InvalidParameter { name: String, value: String },

    /// A `filterNN` slot names a filter that does not exist.
    #[error("Step {step} names unknown filter '{name}'.")]
    UnknownFilter { step: usize, name: String },
}

impl RecipeError {
    pub(crate) fn missing(step: usize, name: impl Into<String>) -> Self {
        Self::MissingParameter {
            step,
            name: name.into(),
        }
    }

    pub(crate) fn invalid(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Result alias for recipe operations.
pub type Result<T> = std::result::Result<T, RecipeError>;
