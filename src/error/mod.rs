use std::fmt::Display;
use thiserror::Error;

use crate::builder::{BuilderId, Stage};

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::ErrorExt;

/// The unified error type for templa.
///
/// Errors raised by collaborators (record construction, the template engine,
/// user supplied steps) are carried transparently: their `Display` and
/// `source()` are exactly those of the original error.
#[derive(Error, Debug)]
pub enum TemplaError {
    #[error("[E{:04}] Config data has not been loaded; call load_config first", ErrorCode::CONFIG_DATA_NOT_LOADED)]
    ConfigDataNotLoaded,

    #[error(
        "[E{:04}] Builder target belongs to builder {found}, not {expected}",
        ErrorCode::BUILDER_NOT_SAME_INSTANCE
    )]
    NotSameBuilderInstance { expected: BuilderId, found: BuilderId },

    #[error(
        "[E{:04}] Cannot {operation}: builder is at stage {current}",
        ErrorCode::BUILDER_STAGE_VIOLATION
    )]
    StageViolation {
        current: Stage,
        operation: &'static str,
    },

    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Constructing the config data record from the raw mapping failed.
    #[error(transparent)]
    ConfigData(serde_json::Error),

    #[error(transparent)]
    Template(#[from] tera::Error),

    /// A `BuildSteps::extend_render_context` hook failed.
    #[error(transparent)]
    Context(anyhow::Error),

    /// A `BuildSteps::parse_rendered_template` step failed.
    #[error(transparent)]
    Parse(anyhow::Error),

    /// A `BuildSteps::build_processed` step failed.
    #[error(transparent)]
    Build(anyhow::Error),
}

impl TemplaError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to a configuration error. Other variants already
    /// carry their origin and are returned untouched.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        if let Self::Config { source: src, .. } = &mut self {
            *src = Some(source.into());
        }
        self
    }

    /// Add context to a configuration error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        if let Self::Config { message, .. } = &mut self {
            *message = format!("{}: {}", message, context);
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::ConfigDataNotLoaded => ErrorCode::CONFIG_DATA_NOT_LOADED,
            Self::NotSameBuilderInstance { .. } => ErrorCode::BUILDER_NOT_SAME_INSTANCE,
            Self::StageViolation { .. } => ErrorCode::BUILDER_STAGE_VIOLATION,
            Self::Config { code, .. } => *code,
            Self::ConfigData(_) => ErrorCode::CONFIG_DATA_INVALID,
            Self::Template(_) => ErrorCode::TEMPLATE_RENDER_FAILED,
            Self::Context(_) => ErrorCode::STEP_CONTEXT_FAILED,
            Self::Parse(_) => ErrorCode::STEP_PARSE_FAILED,
            Self::Build(_) => ErrorCode::STEP_BUILD_FAILED,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigData(err) => format!("Invalid config data: {}", err),
            Self::Template(err) => format!("Template error: {}", err),
            Self::Context(err) => format!("Render context hook failed: {}", err),
            Self::Parse(err) => format!("Parsing rendered template failed: {}", err),
            Self::Build(err) => format!("Build step failed: {}", err),
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            other => format!("{} ({})", describe_error_code(other.code()), other),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Only a missing `load_config` call can be fixed by the caller and
    /// retried against the same object.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConfigDataNotLoaded)
    }

    /// The original error raised by a user supplied step, if any.
    pub fn step_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Context(err) | Self::Parse(err) | Self::Build(err) => Some(err),
            _ => None,
        }
    }
}

/// Type alias for Results using TemplaError
pub type Result<T> = std::result::Result<T, TemplaError>;
