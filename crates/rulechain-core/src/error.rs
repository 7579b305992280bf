//! Error types for the rulechain core library
//!
//! This module defines the error handling system for rulechain, using
//! thiserror for the error definitions and anyhow for optional causes.
//!
//! Aborting a chain is not an error: closures and capability objects signal
//! it through [`crate::Flow::Abort`], which the transformer consumes.

use thiserror::Error;

/// Main error type for rulechain operations
#[derive(Error, Debug)]
pub enum Error {
    /// A named step does not resolve to any registered invocable
    #[error("Function {name} not callable.")]
    NotCallable { name: String },

    /// The guard predicate rejected a named step
    #[error("Function {name} is not allowed to be called.")]
    ExecutionNotAllowed {
        name: String,
        field: Option<String>,
    },

    /// A function or receiver method rejected its arguments
    #[error("Invalid arguments for {function}: {message}")]
    InvalidArguments { function: String, message: String },

    /// A receiver does not implement the delegated method
    #[error("Method {method} is not supported by {type_name}")]
    UnsupportedMethod { type_name: String, method: String },

    /// A type constructor could not build an instance from the value
    #[error("Cannot construct {type_name}: {message}")]
    Construction { type_name: String, message: String },

    /// Invalid registry or rule configuration
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON conversion errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid arguments error
    pub fn invalid_arguments(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a construction error
    pub fn construction(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Name of the step this error is attributed to, if any
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Error::NotCallable { name } | Error::ExecutionNotAllowed { name, .. } => Some(name),
            Error::InvalidArguments { function, .. } => Some(function),
            Error::UnsupportedMethod { method, .. } => Some(method),
            Error::Construction { type_name, .. } => Some(type_name),
            Error::Configuration { .. } | Error::Json { .. } => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
