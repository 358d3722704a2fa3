//! Error types for the binding runtime.
//!
//! Every failure is fatal to the operation that triggered it. Nothing in the
//! crate catches or retries; a failing write, compile pass or input event
//! hands the error straight back to the host.

use thiserror::Error;

use crate::compiler::DirectiveKind;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while wrapping data, compiling a tree or propagating writes.
#[derive(Debug, Error)]
pub enum Error {
    /// An attribute carried the directive prefix but its name is not a known
    /// directive kind.
    #[error("unknown directive `{prefix}{name}`")]
    UnknownDirective { prefix: String, name: String },

    /// The directive kind exists but the registry has no handler for it.
    #[error("no handler registered for directive `{0}`")]
    UnregisteredDirective(DirectiveKind),

    /// A path segment was absent, or an intermediate value was not an object.
    #[error("cannot resolve `{path}`: no property `{segment}`")]
    PathResolution { path: String, segment: String },

    /// The binding expression is empty or has an empty segment.
    #[error("invalid binding path `{0}`")]
    InvalidPath(String),

    /// The root selector did not match a node, or no resolver was supplied.
    #[error("root selector `{0}` did not resolve to a node")]
    UnresolvedRoot(String),

    /// The operation needs a reactive model but the data was left plain.
    #[error("model is not reactive; it was created without a root")]
    NotReactive,

    /// The markup reader rejected its input.
    #[error("markup error at byte {offset}: {reason}")]
    Markup { offset: usize, reason: String },

    /// Configuration could not be decoded.
    #[error("invalid configuration: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// Configuration decoded but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn missing(path: &str, segment: &str) -> Self {
        Self::PathResolution {
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }

    pub(crate) fn markup(offset: usize, reason: impl Into<String>) -> Self {
        Self::Markup {
            offset,
            reason: reason.into(),
        }
    }
}
