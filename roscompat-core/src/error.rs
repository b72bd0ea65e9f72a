//! Error types shared by every backend.

use crate::names::NameKind;
use std::path::PathBuf;
use thiserror::Error;

/// Dynamic error type that can be sent and shared between threads.
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for roscompat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bootstrapping or driving a node.
///
/// Only the fatal-at-startup class is ever returned by the bootstrap path.
/// Parameter reads report misses through `bool`/`Option`, and introspection,
/// time and parameter writes never fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The runtime (or the process) was already initialized.
    #[error("already initialized")]
    AlreadyInit,

    /// A node, namespace or topic name breaks the naming rules.
    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        /// What was being validated.
        kind: NameKind,
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A command-line argument could not be understood.
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The offending argument.
        arg: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Missing value after a flag inside a `--ros-args` section.
    #[error("missing value for argument '{0}'")]
    MissingArgumentValue(String),

    /// A parameter file could not be parsed.
    #[error("failed to parse parameter file '{path}': {reason}")]
    ParamFile {
        /// Path of the file.
        path: PathBuf,
        /// Why parsing failed.
        reason: String,
    },

    /// The execution context behind a handle no longer exists.
    #[error("the execution context has been shut down")]
    ContextShutdown,

    /// IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            arg: arg.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::InvalidName`].
    pub fn invalid_name(kind: NameKind, name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidName {
            kind,
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
