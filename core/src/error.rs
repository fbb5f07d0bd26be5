//! Error types for parsing, binding and command dispatch.
//!
//! Each stage has its own error enum so callers can match on exactly the
//! failures a stage can produce. [`Error`] unifies them for the high-level
//! entry points in [`crate::Parser`].
//!
//! Coercion never produces an error: malformed values degrade to a default
//! (see [`crate::Coerce`]).

use thiserror::Error;

use crate::FieldKind;
use crate::validate::ValidationReport;

/// Structural problems found while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A positional argument followed an option or flag while parsing in
    /// arguments-first mode.
    #[error("positional argument '{argument}' found after option '{option}'")]
    PositionalAfterOption {
        /// The offending positional token.
        argument: String,
        /// The option recorded before it.
        option: String,
    },
    /// The same option name was given more than once.
    #[error("option '{0}' specified more than once")]
    DuplicateOption(String),
    /// The configured option prefix is empty.
    #[error("option prefix cannot be empty")]
    EmptyPrefix,
}

/// Command lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No mapping matches the parsed command (or composite command key).
    #[error("command not found: '{0}'")]
    NotFound(String),
}

/// Registry construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two mappings share the same command/subcommand key.
    #[error("duplicate command mapping: {0}")]
    DuplicateCommand(String),
    /// A mapping was registered with a blank command name.
    #[error("command name cannot be empty")]
    EmptyCommandName,
}

/// Failures while populating or validating a bound instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// The target type declares a field kind the binder cannot populate.
    #[error("field '{field}' has unsupported type {kind}: not implemented")]
    UnsupportedFieldType {
        /// Declared option name of the field.
        field: String,
        /// Kind of the offending field.
        kind: FieldKind,
    },
    /// One or more validation rules failed under
    /// [`ValidationPolicy::FailFast`](crate::ValidationPolicy::FailFast).
    #[error("validation failed:\n{0}")]
    Validation(ValidationReport),
}

/// Any error produced by the high-level entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Tokenizing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Command resolution failed.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// Binding or validation failed.
    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
