//! Error types for the comparison engine.

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied input that violates a documented precondition.
    Precondition,
    /// The computation itself could not be completed.
    Analysis,
}

/// The main error type for comparison operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Fewer than two roles were supplied.
    #[error("At least 2 roles are required for a comparison, got {found}")]
    InsufficientRoles {
        /// Number of roles actually supplied.
        found: usize,
    },

    /// More roles were supplied than the configured maximum allows.
    #[error("Too many roles for a comparison: got {found}, maximum is {max}")]
    TooManyRoles {
        /// Number of roles actually supplied.
        found: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The same role id appears more than once in the selection.
    #[error("Role '{0}' appears more than once in the selection")]
    DuplicateRole(String),

    /// A role lists the same permission triple more than once.
    #[error("Role '{role_id}' contains duplicate permission '{permission}'")]
    DuplicatePermission {
        /// Offending role.
        role_id: String,
        /// The duplicated permission, rendered as `action:resource:scope`.
        permission: String,
    },

    /// A role id was referenced that is not part of the comparison.
    #[error("Role '{0}' is not part of this comparison")]
    UnknownRole(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Malformed permission triple.
    #[error("Invalid permission format: {0}")]
    InvalidPermission(String),

    /// Internal computation failure.
    #[error("Analysis failed: {message}")]
    Analysis {
        /// What the engine was doing when it failed.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl Error {
    /// Create an analysis error wrapping an underlying cause.
    pub fn analysis<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Analysis {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Classify this error as a precondition or analysis failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InsufficientRoles { .. }
            | Error::TooManyRoles { .. }
            | Error::DuplicateRole(_)
            | Error::DuplicatePermission { .. }
            | Error::UnknownRole(_)
            | Error::InvalidConfiguration(_) => ErrorKind::Precondition,
            Error::InvalidPermission(_) | Error::Analysis { .. } => ErrorKind::Analysis,
        }
    }

    /// Returns true if the caller violated a precondition.
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }

    /// Stable variant name, used as a telemetry key.
    pub fn name(&self) -> &'static str {
        match self {
            Error::InsufficientRoles { .. } => "InsufficientRoles",
            Error::TooManyRoles { .. } => "TooManyRoles",
            Error::DuplicateRole(_) => "DuplicateRole",
            Error::DuplicatePermission { .. } => "DuplicatePermission",
            Error::UnknownRole(_) => "UnknownRole",
            Error::InvalidConfiguration(_) => "InvalidConfiguration",
            Error::InvalidPermission(_) => "InvalidPermission",
            Error::Analysis { .. } => "Analysis",
        }
    }
}

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, Error>;
