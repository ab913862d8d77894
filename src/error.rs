//! # Errors
//!
//! Error types returned by the object store and by every primitive.
//!
//! Store failures are always wrapped with a static description of the step
//! that failed ("cannot get object", "cannot update managed resource", ...)
//! so callers and logs can tell phases apart. [`Error::kind`] classifies a
//! failure without parsing messages.

use crate::resource::ObjectKey;
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The object does not exist in the store
    NotFound,
    /// A full update carried a stale resource version
    Conflict,
    /// The caller cannot prove it controls the object it tried to write or read
    OwnershipViolation,
    /// An apply option rejected the operation
    OptionVeto,
    /// Network, timeout or serialization failure against the store
    Transport,
    /// The object lacks metadata a primitive requires (programmer error)
    InvalidObject,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::OwnershipViolation => "ownership-violation",
            ErrorKind::OptionVeto => "option-veto",
            ErrorKind::Transport => "transport",
            ErrorKind::InvalidObject => "invalid-object",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an [`ObjectStore`](crate::resource::ObjectStore)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: String, key: ObjectKey },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid object: {0}")]
    InvalidObject(String),
}

impl StoreError {
    /// Map a kube client error onto the store taxonomy
    ///
    /// 404 becomes `NotFound`, 409 becomes `Conflict`, everything else is a
    /// transport failure.
    #[must_use]
    pub fn from_kube(kind: &str, key: &ObjectKey, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => StoreError::NotFound {
                kind: kind.to_string(),
                key: key.clone(),
            },
            kube::Error::Api(response) if response.code == 409 => {
                StoreError::Conflict(response.message)
            }
            kube::Error::SerdeError(e) => StoreError::Serialization(e),
            other => StoreError::Transport(other.to_string()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::Transport(_) | StoreError::Serialization(_) => ErrorKind::Transport,
            StoreError::InvalidObject(_) => ErrorKind::InvalidObject,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Error returned by the primitives
#[derive(Debug, Error)]
pub enum Error {
    /// A store call failed during the named step
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// A nested primitive failed during the named step
    #[error("{context}: {source}")]
    Wrapped {
        context: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    OwnershipViolation(String),

    #[error("{0}")]
    OptionVeto(String),

    #[error("invalid object: {0}")]
    InvalidObject(String),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Store { source, .. } => source.kind(),
            Error::Wrapped { source, .. } => source.kind(),
            Error::OwnershipViolation(_) => ErrorKind::OwnershipViolation,
            Error::OptionVeto(_) => ErrorKind::OptionVeto,
            Error::InvalidObject(_) => ErrorKind::InvalidObject,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Whether re-running the whole operation may succeed without operator action
    ///
    /// Ownership violations, vetoes and invalid objects repeat identically on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::Transport)
    }

    /// Wrap this error with the description of an enclosing step
    #[must_use]
    pub fn context(self, context: &'static str) -> Self {
        Error::Wrapped {
            context,
            source: Box::new(self),
        }
    }
}

/// Attach a static step description to a failed result
pub trait ResultExt<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, StoreError> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Store { context, source })
    }
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}

/// Treat a not-found failure as success
///
/// # Errors
///
/// Returns every error that is not `NotFound` unchanged.
pub fn ignore_not_found(result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}
