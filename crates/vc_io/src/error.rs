use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

// -----------------------------------------------------------------------------
// ErrorKind

/// The coarse classification of a [`SerialError`].
///
/// This is what an [`ErrorHandler`](crate::ErrorHandler) receives, and what
/// tests usually match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The stream ended before the requested bytes were available.
    UnexpectedEof,
    /// The transport failed for another reason.
    Io,
    /// A class schema was required but the provider has none.
    SchemaNotFound,
    /// The stored class version cannot be mapped onto the live layout.
    VersionMismatch,
    /// A class name could not be resolved through the registry.
    UnknownClassIdentifier,
    /// A value, header or stored type does not have the expected type.
    TypeMismatch,
    /// The operation is not supported by this reflector.
    NotImplemented,
    /// The bytes are structurally invalid (bad bool, utf-8, tag or index).
    InvalidData,
    /// A length prefix or the nesting depth exceeds the configured [`Limits`](crate::Limits).
    LimitExceeded,
}

impl ErrorKind {
    /// Returns the stable name of this kind.
    ///
    /// ```
    /// use vc_io::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::UnexpectedEof.as_str(), "UnexpectedEOF");
    /// assert_eq!(ErrorKind::Io.as_str(), "IOError");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnexpectedEof => "UnexpectedEOF",
            Self::Io => "IOError",
            Self::SchemaNotFound => "SchemaNotFound",
            Self::VersionMismatch => "VersionMismatch",
            Self::UnknownClassIdentifier => "UnknownClassIdentifier",
            Self::TypeMismatch => "TypeMismatch",
            Self::NotImplemented => "NotImplemented",
            Self::InvalidData => "InvalidData",
            Self::LimitExceeded => "LimitExceeded",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// SerialError

/// Error type of every serialization, deserialization and dump operation.
///
/// Operations stop at the first failure and hand it upward unchanged,
/// use [`SerialError::kind`] to classify it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerialError {
    #[error("unexpected end of stream while reading {needed} bytes")]
    UnexpectedEof { needed: usize },

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("no schema available for class `{class}`")]
    SchemaNotFound { class: String },

    #[error("class `{class}` is stored as version {found}, expected version {expected}")]
    VersionMismatch {
        class: String,
        expected: u32,
        found: u32,
    },

    #[error("stored layout of class `{class}` lacks mandatory field `{field}`")]
    MissingMandatoryField { class: String, field: String },

    #[error("unknown class identifier `{0}`")]
    UnknownClassIdentifier(String),

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
    },

    #[error("`{0}` is not implemented")]
    NotImplemented(Cow<'static, str>),

    #[error("invalid data: {0}")]
    InvalidData(Cow<'static, str>),

    #[error("{what} of {len} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        len: usize,
        limit: usize,
    },

    #[error("{inner} (at {path})")]
    Context {
        path: String,
        #[source]
        inner: Box<SerialError>,
    },
}

/// Result alias used across the `vc_archive` crates.
pub type SerialResult<T> = Result<T, SerialError>;

impl SerialError {
    /// Returns the [`ErrorKind`] of this error, looking through [`SerialError::Context`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Self::Io(_) => ErrorKind::Io,
            Self::SchemaNotFound { .. } => ErrorKind::SchemaNotFound,
            Self::VersionMismatch { .. } | Self::MissingMandatoryField { .. } => {
                ErrorKind::VersionMismatch
            }
            Self::UnknownClassIdentifier(_) => ErrorKind::UnknownClassIdentifier,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::InvalidData(_) => ErrorKind::InvalidData,
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::Context { inner, .. } => inner.kind(),
        }
    }

    /// Returns the innermost error, without any [`SerialError::Context`] wrapper.
    pub fn root(&self) -> &SerialError {
        match self {
            Self::Context { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Shorthand for [`SerialError::TypeMismatch`].
    #[cold]
    pub fn type_mismatch(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Shorthand for [`SerialError::InvalidData`].
    #[cold]
    pub fn invalid_data(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidData(message.into())
    }

    /// Shorthand for [`SerialError::NotImplemented`].
    #[cold]
    pub fn not_implemented(operation: impl Into<Cow<'static, str>>) -> Self {
        Self::NotImplemented(operation.into())
    }

    /// Wraps `self` with a decode path, unless it already carries one.
    ///
    /// The innermost frame sees the deepest path, so the first wrap wins.
    pub fn with_path(self, path: impl FnOnce() -> String) -> Self {
        match self {
            Self::Context { .. } => self,
            inner => Self::Context {
                path: path(),
                inner: Box::new(inner),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ErrorKind, SerialError};

    #[test]
    fn kind_sees_through_context() {
        let err = SerialError::UnknownClassIdentifier("Ghost".into())
            .with_path(|| "Scene -> Shape".into());

        assert_eq!(err.kind(), ErrorKind::UnknownClassIdentifier);
        assert!(matches!(err.root(), SerialError::UnknownClassIdentifier(name) if name == "Ghost"));
        assert_eq!(
            err.to_string(),
            "unknown class identifier `Ghost` (at Scene -> Shape)"
        );
    }

    #[test]
    fn first_path_wins() {
        let err = SerialError::invalid_data("bad")
            .with_path(|| "A -> B".into())
            .with_path(|| "A".into());

        match err {
            SerialError::Context { path, .. } => assert_eq!(path, "A -> B"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mandatory_field_is_a_version_problem() {
        let err = SerialError::MissingMandatoryField {
            class: "Player".into(),
            field: "id".into(),
        };
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
    }
}
