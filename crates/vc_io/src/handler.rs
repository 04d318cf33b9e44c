use crate::{ErrorKind, SerialError};

// -----------------------------------------------------------------------------
// ErrorHandler

/// Receives failures of top-level operations.
///
/// Entry points call the handler once per failed operation, right before
/// returning the error to their caller. Inner layers only propagate.
pub trait ErrorHandler {
    /// Reports a failure of the given kind.
    fn error(&mut self, kind: ErrorKind, message: &str);

    /// Reports an operation the involved reflector does not support.
    fn not_implemented(&mut self, operation: &str) {
        self.error(
            ErrorKind::NotImplemented,
            &format!("`{operation}` is not implemented"),
        );
    }

    /// Dispatches `err` to [`error`](Self::error) or
    /// [`not_implemented`](Self::not_implemented).
    fn report(&mut self, err: &SerialError) {
        match err.root() {
            SerialError::NotImplemented(operation) => self.not_implemented(operation),
            _ => self.error(err.kind(), &err.to_string()),
        }
    }
}

impl<H: ErrorHandler + ?Sized> ErrorHandler for &mut H {
    #[inline]
    fn error(&mut self, kind: ErrorKind, message: &str) {
        (**self).error(kind, message);
    }

    #[inline]
    fn not_implemented(&mut self, operation: &str) {
        (**self).not_implemented(operation);
    }
}

// -----------------------------------------------------------------------------
// LogErrorHandler

/// Forwards every report to the [`log`] facade at `error` level.
///
/// This is the handler used when none is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn error(&mut self, kind: ErrorKind, message: &str) {
        log::error!("{kind}: {message}");
    }

    fn not_implemented(&mut self, operation: &str) {
        log::error!("{}: `{operation}`", ErrorKind::NotImplemented);
    }
}

// -----------------------------------------------------------------------------
// ErrorLog

/// Collects reports in memory.
///
/// ```
/// use vc_io::{ErrorHandler, ErrorKind, ErrorLog};
///
/// let mut log = ErrorLog::default();
/// log.error(ErrorKind::SchemaNotFound, "no schema for `Player`");
///
/// assert_eq!(log.kinds(), [ErrorKind::SchemaNotFound]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ErrorLog {
    entries: Vec<(ErrorKind, String)>,
}

impl ErrorLog {
    /// Returns all reports in arrival order.
    #[inline]
    pub fn entries(&self) -> &[(ErrorKind, String)] {
        &self.entries
    }

    /// Returns the kinds of all reports in arrival order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.entries.iter().map(|(kind, _)| *kind).collect()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl ErrorHandler for ErrorLog {
    fn error(&mut self, kind: ErrorKind, message: &str) {
        self.entries.push((kind, message.to_owned()));
    }

    fn not_implemented(&mut self, operation: &str) {
        self.entries
            .push((ErrorKind::NotImplemented, operation.to_owned()));
    }
}

// -----------------------------------------------------------------------------
// Tests
