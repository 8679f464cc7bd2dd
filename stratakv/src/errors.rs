use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for store operations.
///
/// This enum represents all failure categories a store, decorator, or the
/// store factory can produce. Callers see one consistent taxonomy regardless
/// of which backend is underneath, enabling backend-agnostic error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use stratakv::errors::{StrataError, ErrorKind, StrataResult};
///
/// fn example() -> StrataResult<()> {
///     Err(StrataError::new("Key not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Key lookup errors - raised by get/open when a key is absent.
    // Never raised by delete (idempotent) or put.
    /// The requested key was not found in the store
    NotFound,

    // Key validation errors - raised by decorators and backends before
    // any data is touched
    /// The key is malformed for this store or decorator
    InvalidKey,
    /// Error encoding or decoding a key or value
    EncodingError,

    // Decorator errors
    /// A mapped key coming back from an inner store violated a decorator's
    /// structural precondition - indicates an internal bug, not a user error
    InvariantViolation,
    /// The operation is not exposed by this store handle
    UnsupportedOperation,

    // Configuration errors - raised synchronously at factory-call time
    /// Generic configuration error (bad parameter, malformed URL, bad chain)
    ConfigurationError,
    /// Decorator chains were supplied through both the legacy embedded form
    /// and the explicit wrap parameter
    ConfigurationConflict,
    /// No store constructor is registered for the type identifier
    UnknownStoreType,
    /// No decorator constructor is registered for the identifier
    UnknownDecorator,

    // Backend and IO errors - anything surfaced by a backend adapter,
    // wrapped without masking the backend-specific message
    /// Error from a storage backend
    BackendError,
    /// Generic IO error
    IOError,
    /// The backing file was not found
    FileNotFound,
    /// Permission denied for a backend operation
    PermissionDenied,

    // Generic/Internal errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidKey => write!(f, "Invalid key"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InvariantViolation => write!(f, "Invariant violation"),
            ErrorKind::UnsupportedOperation => write!(f, "Unsupported operation"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::ConfigurationConflict => write!(f, "Configuration conflict"),
            ErrorKind::UnknownStoreType => write!(f, "Unknown store type"),
            ErrorKind::UnknownDecorator => write!(f, "Unknown decorator"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom error type for all store operations.
///
/// `StrataError` encapsulates the error message, kind, and optional cause.
/// It supports error chaining and backtraces for debugging. Backend errors
/// are wrapped with their original message preserved as the cause.
///
/// # Examples
///
/// ```rust,ignore
/// use stratakv::errors::{StrataError, ErrorKind};
///
/// // Create a simple error
/// let err = StrataError::new("Key not found", ErrorKind::NotFound);
///
/// // Create an error with a cause
/// let cause = StrataError::new("disk unreadable", ErrorKind::IOError);
/// let err = StrataError::new_with_cause("get failed", ErrorKind::BackendError, cause);
/// ```
///
/// # Type alias
///
/// The `StrataResult<T>` type alias is equivalent to `Result<T, StrataError>`
/// and is used throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct StrataError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StrataError>>,
    backtrace: Arc<Backtrace>,
}

impl StrataError {
    /// Creates a new `StrataError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `StrataError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StrataError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `StrataError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved, so a
    /// backend-specific message is never masked by the wrapping.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `StrataError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StrataError) -> Self {
        StrataError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StrataError> {
        self.cause.as_deref()
    }
}

impl Display for StrataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for StrataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for StrataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for store operations.
///
/// `StrataResult<T>` is shorthand for `Result<T, StrataError>`.
/// All fallible store operations return this type.
pub type StrataResult<T> = Result<T, StrataError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IOError,
        };
        StrataError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<std::string::FromUtf8Error> for StrataError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        StrataError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for StrataError {
    fn from(msg: String) -> Self {
        StrataError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for StrataError {
    fn from(msg: &str) -> Self {
        StrataError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strata_error_new_creates_error() {
        let error = StrataError::new("An error occurred", ErrorKind::IOError);
        assert_eq!(error.message, "An error occurred");
        assert_eq!(error.error_kind, ErrorKind::IOError);
        assert!(error.cause.is_none());
    }

    #[test]
    fn strata_error_new_with_cause_creates_error() {
        let cause = StrataError::new("disk unreadable", ErrorKind::IOError);
        let error = StrataError::new_with_cause("get failed", ErrorKind::BackendError, cause);
        assert_eq!(error.message, "get failed");
        assert_eq!(error.error_kind, ErrorKind::BackendError);
        assert!(error.cause.is_some());
    }

    #[test]
    fn strata_error_message_returns_message() {
        let error = StrataError::new("An error occurred", ErrorKind::IOError);
        assert_eq!(error.message(), "An error occurred");
    }

    #[test]
    fn strata_error_kind_returns_kind() {
        let error = StrataError::new("An error occurred", ErrorKind::IOError);
        assert_eq!(error.kind(), &ErrorKind::IOError);
    }

    #[test]
    fn strata_error_cause_returns_none_when_no_cause() {
        let error = StrataError::new("An error occurred", ErrorKind::IOError);
        assert!(error.cause().is_none());
    }

    #[test]
    fn strata_error_display_formats_correctly() {
        let error = StrataError::new("An error occurred", ErrorKind::IOError);
        let formatted = format!("{}", error);
        assert_eq!(formatted, "An error occurred");
    }

    #[test]
    fn strata_error_debug_formats_with_cause() {
        let cause = StrataError::new("root cause", ErrorKind::IOError);
        let error = StrataError::new_with_cause("wrapper", ErrorKind::BackendError, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("wrapper"));
        assert!(formatted.contains("Caused by:"));
        assert!(formatted.contains("root cause"));
    }

    #[test]
    fn strata_error_source_returns_cause() {
        let cause = StrataError::new("root cause", ErrorKind::IOError);
        let error = StrataError::new_with_cause("wrapper", ErrorKind::BackendError, cause);
        assert!(error.source().is_some());
    }

    #[test]
    fn strata_error_source_returns_none_when_no_cause() {
        let error = StrataError::new("An error occurred", ErrorKind::IOError);
        assert!(error.source().is_none());
    }

    // Test key lookup errors
    #[test]
    fn test_not_found_errors() {
        let not_found = StrataError::new("key absent", ErrorKind::NotFound);
        assert_eq!(not_found.kind(), &ErrorKind::NotFound);
    }

    // Test key validation errors
    #[test]
    fn test_key_validation_errors() {
        let invalid = StrataError::new("key contains '/'", ErrorKind::InvalidKey);
        assert_eq!(invalid.kind(), &ErrorKind::InvalidKey);

        let encoding = StrataError::new("bad percent escape", ErrorKind::EncodingError);
        assert_eq!(encoding.kind(), &ErrorKind::EncodingError);
    }

    // Test decorator errors
    #[test]
    fn test_decorator_errors() {
        let invariant = StrataError::new("missing namespace prefix", ErrorKind::InvariantViolation);
        assert_eq!(invariant.kind(), &ErrorKind::InvariantViolation);

        let unsupported = StrataError::new("put is not supported", ErrorKind::UnsupportedOperation);
        assert_eq!(unsupported.kind(), &ErrorKind::UnsupportedOperation);
    }

    // Test configuration errors
    #[test]
    fn test_configuration_errors() {
        let generic = StrataError::new("bad parameter", ErrorKind::ConfigurationError);
        assert_eq!(generic.kind(), &ErrorKind::ConfigurationError);

        let conflict = StrataError::new("both chain forms given", ErrorKind::ConfigurationConflict);
        assert_eq!(conflict.kind(), &ErrorKind::ConfigurationConflict);

        let unknown_type = StrataError::new("no such type", ErrorKind::UnknownStoreType);
        assert_eq!(unknown_type.kind(), &ErrorKind::UnknownStoreType);

        let unknown_deco = StrataError::new("no such decorator", ErrorKind::UnknownDecorator);
        assert_eq!(unknown_deco.kind(), &ErrorKind::UnknownDecorator);
    }

    // Test backend/IO errors
    #[test]
    fn test_backend_io_errors() {
        let backend = StrataError::new("backend exploded", ErrorKind::BackendError);
        assert_eq!(backend.kind(), &ErrorKind::BackendError);

        let io = StrataError::new("IO error", ErrorKind::IOError);
        assert_eq!(io.kind(), &ErrorKind::IOError);

        let missing = StrataError::new("file missing", ErrorKind::FileNotFound);
        assert_eq!(missing.kind(), &ErrorKind::FileNotFound);

        let permission = StrataError::new("permission denied", ErrorKind::PermissionDenied);
        assert_eq!(permission.kind(), &ErrorKind::PermissionDenied);
    }

    // Test error hierarchy and chaining
    #[test]
    fn test_error_chain_with_different_kinds() {
        let root_cause = StrataError::new("file missing", ErrorKind::FileNotFound);
        let mid_level =
            StrataError::new_with_cause("failed to read value", ErrorKind::IOError, root_cause);
        let top_level =
            StrataError::new_with_cause("cannot open store", ErrorKind::BackendError, mid_level);

        assert_eq!(top_level.kind(), &ErrorKind::BackendError);
        assert!(top_level.cause().is_some());

        if let Some(cause) = top_level.cause() {
            assert_eq!(cause.kind(), &ErrorKind::IOError);
        }
    }

    #[test]
    fn test_error_kind_equality() {
        let error1 = StrataError::new("Error 1", ErrorKind::NotFound);
        let error2 = StrataError::new("Error 2", ErrorKind::NotFound);
        let error3 = StrataError::new("Error 3", ErrorKind::InvalidKey);

        assert_eq!(error1.kind(), error2.kind());
        assert_ne!(error1.kind(), error3.kind());
    }

    #[test]
    fn test_error_message_preservation() {
        let messages = vec![
            ("not found message", ErrorKind::NotFound),
            ("invalid key message", ErrorKind::InvalidKey),
            ("conflict message", ErrorKind::ConfigurationConflict),
            ("unsupported message", ErrorKind::UnsupportedOperation),
        ];

        for (msg, kind) in &messages {
            let error = StrataError::new(msg, kind.clone());
            assert_eq!(error.message(), *msg);
            assert_eq!(error.kind(), kind);
        }
    }

    // Test From<std::io::Error>
    #[test]
    fn test_from_io_error_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let strata_err: StrataError = io_err.into();

        assert_eq!(strata_err.kind(), &ErrorKind::FileNotFound);
        assert!(strata_err.message().contains("IO error"));
    }

    #[test]
    fn test_from_io_error_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let strata_err: StrataError = io_err.into();

        assert_eq!(strata_err.kind(), &ErrorKind::PermissionDenied);
        assert!(strata_err.message().contains("IO error"));
    }

    #[test]
    fn test_from_io_error_other() {
        let io_err = std::io::Error::other("unknown io error");
        let strata_err: StrataError = io_err.into();

        assert_eq!(strata_err.kind(), &ErrorKind::IOError);
        assert!(strata_err.message().contains("IO error"));
    }

    // Test From<std::string::FromUtf8Error>
    #[test]
    fn test_from_utf8_error() {
        let invalid_utf8 = vec![0xFF, 0xFE];
        let utf8_err = String::from_utf8(invalid_utf8).unwrap_err();
        let strata_err: StrataError = utf8_err.into();

        assert_eq!(strata_err.kind(), &ErrorKind::EncodingError);
        assert!(strata_err.message().contains("UTF-8"));
    }

    // Test From<String> and From<&str>
    #[test]
    fn test_from_string_and_str() {
        let msg_err: StrataError = String::from("test error message").into();
        assert_eq!(msg_err.kind(), &ErrorKind::InternalError);
        assert_eq!(msg_err.message(), "test error message");

        let str_err: StrataError = "another message".into();
        assert_eq!(str_err.kind(), &ErrorKind::InternalError);
        assert_eq!(str_err.message(), "another message");
    }

    // Test ? operator with From trait
    #[test]
    fn test_question_mark_operator_with_from() {
        fn operation_that_fails_with_io() -> StrataResult<String> {
            let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
            Err(io_err)?
        }

        let result = operation_that_fails_with_io();
        assert!(result.is_err());

        if let Err(err) = result {
            assert_eq!(err.kind(), &ErrorKind::FileNotFound);
        }
    }
}
