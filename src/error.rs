use std::error::Error as StdError;
use std::fmt;
use std::io;

/// A type-erased error raised by application or middleware code.
pub type BoxError = Box<dyn StdError + 'static>;

/// A `Result` alias where the error is [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can end a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The header/body ordering contract was violated.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Writing to the output channel failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The application or a middleware failed.
    #[error("application error: {0}")]
    Application(BoxError),

    /// The gateway configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an application failure.
    pub fn application(err: impl Into<BoxError>) -> Self {
        Error::Application(err.into())
    }

    /// Whether this error is a [`ProtocolError`].
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Returns the protocol violation, if this is one.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Error::Protocol(err) => Some(err),
            _ => None,
        }
    }

    /// The process exit code reported for this failure.
    ///
    /// Follows the `sysexits.h` conventions where one applies.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Application(_) => 1,
            Error::Protocol(_) => 70,
            Error::Transport(_) => 74,
            Error::Config(_) => 78,
        }
    }
}

/// A violation of the header/body ordering contract, or header text that
/// cannot be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("headers already declared")]
    AlreadyDeclared,

    #[error("write before headers declared")]
    WriteBeforeDeclare,

    #[error("invalid status line {0:?}")]
    InvalidStatus(String),

    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid header value for {0:?}")]
    InvalidHeaderValue(String),
}

/// The failure an application caught before re-declaring its response.
///
/// Passing an `Abort` to [`Respond::respond`](crate::Respond::respond)
/// replaces a declaration that has not reached the output yet. Once the
/// headers are on the wire the abort is handed back as
/// [`Declared::Aborted`](crate::Declared::Aborted) so the caller can
/// propagate the original failure.
pub struct Abort {
    error: BoxError,
}

impl Abort {
    /// Capture a failure.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// The captured failure.
    pub fn error(&self) -> &(dyn StdError + 'static) {
        &*self.error
    }

    /// Convert back into the request-ending error.
    pub fn into_error(self) -> Error {
        Error::Application(self.error)
    }
}

impl fmt::Debug for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Abort").field(&self.error).finish()
    }
}

impl From<Abort> for Error {
    fn from(abort: Abort) -> Self {
        abort.into_error()
    }
}
