use crate::error::{Abort, Result};
use crate::http::{Headers, Status};

use std::fmt;
use std::rc::Rc;

/// The `respond` side of the chain: declares the status and headers of a
/// response.
///
/// The gateway implements this on top of its response writer. Middleware
/// implements it to observe or edit what the layer inside it declares before
/// passing it on.
pub trait Respond {
    /// Declare the response.
    ///
    /// Without `abort` this may succeed at most once per request. With
    /// `abort` it replaces a declaration that has not reached the output yet,
    /// and returns [`Declared::Aborted`] if it already has.
    fn respond(&self, status: Status, headers: Headers, abort: Option<Abort>)
        -> Result<Declared>;
}

/// Writes body chunks directly to the response, bypassing the returned body.
pub trait Write {
    fn write(&self, chunk: &[u8]) -> Result<()>;
}

/// A shared handle to a [`Write`] implementation.
#[derive(Clone)]
pub struct Sink {
    inner: Rc<dyn Write>,
}

impl Sink {
    pub fn new(write: impl Write + 'static) -> Self {
        Self {
            inner: Rc::new(write),
        }
    }

    /// Write a chunk, flushing the output.
    pub fn write(&self, chunk: impl AsRef<[u8]>) -> Result<()> {
        self.inner.write(chunk.as_ref())
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish()
    }
}

/// The outcome of a declaration.
#[derive(Debug)]
pub enum Declared {
    /// The declaration was accepted.
    Ready(Sink),
    /// The declaration carried an [`Abort`] but the headers were already
    /// sent. Holds the captured failure, which the caller must propagate.
    Aborted(Abort),
}

impl Declared {
    /// Returns the sink, or the captured failure as an error.
    pub fn into_sink(self) -> Result<Sink> {
        match self {
            Declared::Ready(sink) => Ok(sink),
            Declared::Aborted(abort) => Err(abort.into_error()),
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Declared::Aborted(_))
    }
}

/// The `respond` handle passed to an application.
///
/// Cheap to clone. A body that declares its response lazily, on its first
/// pull, can keep a clone.
#[derive(Clone)]
pub struct Responder {
    inner: Rc<dyn Respond>,
}

impl Responder {
    pub fn new(respond: impl Respond + 'static) -> Self {
        Self {
            inner: Rc::new(respond),
        }
    }

    /// Declare the response.
    pub fn start(&self, status: impl Into<Status>, headers: Headers) -> Result<Sink> {
        self.inner
            .respond(status.into(), headers, None)
            .and_then(Declared::into_sink)
    }

    /// Replace the pending declaration after catching a failure.
    ///
    /// Fails with the captured error if the headers were already sent.
    pub fn abort(&self, status: impl Into<Status>, headers: Headers, abort: Abort) -> Result<Sink> {
        self.inner
            .respond(status.into(), headers, Some(abort))
            .and_then(Declared::into_sink)
    }

    /// The raw declaration call.
    pub fn respond(
        &self,
        status: Status,
        headers: Headers,
        abort: Option<Abort>,
    ) -> Result<Declared> {
        self.inner.respond(status, headers, abort)
    }
}

impl Respond for Responder {
    fn respond(
        &self,
        status: Status,
        headers: Headers,
        abort: Option<Abort>,
    ) -> Result<Declared> {
        self.inner.respond(status, headers, abort)
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder").finish()
    }
}
