//! The response writer: serializes a declaration and body chunks to the
//! output channel, in that order.

use crate::error::{Abort, ProtocolError, Result};
use crate::http::{latin1, Headers, Status};
use crate::respond::{Declared, Respond, Sink, Write};

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tracing::{debug, trace};

/// Where a response is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Nothing declared yet.
    Unset,
    /// Status and headers declared but not written.
    Declared,
    /// Status and headers written. They can no longer change.
    Sent,
}

/// How the status line is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// `Status: 200 OK`, for a server that parses the script's headers.
    Cgi,
    /// `HTTP/1.0 200 OK`, for a script that talks to the client directly.
    Origin { version: String },
}

/// Serializes one response to `out`.
pub struct ResponseWriter<W> {
    out: W,
    state: ResponseState,
    pending: Option<(Status, Headers)>,
    status_line: StatusLine,
    written: usize,
}

impl<W> ResponseWriter<W>
where
    W: io::Write,
{
    pub fn new(out: W) -> Self {
        Self::with_status_line(out, StatusLine::Cgi)
    }

    pub fn with_status_line(out: W, status_line: StatusLine) -> Self {
        Self {
            out,
            state: ResponseState::Unset,
            pending: None,
            status_line,
            written: 0,
        }
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    /// Number of body bytes written so far.
    pub fn body_len(&self) -> usize {
        self.written
    }

    /// The declared status, once there is one.
    pub fn status(&self) -> Option<&Status> {
        self.pending.as_ref().map(|(status, _)| status)
    }

    /// Record a declaration.
    ///
    /// Returns the abort back to the caller if the headers were already
    /// sent, in which case nothing changes.
    pub fn declare(
        &mut self,
        status: Status,
        headers: Headers,
        abort: Option<Abort>,
    ) -> Result<Option<Abort>> {
        match (self.state, abort) {
            (ResponseState::Sent, Some(abort)) => {
                debug!(error = %abort.error(), "abort after headers were sent");
                return Ok(Some(abort));
            }
            (ResponseState::Unset, _) => {}
            (ResponseState::Declared, Some(abort)) => {
                debug!(error = %abort.error(), %status, "replacing pending declaration");
            }
            (_, None) => return Err(ProtocolError::AlreadyDeclared.into()),
        }

        headers.validate()?;
        debug!(%status, headers = headers.len(), "response declared");

        self.pending = Some((status, headers));
        self.state = ResponseState::Declared;
        Ok(None)
    }

    /// Write a body chunk, sending the headers first if they have not been.
    ///
    /// An empty chunk still sends the headers.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        match self.state {
            ResponseState::Unset => return Err(ProtocolError::WriteBeforeDeclare.into()),
            ResponseState::Declared => {
                let head = self.head()?;
                self.out.write_all(&head)?;
                self.state = ResponseState::Sent;
            }
            ResponseState::Sent => {}
        }

        trace!(len = chunk.len(), "writing chunk");
        self.out.write_all(chunk)?;
        self.out.flush()?;
        self.written += chunk.len();
        Ok(())
    }

    fn head(&self) -> Result<Vec<u8>> {
        let (status, headers) = match &self.pending {
            Some(pending) => pending,
            None => return Err(ProtocolError::WriteBeforeDeclare.into()),
        };

        let mut buf = Vec::with_capacity(64 + headers.len() * 32);
        let mut ok = match &self.status_line {
            StatusLine::Cgi => latin1::encode_into("Status: ", &mut buf),
            StatusLine::Origin { version } => latin1::encode_into(&format!("HTTP/{} ", version), &mut buf),
        };
        ok &= latin1::encode_into(status.as_str(), &mut buf);
        buf.extend_from_slice(b"\r\n");

        if !ok {
            return Err(ProtocolError::InvalidStatus(status.to_string()).into());
        }

        for (name, value) in headers {
            if !latin1::encode_into(name, &mut buf) {
                return Err(ProtocolError::InvalidHeaderName(name.to_owned()).into());
            }
            buf.extend_from_slice(b": ");
            if !latin1::encode_into(value, &mut buf) {
                return Err(ProtocolError::InvalidHeaderValue(name.to_owned()).into());
            }
            buf.extend_from_slice(b"\r\n");
        }

        buf.extend_from_slice(b"\r\n");
        Ok(buf)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// A response writer shared between the gateway and the chunk sinks handed
/// out to the application.
pub struct SharedWriter<W> {
    inner: Rc<RefCell<ResponseWriter<W>>>,
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<W> SharedWriter<W>
where
    W: io::Write + 'static,
{
    pub fn new(writer: ResponseWriter<W>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(writer)),
        }
    }

    pub fn state(&self) -> ResponseState {
        self.inner.borrow().state()
    }

    pub fn body_len(&self) -> usize {
        self.inner.borrow().body_len()
    }

    pub fn status(&self) -> Option<Status> {
        self.inner.borrow().status().cloned()
    }

    pub fn write_chunk(&self, chunk: &[u8]) -> Result<()> {
        self.inner.borrow_mut().write_chunk(chunk)
    }
}

impl<W> Respond for SharedWriter<W>
where
    W: io::Write + 'static,
{
    fn respond(
        &self,
        status: Status,
        headers: Headers,
        abort: Option<Abort>,
    ) -> Result<Declared> {
        let aborted = self.inner.borrow_mut().declare(status, headers, abort)?;

        Ok(match aborted {
            Some(abort) => Declared::Aborted(abort),
            None => Declared::Ready(Sink::new(self.clone())),
        })
    }
}

impl<W> Write for SharedWriter<W>
where
    W: io::Write + 'static,
{
    fn write(&self, chunk: &[u8]) -> Result<()> {
        self.write_chunk(chunk)
    }
}
