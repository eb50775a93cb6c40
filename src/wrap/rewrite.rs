use super::Wrap;
use crate::app::Application;
use crate::context::Context;
use crate::error::{Abort, Result};
use crate::http::{Body, Bytes, Headers, Status, CONTENT_LENGTH, CONTENT_TYPE};
use crate::respond::{Declared, Respond, Responder, Sink, Write};

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use mime::Mime;
use tracing::debug;

type Transform = Rc<dyn Fn(&[u8]) -> Bytes>;

/// Adds one to the value of every byte.
pub fn shift_up(chunk: &[u8]) -> Bytes {
    chunk.iter().map(|b| b.wrapping_add(1)).collect()
}

/// Middleware that rewrites the body of responses of one media type.
///
/// A response is rewritten when it declares a `Content-Type` equal to the
/// configured media type. Its `Content-Length` headers are dropped, since
/// the rewritten body may differ in length, and every chunk passes through
/// the transform: both the chunks of the returned body and those written
/// through the sink. Other responses pass through untouched.
#[derive(Clone)]
pub struct Rewrite {
    media_type: Mime,
    transform: Transform,
}

impl Rewrite {
    pub fn new<F>(media_type: Mime, transform: F) -> Self
    where
        F: Fn(&[u8]) -> Bytes + 'static,
    {
        Self {
            media_type,
            transform: Rc::new(transform),
        }
    }

    /// Rewrite `text/plain` responses with [`shift_up`].
    pub fn shift_text() -> Self {
        Rewrite::new(mime::TEXT_PLAIN, shift_up)
    }

    pub fn media_type(&self) -> &Mime {
        &self.media_type
    }

    fn matches(&self, headers: &Headers) -> bool {
        headers.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())
                && value == AsRef::<str>::as_ref(&self.media_type)
        })
    }
}

impl fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rewrite")
            .field("media_type", &self.media_type)
            .finish()
    }
}

impl Wrap for Rewrite {
    fn call(&self, cx: &mut Context, respond: Responder, next: &dyn Application) -> Result<Body> {
        let mode = Mode::default();

        let intercept = Intercept {
            rewrite: self.clone(),
            outer: respond,
            mode: mode.clone(),
        };

        let body = next.call(cx, Responder::new(intercept))?;

        let transform = self.transform.clone();
        Ok(body.map_chunks(move |chunk| {
            if mode.enabled() {
                transform(&chunk[..])
            } else {
                chunk
            }
        }))
    }
}

/// Whether the current response is being rewritten.
///
/// Set by the intercepting respond each time the inner layer declares, read
/// by the body transform on every chunk.
#[derive(Clone, Default)]
struct Mode(Rc<Cell<bool>>);

impl Mode {
    fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }

    fn enabled(&self) -> bool {
        self.0.get()
    }
}

/// The respond handed to the layer inside a [`Rewrite`].
struct Intercept {
    rewrite: Rewrite,
    outer: Responder,
    mode: Mode,
}

impl Respond for Intercept {
    fn respond(
        &self,
        status: Status,
        mut headers: Headers,
        abort: Option<Abort>,
    ) -> Result<Declared> {
        let enabled = self.rewrite.matches(&headers);
        if enabled {
            headers.remove(CONTENT_LENGTH.as_str());
        }

        debug!(
            media_type = %self.rewrite.media_type,
            enabled,
            "rewrite decision"
        );

        let sink = match self.outer.respond(status, headers, abort)? {
            Declared::Ready(sink) => sink,
            // the headers on the wire still reflect the previous decision
            aborted @ Declared::Aborted(_) => return Ok(aborted),
        };

        self.mode.set(enabled);

        Ok(Declared::Ready(if enabled {
            Sink::new(RewriteSink {
                sink,
                transform: self.rewrite.transform.clone(),
            })
        } else {
            sink
        }))
    }
}

struct RewriteSink {
    sink: Sink,
    transform: Transform,
}

impl Write for RewriteSink {
    fn write(&self, chunk: &[u8]) -> Result<()> {
        self.sink.write((self.transform)(chunk))
    }
}
