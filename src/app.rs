use crate::context::Context;
use crate::error::Result;
use crate::http::{Body, Headers, StatusCode};
use crate::respond::Responder;
use crate::wrap::{Wrap, Wrapped};

/// The innermost layer of the chain, producing the response.
///
/// An application declares its status and headers through `respond`, once,
/// before any chunk of the returned body. It may do so inside the call or
/// when its body is first pulled.
///
/// Closures taking a context and a responder are applications:
///
/// ```rust
/// use ferry::http::{Body, Headers, StatusCode};
/// use ferry::{Application, Context, Responder};
///
/// let app = |_: &mut Context, respond: Responder| -> ferry::Result<Body> {
///     respond.start(StatusCode::OK, Headers::from([("Content-Type", "text/plain")]))?;
///     Ok(Body::once("hi\n"))
/// };
/// # fn check(_: impl Application) {}
/// # check(app);
/// ```
pub trait Application {
    fn call(&self, cx: &mut Context, respond: Responder) -> Result<Body>;

    /// Wrap this application in middleware.
    ///
    /// `app.wrap(a).wrap(b)` calls `b`, which calls `a`, which calls `app`.
    fn wrap<W>(self, wrap: W) -> Wrapped<Self, W>
    where
        W: Wrap,
        Self: Sized,
    {
        Wrapped::new(self, wrap)
    }
}

impl<F> Application for F
where
    F: Fn(&mut Context, Responder) -> Result<Body>,
{
    fn call(&self, cx: &mut Context, respond: Responder) -> Result<Body> {
        self(cx, respond)
    }
}

/// Responds to every request with `Hello World`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hello;

impl Hello {
    pub const BODY: &'static [u8] = b"Hello World\n";
}

impl Application for Hello {
    fn call(&self, _: &mut Context, respond: Responder) -> Result<Body> {
        let mut respond = Some(respond);
        let mut sent = false;

        // declared on the first pull, like a generator would
        Ok(Body::try_stream(std::iter::from_fn(move || {
            if sent {
                return None;
            }
            sent = true;

            let respond = respond.take()?;
            Some(
                respond
                    .start(StatusCode::OK, Headers::from([("Content-type", "text/plain")]))
                    .map(|_| Hello::BODY.into()),
            )
        })))
    }
}
