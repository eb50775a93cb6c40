//! Middleware.

mod rewrite;
mod wrap_fn;

pub use rewrite::{shift_up, Rewrite};
pub use wrap_fn::{wrap_fn, WrapFn};

use crate::app::Application;
use crate::context::Context;
use crate::error::Result;
use crate::http::Body;
use crate::respond::Responder;

/// Middleware that wraps around the rest of the chain.
///
/// A middleware sees the request context on the way in, can hand `next` a
/// respond of its own to observe or edit the declaration, and can transform
/// the body `next` returns.
pub trait Wrap {
    /// Call the middleware with the request, the respond of the layer
    /// outside it, and the next layer in the chain.
    fn call(&self, cx: &mut Context, respond: Responder, next: &dyn Application) -> Result<Body>;

    /// Add another middleware to the chain.
    ///
    /// The returned middleware will pass `self` to
    /// the given middleware as the next layer.
    fn and<W>(self, wrap: W) -> And<Self, W>
    where
        W: Wrap,
        Self: Sized,
    {
        And {
            inner: self,
            outer: wrap,
        }
    }
}

impl<W> Wrap for &W
where
    W: Wrap + ?Sized,
{
    fn call(&self, cx: &mut Context, respond: Responder, next: &dyn Application) -> Result<Body> {
        W::call(self, cx, respond, next)
    }
}

impl<W> Wrap for Box<W>
where
    W: Wrap + ?Sized,
{
    fn call(&self, cx: &mut Context, respond: Responder, next: &dyn Application) -> Result<Body> {
        W::call(self, cx, respond, next)
    }
}

/// Middleware that calls next with no extra processing.
///
/// This is useful in generic code as a base middleware type.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Call;

impl Call {
    /// Create a new instance of this type.
    pub fn new() -> Self {
        Self
    }
}

impl Wrap for Call {
    fn call(&self, cx: &mut Context, respond: Responder, next: &dyn Application) -> Result<Body> {
        next.call(cx, respond)
    }
}

/// A combination of two middlewares.
///
/// See [`Wrap::and`] for details.
#[derive(Debug, Clone)]
pub struct And<I, O> {
    inner: I,
    outer: O,
}

impl<I, O> Wrap for And<I, O>
where
    I: Wrap,
    O: Wrap,
{
    fn call(&self, cx: &mut Context, respond: Responder, next: &dyn Application) -> Result<Body> {
        self.outer.call(
            cx,
            respond,
            &Link {
                wrap: &self.inner,
                next,
            },
        )
    }
}

/// A middleware bound to the layer after it.
struct Link<'a, W> {
    wrap: &'a W,
    next: &'a dyn Application,
}

impl<W> Application for Link<'_, W>
where
    W: Wrap,
{
    fn call(&self, cx: &mut Context, respond: Responder) -> Result<Body> {
        self.wrap.call(cx, respond, self.next)
    }
}

/// An application wrapped in middleware.
///
/// See [`Application::wrap`].
#[derive(Debug, Clone)]
pub struct Wrapped<A, W> {
    app: A,
    wrap: W,
}

impl<A, W> Wrapped<A, W> {
    pub(crate) fn new(app: A, wrap: W) -> Self {
        Self { app, wrap }
    }
}

impl<A, W> Application for Wrapped<A, W>
where
    A: Application,
    W: Wrap,
{
    fn call(&self, cx: &mut Context, respond: Responder) -> Result<Body> {
        self.wrap.call(cx, respond, &self.app)
    }
}
