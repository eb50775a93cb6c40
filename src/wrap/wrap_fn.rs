use super::Wrap;
use crate::app::Application;
use crate::context::Context;
use crate::error::Result;
use crate::http::Body;
use crate::respond::Responder;

use std::fmt;

/// Create middleware from a closure.
///
/// ```rust
/// use ferry::wrap::wrap_fn;
/// use ferry::{Application, Context, Responder};
///
/// let log_path = wrap_fn(|cx: &mut Context, respond: Responder, next: &dyn Application| {
///     if let Some(path) = cx.var("PATH_INFO") {
///         eprintln!("serving {}", path);
///     }
///     next.call(cx, respond)
/// });
/// ```
pub fn wrap_fn<F>(f: F) -> WrapFn<F>
where
    F: Fn(&mut Context, Responder, &dyn Application) -> Result<Body>,
{
    WrapFn { f }
}

/// Middleware created by [`wrap_fn`].
#[derive(Clone)]
pub struct WrapFn<F> {
    f: F,
}

impl<F> Wrap for WrapFn<F>
where
    F: Fn(&mut Context, Responder, &dyn Application) -> Result<Body>,
{
    fn call(&self, cx: &mut Context, respond: Responder, next: &dyn Application) -> Result<Body> {
        (self.f)(cx, respond, next)
    }
}

impl<F> fmt::Debug for WrapFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapFn").finish()
    }
}
