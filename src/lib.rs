//! A synchronous gateway protocol.
//!
//! A [`Gateway`] builds a [`Context`] for one request and calls an
//! [`Application`] with it and a [`Responder`]. The application declares its
//! status and headers through the responder and returns a lazily produced
//! [`Body`](http::Body), which the gateway streams to its output. Middleware
//! ([`Wrap`]) sits in between, editing declarations and rewriting chunks.
//!
//! ```rust,no_run
//! use ferry::wrap::Rewrite;
//! use ferry::{Application, Hello};
//!
//! let app = Hello.wrap(Rewrite::shift_text());
//! ferry::run_with_cgi(&app);
//! ```

mod app;
mod config;
mod context;
mod error;
mod gateway;
mod respond;

pub mod http;
pub mod wrap;
pub mod writer;

pub use app::{Application, Hello};
pub use config::Config;
pub use context::{keys, Context, Environ, Value};
pub use error::{Abort, BoxError, Error, ProtocolError, Result};
pub use gateway::{run_with_cgi, Gateway};
pub use respond::{Declared, Respond, Responder, Sink, Write};
pub use wrap::{Wrap, Wrapped};
