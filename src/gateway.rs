use crate::app::Application;
use crate::config::Config;
use crate::context::{keys, Context, Environ, Value, VERSION};
use crate::error::{Abort, Error, Result};
use crate::http::{latin1, Body, Headers};
use crate::respond::{Respond, Responder};
use crate::writer::{ResponseState, ResponseWriter, SharedWriter};

use std::io;
use std::process::ExitCode;

use tracing::{debug, error, info_span, warn};

/// Runs an application for one request, CGI style.
///
/// The gateway turns an [`Environ`] into a [`Context`], calls the
/// application with a respond backed by its response writer, and streams
/// the returned body to the output, flushing after every chunk.
#[derive(Debug, Clone, Default)]
pub struct Gateway {
    config: Config,
}

impl Gateway {
    /// Requests are never handled by multiple threads of one process.
    pub const MULTITHREAD: bool = false;
    /// Every request runs in a process of its own.
    pub const MULTIPROCESS: bool = true;
    /// The application is called once per process.
    pub const RUN_ONCE: bool = true;

    pub fn new() -> Gateway {
        Gateway::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Gateway {
        Gateway { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the request context from the hosting environment.
    pub fn context(&self, environ: Environ) -> Context {
        let Environ {
            vars,
            input,
            errors,
        } = environ;

        let mut cx = Context::new();
        for (name, value) in vars {
            cx.insert(latin1::decode(&name), latin1::decode(&value));
        }

        let scheme = match cx.var(&self.config.secure_indicator) {
            Some("on" | "1") => "https",
            _ => "http",
        };

        cx.insert_value(keys::INPUT, Value::Input(input));
        cx.insert_value(keys::ERRORS, Value::Errors(errors));
        cx.insert_value(keys::VERSION, Value::Version(VERSION.0, VERSION.1));
        cx.insert(keys::URL_SCHEME, scheme);
        cx.insert(keys::MULTITHREAD, Gateway::MULTITHREAD);
        cx.insert(keys::MULTIPROCESS, Gateway::MULTIPROCESS);
        cx.insert(keys::RUN_ONCE, Gateway::RUN_ONCE);
        cx
    }

    /// Serve one request, writing the response to `out`.
    ///
    /// Returns the failure that ended the request, if any. It has already
    /// been logged and written to the context's error sink.
    pub fn serve<A, W>(&self, app: &A, environ: Environ, out: W) -> Result<()>
    where
        A: Application + ?Sized,
        W: io::Write + 'static,
    {
        let mut cx = self.context(environ);

        let span = info_span!(
            "request",
            method = cx.var("REQUEST_METHOD").unwrap_or("-"),
            path = cx.var("PATH_INFO").unwrap_or("/"),
            scheme = cx.url_scheme(),
        );
        let _enter = span.enter();

        let writer = SharedWriter::new(ResponseWriter::with_status_line(
            out,
            self.config.status_line(),
        ));

        match self.drive(app, &mut cx, &writer) {
            Ok(()) => {
                debug!(
                    status = %writer.status().map(|s| s.to_string()).unwrap_or_default(),
                    bytes = writer.body_len(),
                    "request completed"
                );
                Ok(())
            }
            Err(err) => {
                self.recover(&err, &writer);
                report(&mut cx, &err);
                Err(err)
            }
        }
    }

    /// Like [`serve`](Gateway::serve), mapping the outcome to an exit code.
    pub fn run<A, W>(&self, app: &A, environ: Environ, out: W) -> ExitCode
    where
        A: Application + ?Sized,
        W: io::Write + 'static,
    {
        match self.serve(app, environ, out) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => ExitCode::from(err.exit_code()),
        }
    }

    fn drive<A, W>(&self, app: &A, cx: &mut Context, writer: &SharedWriter<W>) -> Result<()>
    where
        A: Application + ?Sized,
        W: io::Write + 'static,
    {
        let mut body = app.call(cx, Responder::new(writer.clone()))?;
        let result = drain(&mut body, writer);
        body.release();
        result
    }

    /// Send the configured error response if nothing was sent yet.
    fn recover<W>(&self, err: &Error, writer: &SharedWriter<W>)
    where
        W: io::Write + 'static,
    {
        if !self.config.error_response || writer.state() == ResponseState::Sent {
            return;
        }

        if matches!(err, Error::Transport(_)) {
            return;
        }

        let status = match self.config.error_status() {
            Ok(status) => status,
            Err(err) => {
                warn!(error = %err, "not sending an error response");
                return;
            }
        };

        let body = self.config.error_body.as_bytes();
        let headers = Headers::new()
            .with("Content-Type", "text/plain")
            .with("Content-Length", body.len().to_string());

        let sent = writer
            .respond(status, headers, Some(Abort::new(err.to_string())))
            .and_then(|declared| declared.into_sink())
            .and_then(|sink| sink.write(body));

        if let Err(err) = sent {
            warn!(error = %err, "failed to send error response");
        }
    }
}

fn drain<W>(body: &mut Body, writer: &SharedWriter<W>) -> Result<()>
where
    W: io::Write + 'static,
{
    for chunk in body.by_ref() {
        let chunk = chunk?;
        if !chunk.is_empty() {
            writer.write_chunk(&chunk)?;
        }
    }

    // send the headers of an empty body
    if writer.state() != ResponseState::Sent {
        writer.write_chunk(b"")?;
    }

    Ok(())
}

fn report(cx: &mut Context, err: &Error) {
    error!(error = %err, "request failed");

    if let Some(errors) = cx.errors() {
        let written = writeln!(errors, "ferry: {}", err).and_then(|()| errors.flush());

        if let Err(io) = written {
            warn!(error = %io, "failed to write to the error sink");
        }
    }
}

/// Run an application against the current process: its environment, stdin,
/// stdout and stderr.
pub fn run_with_cgi<A>(app: &A) -> ExitCode
where
    A: Application + ?Sized,
{
    Gateway::new().run(app, Environ::from_process(), io::stdout())
}
