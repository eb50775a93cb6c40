//! Serves `Hello`, rewritten by the `text/plain` shifting middleware, as a
//! CGI script.
//!
//! `FERRY_CONFIG` names an optional TOML configuration file and `FERRY_LOG`
//! sets the log filter. Logs go to stderr, stdout carries the response.

use std::io;
use std::process::ExitCode;

use ferry::wrap::Rewrite;
use ferry::{Application, Config, Environ, Gateway, Hello};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("FERRY_LOG")
        .unwrap_or_else(|_| EnvFilter::new("ferry=warn,ferry_cgi=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match std::env::var_os("FERRY_CONFIG") {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(error = %err, "failed to load configuration");
                return ExitCode::from(err.exit_code());
            }
        },
        None => Config::default(),
    };

    let app = Hello.wrap(Rewrite::shift_text());
    Gateway::with_config(config).run(&app, Environ::from_process(), io::stdout())
}
