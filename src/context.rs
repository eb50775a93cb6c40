use crate::error::{Error, Result};
use crate::http::latin1;

use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read, Write};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

/// Keys of the entries the gateway adds next to the environment variables.
pub mod keys {
    /// The request body, a [`Value::Input`](super::Value::Input).
    pub const INPUT: &str = "ferry.input";
    /// The error sink, a [`Value::Errors`](super::Value::Errors).
    pub const ERRORS: &str = "ferry.errors";
    /// The protocol version, a [`Value::Version`](super::Value::Version).
    pub const VERSION: &str = "ferry.version";
    /// `http` or `https`.
    pub const URL_SCHEME: &str = "ferry.url_scheme";
    /// Whether other requests may run concurrently in other threads.
    pub const MULTITHREAD: &str = "ferry.multithread";
    /// Whether other requests may run concurrently in other processes.
    pub const MULTIPROCESS: &str = "ferry.multiprocess";
    /// Whether the application is invoked once in this process.
    pub const RUN_ONCE: &str = "ferry.run_once";
}

/// The protocol version the gateway implements.
pub const VERSION: (u8, u8) = (1, 0);

/// A value in the request [`Context`].
pub enum Value {
    /// Text from the environment, transcoded through [`latin1`] so the
    /// original bytes can be recovered.
    Str(String),
    Flag(bool),
    Version(u8, u8),
    Input(Box<dyn Read>),
    Errors(Box<dyn Write>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => fmt::Debug::fmt(s, f),
            Value::Flag(b) => fmt::Debug::fmt(b, f),
            Value::Version(major, minor) => write!(f, "{}.{}", major, minor),
            Value::Input(_) => f.write_str("<input>"),
            Value::Errors(_) => f.write_str("<errors>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

/// Everything known about the current request.
///
/// Built by the gateway, in insertion order: the environment variables
/// first, then the `ferry.*` entries. Layers can read every entry, and
/// can consume the input stream and write to the error sink.
pub struct Context {
    entries: IndexMap<String, Value>,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub(crate) fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// A text entry, such as an environment variable.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The original bytes of a text entry.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.var(key).and_then(latin1::encode)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_flag)
    }

    pub fn url_scheme(&self) -> &str {
        self.var(keys::URL_SCHEME).unwrap_or("http")
    }

    pub fn is_https(&self) -> bool {
        self.url_scheme() == "https"
    }

    pub fn version(&self) -> Option<(u8, u8)> {
        match self.get(keys::VERSION) {
            Some(Value::Version(major, minor)) => Some((*major, *minor)),
            _ => None,
        }
    }

    pub fn multithread(&self) -> bool {
        self.flag(keys::MULTITHREAD).unwrap_or(false)
    }

    pub fn multiprocess(&self) -> bool {
        self.flag(keys::MULTIPROCESS).unwrap_or(false)
    }

    pub fn run_once(&self) -> bool {
        self.flag(keys::RUN_ONCE).unwrap_or(false)
    }

    /// The request body stream.
    pub fn input(&mut self) -> Option<&mut (dyn Read + 'static)> {
        match self.entries.get_mut(keys::INPUT) {
            Some(Value::Input(input)) => Some(&mut **input),
            _ => None,
        }
    }

    /// Read the request body to the end.
    ///
    /// Reads at most `CONTENT_LENGTH` bytes when that variable is set.
    pub fn read_body(&mut self) -> Result<Vec<u8>> {
        let limit = self
            .var("CONTENT_LENGTH")
            .and_then(|len| len.trim().parse::<u64>().ok());

        let mut body = Vec::new();
        if let Some(input) = self.input() {
            match limit {
                Some(limit) => input.take(limit).read_to_end(&mut body),
                None => input.read_to_end(&mut body),
            }
            .map_err(Error::application)?;
        }

        Ok(body)
    }

    /// The error sink, where layers report problems.
    pub fn errors(&mut self) -> Option<&mut (dyn Write + 'static)> {
        match self.entries.get_mut(keys::ERRORS) {
            Some(Value::Errors(errors)) => Some(&mut **errors),
            _ => None,
        }
    }

    /// Decode `QUERY_STRING` into `T`.
    ///
    /// A missing query string decodes like an empty one.
    pub fn query<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let query = self.raw("QUERY_STRING").unwrap_or_default();
        serde_urlencoded::from_bytes(&query).map_err(Error::application)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// What the hosting process gives a gateway: variables, an input stream and
/// an error sink.
pub struct Environ {
    pub(crate) vars: Vec<(Vec<u8>, Vec<u8>)>,
    pub(crate) input: Box<dyn Read>,
    pub(crate) errors: Box<dyn Write>,
}

impl Environ {
    /// An empty environment with no input and a discarding error sink.
    pub fn new() -> Self {
        Self {
            vars: Vec::new(),
            input: Box::new(io::empty()),
            errors: Box::new(io::sink()),
        }
    }

    /// The environment of the current process: its variables, stdin and
    /// stderr.
    pub fn from_process() -> Self {
        Environ::new()
            .vars_os(std::env::vars_os())
            .input(io::stdin())
            .errors(io::stderr())
    }

    /// Add a variable from raw bytes.
    pub fn var(mut self, name: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        self.vars
            .push((name.as_ref().to_vec(), value.as_ref().to_vec()));
        self
    }

    /// Add variables as the OS reports them, without decoding.
    pub fn vars_os<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        self.vars.extend(vars.into_iter().map(|(name, value)| {
            (
                name.as_encoded_bytes().to_vec(),
                value.as_encoded_bytes().to_vec(),
            )
        }));
        self
    }

    pub fn input(mut self, input: impl Read + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn errors(mut self, errors: impl Write + 'static) -> Self {
        self.errors = Box::new(errors);
        self
    }
}

impl Default for Environ {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environ")
            .field("vars", &self.vars.len())
            .finish()
    }
}
