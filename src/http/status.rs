use crate::error::ProtocolError;
use crate::http::latin1;

use std::fmt;
use std::str::FromStr;

use http::StatusCode;

/// Status of a response, a code and a reason phrase such as `200 OK`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Status {
    code: StatusCode,
    line: String,
}

impl Status {
    /// Parse a status line of the form `"<code> <reason>"`.
    ///
    /// The code must be three digits and the reason must be present. The
    /// reason is kept as given, it does not have to be the canonical one.
    pub fn parse(line: &str) -> Result<Status, ProtocolError> {
        let invalid = || ProtocolError::InvalidStatus(line.to_owned());

        let (code, reason) = line.split_once(' ').ok_or_else(invalid)?;
        if code.len() != 3 || reason.is_empty() {
            return Err(invalid());
        }

        if reason.contains(['\r', '\n']) || !latin1::is_encodable(reason) {
            return Err(invalid());
        }

        let code = StatusCode::from_bytes(code.as_bytes()).map_err(|_| invalid())?;

        Ok(Status {
            code,
            line: line.to_owned(),
        })
    }

    /// The numeric status code.
    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// The reason phrase.
    pub fn reason(&self) -> &str {
        &self.line[4..]
    }

    /// The full status line, e.g. `200 OK`.
    pub fn as_str(&self) -> &str {
        &self.line
    }
}

impl From<StatusCode> for Status {
    fn from(code: StatusCode) -> Self {
        let reason = code.canonical_reason().unwrap_or("Unknown");

        Status {
            code,
            line: format!("{} {}", code.as_str(), reason),
        }
    }
}

impl FromStr for Status {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse(s)
    }
}

impl TryFrom<&str> for Status {
    type Error = ProtocolError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Status::parse(s)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

impl Default for Status {
    fn default() -> Self {
        StatusCode::OK.into()
    }
}
