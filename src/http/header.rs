use crate::error::ProtocolError;
use crate::http::latin1;

use std::{fmt, slice, vec};

pub use http::header::{CONTENT_LENGTH, CONTENT_TYPE};

/// An ordered list of response headers.
///
/// Names are stored exactly as given and duplicates are kept in the order
/// they were added. Lookups by name ignore ASCII case.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    list: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Headers {
        Headers { list: Vec::new() }
    }

    /// Add a header, returning `self`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Headers {
        self.push(name, value);
        self
    }

    /// Add a header after all existing ones.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.list.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.list.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// The first value of the named header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value of the named header, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.list
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Remove every header with the given name, keeping the order of the rest.
    ///
    /// Returns the number of headers removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.list.len();
        self.list.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        before - self.list.len()
    }

    /// Replace every header with the given name by a single one, placed
    /// where the first of them was.
    pub fn replace(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.list.iter().position(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(i) => {
                let mut seen = 0;
                self.list.retain(|(n, _)| {
                    if n.eq_ignore_ascii_case(&name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
                self.list[i] = (name, value);
            }
            None => self.list.push((name, value)),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter(self.list.iter())
    }

    /// Check that every header can be put on the wire.
    pub(crate) fn validate(&self) -> Result<(), ProtocolError> {
        for (name, value) in &self.list {
            let name_ok = !name.is_empty()
                && latin1::is_encodable(name)
                && !name.contains([':', '\r', '\n', ' ', '\t']);

            if !name_ok {
                return Err(ProtocolError::InvalidHeaderName(name.clone()));
            }

            if value.contains(['\r', '\n']) || !latin1::is_encodable(value) {
                return Err(ProtocolError::InvalidHeaderValue(name.clone()));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.list.iter()).finish()
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Headers {
            list: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

impl<N, V> Extend<(N, V)> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (n, v) in iter {
            self.push(n, v);
        }
    }
}

impl<N, V, const L: usize> From<[(N, V); L]> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn from(headers: [(N, V); L]) -> Self {
        headers.into_iter().collect()
    }
}

/// An iterator over `(name, value)` pairs.
pub struct Iter<'a>(slice::Iter<'a, (String, String)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}
