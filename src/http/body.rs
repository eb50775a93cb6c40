use crate::error::{Error, Result};

use std::io::{self, Read};
use std::{fmt, iter};

pub use bytes::Bytes;

type Chunks = Box<dyn Iterator<Item = Result<Bytes>>>;

/// A resource held by a response body that must be released once the body
/// is no longer pulled from, such as an open file or a lease.
///
/// Consuming `self` means a resource cannot be released twice.
pub trait Release {
    fn release(self: Box<Self>);
}

impl<F> Release for F
where
    F: FnOnce(),
{
    fn release(self: Box<Self>) {
        (*self)()
    }
}

/// The body of a response: a lazy, single-pass sequence of chunks.
///
/// A body runs its release hook exactly once. That happens on an explicit
/// call to [`Body::release`], or when the body is dropped, whichever comes
/// first. Releasing also drops the chunk source, so a reader owned by the
/// body is closed at that point.
pub struct Body {
    chunks: Chunks,
    release: Option<Box<dyn Release>>,
}

impl Body {
    /// Create a body from fallible chunks.
    pub fn try_stream<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Result<Bytes>>,
        I::IntoIter: 'static,
    {
        Body {
            chunks: Box::new(chunks.into_iter()),
            release: None,
        }
    }

    /// Create a body from chunks.
    pub fn stream<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T> + 'static,
        I::IntoIter: 'static,
        T: Into<Bytes> + 'static,
    {
        Body::try_stream(chunks.into_iter().map(|chunk| Ok(chunk.into())))
    }

    /// Create a body made of one chunk.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        Body::stream(iter::once(bytes.into()))
    }

    /// Create a body with no chunks.
    pub fn empty() -> Self {
        Body::try_stream(iter::empty())
    }

    /// Stream a reader in chunks of at most `chunk_size` bytes.
    ///
    /// The reader is dropped when the body is released.
    pub fn from_reader<R>(reader: R, chunk_size: usize) -> Self
    where
        R: Read + 'static,
    {
        Body::try_stream(ReadChunks {
            reader,
            buf: vec![0; chunk_size.max(1)],
            done: false,
        })
    }

    /// Attach a resource to be released with this body.
    ///
    /// If a hook is already attached both run, the existing one first.
    pub fn on_release(mut self, hook: impl Release + 'static) -> Self {
        self.release = Some(match self.release.take() {
            None => Box::new(hook),
            Some(first) => Box::new(move || {
                first.release();
                Box::new(hook).release();
            }),
        });
        self
    }

    /// Transform every chunk.
    ///
    /// The release hook moves to the returned body unchanged.
    pub fn map_chunks<F>(mut self, mut f: F) -> Body
    where
        F: FnMut(Bytes) -> Bytes + 'static,
    {
        let release = self.release.take();

        Body {
            chunks: Box::new(self.map(move |chunk| chunk.map(&mut f))),
            release,
        }
    }

    /// Release the resources held by this body.
    ///
    /// Only the first call has an effect. Pulling from a released body yields
    /// nothing.
    pub fn release(&mut self) {
        self.chunks = Box::new(iter::empty());

        if let Some(hook) = self.release.take() {
            hook.release();
        }
    }

    /// Whether the release hook has not run yet.
    pub fn holds_resource(&self) -> bool {
        self.release.is_some()
    }

    /// Collect the remaining chunks into one buffer.
    ///
    /// The body is released afterwards, whether collecting succeeded or not.
    pub fn collect_bytes(mut self) -> Result<Bytes> {
        let mut buf = Vec::new();
        let result = (&mut self).try_for_each(|chunk| {
            buf.extend_from_slice(&chunk?);
            Ok(())
        });
        self.release();
        result.map(|()| buf.into())
    }
}

impl Iterator for Body {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl Drop for Body {
    fn drop(&mut self) {
        self.release();
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("holds_resource", &self.holds_resource())
            .finish()
    }
}

struct ReadChunks<R> {
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => return Some(Ok(Bytes::copy_from_slice(&self.buf[..n]))),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(Error::application(err)));
                }
            }
        }
    }
}
