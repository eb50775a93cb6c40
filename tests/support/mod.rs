#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

/// An output channel that can be inspected while and after a gateway
/// writes to it.
#[derive(Clone, Default)]
pub struct Output {
    buf: Rc<RefCell<Vec<u8>>>,
    flushes: Rc<Cell<usize>>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.get()
    }

    /// The header block, without the blank line, and the body.
    pub fn split(&self) -> (String, Vec<u8>) {
        let bytes = self.bytes();
        let end = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("no header block");
        let head = String::from_utf8(bytes[..end].to_vec()).expect("non-utf8 header block");
        (head, bytes[end + 4..].to_vec())
    }

    pub fn head(&self) -> String {
        self.split().0
    }

    pub fn body(&self) -> Vec<u8> {
        self.split().1
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes.set(self.flushes.get() + 1);
        Ok(())
    }
}

/// An output channel whose every write fails.
pub struct Closed;

impl io::Write for Closed {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Counts how many times a release hook ran.
#[derive(Clone, Default)]
pub struct Releases(Rc<Cell<usize>>);

impl Releases {
    pub fn hook(&self) -> impl FnOnce() + 'static {
        let count = self.0.clone();
        move || count.set(count.get() + 1)
    }

    pub fn count(&self) -> usize {
        self.0.get()
    }
}
