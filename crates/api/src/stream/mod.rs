//! The stream contract shared by every component in a pipeline
//!
//! Two capability sets exist: [`InputStream`] (pull-based) and
//! [`OutputStream`] (push-based). Any `InputStream` transform may be
//! constructed over another `InputStream` as its nested source, and any
//! `OutputStream` transform over another `OutputStream` as its nested
//! sink; no other wiring is legal. A transform never closes its nested
//! stream: the caller retains that responsibility and closes
//! innermost-transform-first, leaf-last, so buffered bytes are flushed
//! before the underlying sink goes away.

use crate::error::Result;

/// Pull-based side of the stream contract.
pub trait InputStream {
    /// Transitions the stream from `Created` to `Opened`, validating
    /// configuration and initializing the engine. Panics if called twice.
    fn open(&mut self) -> Result<()>;

    /// True while the nested source may still yield bytes or this
    /// stream's ready span is non-empty.
    ///
    /// Callers must poll this before every read rather than rely on the
    /// first zero-length read: zero is also a valid "buffer did not fill
    /// yet" result for compression and keystream transforms.
    fn has_bytes_available(&self) -> bool;

    /// Reads up to `buf.len()` bytes, returning the number produced.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Transitions the stream to `Closed`, releasing engine resources.
    /// Does not close the nested stream.
    fn close(&mut self) -> Result<()>;
}

/// Push-based side of the stream contract.
pub trait OutputStream {
    /// Transitions the stream from `Created` to `Opened`, validating
    /// configuration and initializing the engine. Panics if called twice.
    fn open(&mut self) -> Result<()>;

    /// Delegates to the nested sink.
    fn has_space_available(&self) -> bool;

    /// Consumes all of `buf`, transforming and pushing complete chunks to
    /// the nested sink as they fill.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Flushes all buffered bytes and finalizes the engine (padding,
    /// compressor finish) before returning. Does not close the nested
    /// stream.
    fn close(&mut self) -> Result<()>;
}

impl<T: InputStream + ?Sized> InputStream for &mut T {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn has_bytes_available(&self) -> bool {
        (**self).has_bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<T: OutputStream + ?Sized> OutputStream for &mut T {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn has_space_available(&self) -> bool {
        (**self).has_space_available()
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write(buf)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<T: InputStream + ?Sized> InputStream for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn has_bytes_available(&self) -> bool {
        (**self).has_bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<T: OutputStream + ?Sized> OutputStream for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn has_space_available(&self) -> bool {
        (**self).has_space_available()
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write(buf)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Lifecycle of a stream: `Created → Opened → Closed`, with exactly one
/// `open()` and one `close()` transition.
///
/// Any other call ordering is a programming bug in the caller, not a
/// recoverable condition, and panics. This is deliberately distinct from
/// the `Result`-based faults in [`crate::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Created,
    Opened,
    Closed,
}

impl StreamState {
    /// Marks the `Created → Opened` transition.
    pub fn begin_open(&mut self) {
        match self {
            StreamState::Created => *self = StreamState::Opened,
            StreamState::Opened => panic!("the stream can be opened only once"),
            StreamState::Closed => panic!("the stream is already closed"),
        }
    }

    /// Asserts that the stream is open for read/write operations.
    pub fn assert_opened(&self) {
        match self {
            StreamState::Opened => {}
            _ => panic!("the stream is not opened"),
        }
    }

    /// Marks the `Opened → Closed` transition.
    pub fn begin_close(&mut self) {
        match self {
            StreamState::Opened => *self = StreamState::Closed,
            StreamState::Created => panic!("the stream is not opened"),
            StreamState::Closed => panic!("the stream is already closed"),
        }
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, StreamState::Opened)
    }
}
