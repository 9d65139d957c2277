//! Leaf sources and sinks feeding a pipeline
//!
//! Leaves sit at the ends of a pipeline: an in-memory buffer or a file
//! handle exposing only the stream contract. They are deliberately
//! permissive about open/close ordering; the lifecycle state machine
//! guards the transform streams, not the leaves.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use streamcrypt_api::error::Result;
use streamcrypt_api::stream::{InputStream, OutputStream};

/// Reads from an owned byte vector.
pub struct BufferInputStream {
    buf: Vec<u8>,
    pos: usize,
}

impl BufferInputStream {
    pub fn new(buf: Vec<u8>) -> Self {
        Self { buf, pos: 0 }
    }
}

impl InputStream for BufferInputStream {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn has_bytes_available(&self) -> bool {
        self.pos < self.buf.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len().min(self.buf.len() - self.pos);
        buf[..len].copy_from_slice(&self.buf[self.pos..self.pos + len]);
        self.pos += len;
        Ok(len)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Appends to an owned byte vector, retrievable after the pipeline
/// finishes.
#[derive(Default)]
pub struct BufferOutputStream {
    buf: Vec<u8>,
}

impl BufferOutputStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl OutputStream for BufferOutputStream {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn has_space_available(&self) -> bool {
        true
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(buf);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Blocking file source.
///
/// EOF is flagged on a short read, so `has_bytes_available` turns false
/// as soon as the final bytes are returned rather than one read later.
/// Transform finalization relies on this.
pub struct FileInputStream {
    file: File,
    eof_reached: bool,
}

impl FileInputStream {
    pub fn new(file: File) -> Self {
        Self {
            file,
            eof_reached: false,
        }
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl InputStream for FileInputStream {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn has_bytes_available(&self) -> bool {
        !self.eof_reached
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let n = self.file.read(&mut buf[total..])?;
            if n == 0 {
                self.eof_reached = true;
                break;
            }
            total += n;
        }
        Ok(total)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Blocking file sink.
pub struct FileOutputStream {
    file: File,
}

impl FileOutputStream {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    pub fn create_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl OutputStream for FileOutputStream {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn has_space_available(&self) -> bool {
        true
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.file.write_all(buf)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}
