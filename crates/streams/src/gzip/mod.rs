//! Deflate streams
//!
//! [`DeflateWriter`] compresses everything written through it before
//! pushing to the nested output stream; [`InflateReader`] decompresses
//! bytes pulled from the nested input stream. Data moves through the
//! engine with no flushing until the stream settles, so the compressed
//! form is identical to a one-shot compression of the same bytes.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use streamcrypt_api::error::{validate, Error, Result};
use streamcrypt_api::stream::{InputStream, OutputStream, StreamState};

use crate::buffer::ChunkBuffer;

/// Default chunk length for the deflate streams. Smaller than the
/// cipher default since the engine keeps its own 32 KiB window.
pub const DEFAULT_DEFLATE_CHUNK_LEN: usize = 1 << 14;

/// Framing of the compressed byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Raw deflate with a zlib header and checksum trailer.
    Zlib,
    /// Headerless deflate.
    Raw,
}

impl Format {
    fn zlib_header(self) -> bool {
        matches!(self, Format::Zlib)
    }
}

/// Compressing output stream.
pub struct DeflateWriter<S: OutputStream> {
    nested: S,
    format: Format,
    level: u32,
    compress: Option<Compress>,
    output: ChunkBuffer,
    state: StreamState,
}

impl<S: OutputStream> DeflateWriter<S> {
    pub fn new(nested: S, format: Format, level: u32) -> Self {
        Self::with_chunk_len(nested, format, level, DEFAULT_DEFLATE_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, format: Format, level: u32, chunk_len: usize) -> Self {
        Self {
            nested,
            format,
            level,
            compress: None,
            output: ChunkBuffer::new(chunk_len),
            state: StreamState::default(),
        }
    }

    pub fn into_inner(self) -> S {
        self.nested
    }

    fn flush_output(&mut self) -> Result<()> {
        let produced = self.output.ready_len();
        if produced > 0 {
            self.nested.write(self.output.ready())?;
            self.output.mark_consumed(produced);
        }
        Ok(())
    }
}

impl<S: OutputStream> OutputStream for DeflateWriter<S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
        validate::parameter(
            self.level <= 9,
            "deflate compression level",
            "must be between 0 and 9",
        )?;
        self.compress = Some(Compress::new(
            Compression::new(self.level),
            self.format.zlib_header(),
        ));
        Ok(())
    }

    fn has_space_available(&self) -> bool {
        self.nested.has_space_available()
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.state.assert_opened();
        let mut rest = buf;
        while !rest.is_empty() {
            let engine = self.compress.as_mut().expect("opened stream has an engine");
            let before_in = engine.total_in();
            let before_out = engine.total_out();
            engine
                .compress(rest, self.output.free_mut(), FlushCompress::None)
                .map_err(|e| engine_error("deflate", "compress", &e))?;
            let consumed = (engine.total_in() - before_in) as usize;
            let produced = (engine.total_out() - before_out) as usize;
            self.output.commit(produced);
            rest = &rest[consumed..];
            self.flush_output()?;
            if consumed == 0 && produced == 0 {
                return Err(Error::Engine {
                    engine: "deflate",
                    operation: "compress",
                    message: "engine made no progress".into(),
                });
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.assert_opened();
        loop {
            let engine = self.compress.as_mut().expect("opened stream has an engine");
            let before_out = engine.total_out();
            let status = engine
                .compress(&[], self.output.free_mut(), FlushCompress::Finish)
                .map_err(|e| engine_error("deflate", "finish", &e))?;
            let produced = (engine.total_out() - before_out) as usize;
            self.output.commit(produced);
            self.flush_output()?;
            if status == Status::StreamEnd {
                break;
            }
        }
        self.compress = None;
        self.state.begin_close();
        Ok(())
    }
}

/// Decompressing input stream. Stops consuming at the deflate
/// terminator, so trailing bytes in the nested stream are left alone.
pub struct InflateReader<S: InputStream> {
    nested: S,
    format: Format,
    decompress: Option<Decompress>,
    input: ChunkBuffer,
    output: ChunkBuffer,
    eof_reached: bool,
    stream_end: bool,
    state: StreamState,
}

impl<S: InputStream> InflateReader<S> {
    pub fn new(nested: S, format: Format) -> Self {
        Self::with_chunk_len(nested, format, crate::DEFAULT_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, format: Format, chunk_len: usize) -> Self {
        Self {
            nested,
            format,
            decompress: None,
            input: ChunkBuffer::new(chunk_len),
            output: ChunkBuffer::new(chunk_len),
            eof_reached: false,
            stream_end: false,
            state: StreamState::default(),
        }
    }

    pub fn into_inner(self) -> S {
        self.nested
    }

    fn fill_input(&mut self) -> Result<()> {
        while !self.eof_reached && self.input.free_len() > 0 {
            if !self.nested.has_bytes_available() {
                self.eof_reached = true;
                break;
            }
            let n = self.nested.read(self.input.free_mut())?;
            self.input.commit(n);
            if n == 0 {
                self.eof_reached = true;
            }
        }
        Ok(())
    }

    fn pump(&mut self) -> Result<()> {
        while self.output.ready_len() == 0 && !self.stream_end {
            self.fill_input()?;
            if self.eof_reached && self.input.ready_len() == 0 {
                return Err(Error::Engine {
                    engine: "inflate",
                    operation: "decompress",
                    message: "compressed stream ended before its terminator".into(),
                });
            }
            let engine = self
                .decompress
                .as_mut()
                .expect("opened stream has an engine");
            let before_in = engine.total_in();
            let before_out = engine.total_out();
            let status = engine
                .decompress(self.input.ready(), self.output.free_mut(), FlushDecompress::None)
                .map_err(|e| engine_error("inflate", "decompress", &e))?;
            let consumed = (engine.total_in() - before_in) as usize;
            let produced = (engine.total_out() - before_out) as usize;
            self.input.mark_consumed(consumed);
            self.output.commit(produced);
            match status {
                Status::StreamEnd => self.stream_end = true,
                Status::Ok => {}
                Status::BufError => {
                    // needs more input than the buffer holds right now
                    if consumed == 0 && produced == 0 {
                        if self.eof_reached {
                            return Err(Error::Engine {
                                engine: "inflate",
                                operation: "decompress",
                                message: "compressed stream ended before its terminator".into(),
                            });
                        }
                        if self.input.is_full() {
                            self.input.compact();
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl<S: InputStream> InputStream for InflateReader<S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
        self.decompress = Some(Decompress::new(self.format.zlib_header()));
        Ok(())
    }

    fn has_bytes_available(&self) -> bool {
        !self.stream_end || self.output.ready_len() > 0
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.state.assert_opened();
        let mut filled = 0;
        while filled < buf.len() {
            if self.output.ready_len() == 0 {
                if self.stream_end {
                    break;
                }
                self.pump()?;
            }
            let n = self.output.drain_into(&mut buf[filled..]);
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn close(&mut self) -> Result<()> {
        self.state.assert_opened();
        self.decompress = None;
        self.state.begin_close();
        Ok(())
    }
}

fn engine_error(engine: &'static str, operation: &'static str, cause: &dyn std::fmt::Display) -> Error {
    Error::Engine {
        engine,
        operation,
        message: cause.to_string(),
    }
}
