//! Streams over a keystream cipher
//!
//! A keystream cipher XORs one continuously advancing pad over the
//! data, so encryption and decryption are the same transform and the
//! output length always equals the input length. Bulk data moves in
//! keystream-block-sized steps with a byte-exact tail, all on a single
//! cipher instance so the position never resets or skips.

use cipher::typenum::Unsigned;
use cipher::{KeyIvInit, StreamCipher};
use zeroize::Zeroizing;

use streamcrypt_api::error::{validate, Error, Result};
use streamcrypt_api::stream::{InputStream, OutputStream, StreamState};

use crate::buffer::ChunkBuffer;
use crate::DEFAULT_CHUNK_LEN;

/// Internal step size for bulk keystream application. ChaCha20 and its
/// relatives all generate 64-byte keystream blocks.
const KEYSTREAM_BLOCK_LEN: usize = 64;

/// Writing stream applying a keystream cipher before pushing to the
/// nested output stream.
pub struct KeystreamWriter<C: StreamCipher + KeyIvInit, S: OutputStream> {
    nested: S,
    key: Zeroizing<Vec<u8>>,
    nonce: Zeroizing<Vec<u8>>,
    cipher: Option<C>,
    input: ChunkBuffer,
    output: ChunkBuffer,
    state: StreamState,
}

impl<C: StreamCipher + KeyIvInit, S: OutputStream> KeystreamWriter<C, S> {
    pub fn new(nested: S, key: &[u8], nonce: &[u8]) -> Self {
        Self::with_chunk_len(nested, key, nonce, DEFAULT_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, key: &[u8], nonce: &[u8], chunk_len: usize) -> Self {
        assert!(chunk_len > 0, "chunk length must be positive");
        Self {
            nested,
            key: Zeroizing::new(key.to_vec()),
            nonce: Zeroizing::new(nonce.to_vec()),
            cipher: None,
            input: ChunkBuffer::new(chunk_len),
            output: ChunkBuffer::new(chunk_len),
            state: StreamState::default(),
        }
    }

    pub fn into_inner(self) -> S {
        self.nested
    }

    fn apply_ready(&mut self, drain_tail: bool) -> Result<()> {
        let cipher = self.cipher.as_mut().expect("opened stream has a cipher");
        loop {
            // a full buffer must drain even on a sub-block tail, or a
            // chunk length below the keystream block size would stall
            let force = drain_tail || self.input.is_full();
            let take = keystream_step(self.input.ready_len(), force);
            if take == 0 || self.output.free_len() < take {
                break;
            }
            apply_b2b(
                cipher,
                &self.input.ready()[..take],
                &mut self.output.free_mut()[..take],
            )?;
            self.output.commit(take);
            self.input.mark_consumed(take);
        }
        let produced = self.output.ready_len();
        if produced > 0 {
            self.nested.write(self.output.ready())?;
            self.output.mark_consumed(produced);
        }
        if self.input.is_full() {
            self.input.compact();
        }
        Ok(())
    }
}

impl<C: StreamCipher + KeyIvInit, S: OutputStream> OutputStream for KeystreamWriter<C, S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
        self.cipher = Some(init_cipher::<C>(&self.key, &self.nonce)?);
        Ok(())
    }

    fn has_space_available(&self) -> bool {
        self.nested.has_space_available()
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.state.assert_opened();
        let mut rest = buf;
        while !rest.is_empty() {
            let took = self.input.fill_from(rest);
            rest = &rest[took..];
            self.apply_ready(false)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.assert_opened();
        self.apply_ready(true)?;
        self.cipher = None;
        self.state.begin_close();
        Ok(())
    }
}

/// Reading stream applying a keystream cipher to bytes pulled from the
/// nested input stream.
pub struct KeystreamReader<C: StreamCipher + KeyIvInit, S: InputStream> {
    nested: S,
    key: Zeroizing<Vec<u8>>,
    nonce: Zeroizing<Vec<u8>>,
    cipher: Option<C>,
    input: ChunkBuffer,
    output: ChunkBuffer,
    eof_reached: bool,
    state: StreamState,
}

impl<C: StreamCipher + KeyIvInit, S: InputStream> KeystreamReader<C, S> {
    pub fn new(nested: S, key: &[u8], nonce: &[u8]) -> Self {
        Self::with_chunk_len(nested, key, nonce, DEFAULT_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, key: &[u8], nonce: &[u8], chunk_len: usize) -> Self {
        assert!(chunk_len > 0, "chunk length must be positive");
        Self {
            nested,
            key: Zeroizing::new(key.to_vec()),
            nonce: Zeroizing::new(nonce.to_vec()),
            cipher: None,
            input: ChunkBuffer::new(chunk_len),
            output: ChunkBuffer::new(chunk_len),
            eof_reached: false,
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
        self.fill_input()?;
        let cipher = self.cipher.as_mut().expect("opened stream has a cipher");
        loop {
            let force = self.eof_reached || self.input.is_full();
            let take = keystream_step(self.input.ready_len(), force);
            if take == 0 || self.output.free_len() < take {
                break;
            }
            apply_b2b(
                cipher,
                &self.input.ready()[..take],
                &mut self.output.free_mut()[..take],
            )?;
            self.output.commit(take);
            self.input.mark_consumed(take);
        }
        if self.input.is_full() {
            self.input.compact();
        }
        Ok(())
    }
}

impl<C: StreamCipher + KeyIvInit, S: InputStream> InputStream for KeystreamReader<C, S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
        self.cipher = Some(init_cipher::<C>(&self.key, &self.nonce)?);
        Ok(())
    }

    fn has_bytes_available(&self) -> bool {
        !self.eof_reached || self.input.ready_len() > 0 || self.output.ready_len() > 0
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.state.assert_opened();
        let mut filled = 0;
        while filled < buf.len() {
            if self.output.ready_len() == 0 {
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
        self.cipher = None;
        self.state.begin_close();
        Ok(())
    }
}

fn init_cipher<C: StreamCipher + KeyIvInit>(key: &[u8], nonce: &[u8]) -> Result<C> {
    validate::length("keystream cipher key", key.len(), C::KeySize::USIZE)?;
    validate::length("keystream cipher nonce", nonce.len(), C::IvSize::USIZE)?;
    C::new_from_slices(key, nonce).map_err(|_| Error::InvalidParameter {
        context: "keystream cipher",
        reason: "key or nonce rejected by the engine",
    })
}

/// Bytes to move in one application step: whole keystream blocks while
/// bulk data keeps arriving, then the exact sub-block tail once the
/// source is settled.
fn keystream_step(ready: usize, drain_tail: bool) -> usize {
    if ready >= KEYSTREAM_BLOCK_LEN {
        (ready / KEYSTREAM_BLOCK_LEN) * KEYSTREAM_BLOCK_LEN
    } else if drain_tail {
        ready
    } else {
        0
    }
}

fn apply_b2b<C: StreamCipher>(cipher: &mut C, input: &[u8], output: &mut [u8]) -> Result<()> {
    cipher
        .apply_keystream_b2b(input, output)
        .map_err(|_| Error::Engine {
            engine: "keystream cipher",
            operation: "apply",
            message: "input and output length mismatch".into(),
        })
}

/// ChaCha20 (IETF, 96-bit nonce) encrypting stream.
pub type ChaCha20Writer<S> = KeystreamWriter<chacha20::ChaCha20, S>;
/// ChaCha20 (IETF, 96-bit nonce) decrypting stream.
pub type ChaCha20Reader<S> = KeystreamReader<chacha20::ChaCha20, S>;
