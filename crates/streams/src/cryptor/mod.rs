//! Streams over a self-contained cipher engine
//!
//! Unlike the [`block`](crate::block) adapter, the engine here owns any
//! chaining state and the padding protocol: callers feed it arbitrary
//! byte runs through [`Cryptor::update`] and settle the tail exactly
//! once through [`Cryptor::finalize`]. Engines come chained
//! ([`CbcEncryptor`]/[`CbcDecryptor`]) or unchained
//! ([`EcbEncryptor`]/[`EcbDecryptor`]), each with or without PKCS#7. A
//! decrypting engine with PKCS#7 padding holds the last ciphertext
//! block back across updates, since only finalization can tell whether
//! that block carries padding.

use cipher::typenum::Unsigned;
use cipher::{Block, BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use zeroize::Zeroizing;

use streamcrypt_api::error::{validate, Error, Result};
use streamcrypt_api::stream::{InputStream, OutputStream, StreamState};

use crate::buffer::ChunkBuffer;
use crate::DEFAULT_CHUNK_LEN;

/// Padding protocol applied by a [`Cryptor`] at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// PKCS#7: a remainder of `r` bytes is padded with `B - r` bytes of
    /// value `B - r`; a remainder of zero pads a full extra block.
    Pkcs7,
    /// No padding; the total input length must be a block multiple.
    None,
}

/// An incremental cipher engine with internal chaining state.
///
/// `update` may be called any number of times with runs of any length;
/// `finalize` settles the remainder and must be called exactly once.
pub trait Cryptor {
    /// Cipher block length in bytes.
    fn block_len(&self) -> usize;

    /// Upper bound on the bytes `update` can produce for `input_len`
    /// more input bytes.
    fn update_len(&self, input_len: usize) -> usize;

    /// Feeds `input` through the engine, writing produced bytes to the
    /// front of `output`. Returns the number of bytes written.
    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Settles the held-back remainder, writing at most one block.
    fn finalize(&mut self, output: &mut [u8]) -> Result<usize>;
}

/// Encrypting CBC engine wrapping [`cbc::Encryptor`].
pub struct CbcEncryptor<C: BlockEncryptMut + BlockCipher> {
    inner: cbc::Encryptor<C>,
    padding: Padding,
    carry: Zeroizing<Vec<u8>>,
    finalized: bool,
}

impl<C: BlockEncryptMut + BlockCipher> core::fmt::Debug for CbcEncryptor<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CbcEncryptor")
            .field("padding", &self.padding)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

impl<C: BlockEncryptMut + BlockCipher + KeyInit> CbcEncryptor<C> {
    pub fn new(key: &[u8], iv: &[u8], padding: Padding) -> Result<Self> {
        validate::length("block cipher key", key.len(), C::KeySize::USIZE)?;
        validate::length("CBC initialization vector", iv.len(), C::BlockSize::USIZE)?;
        let inner = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| {
            Error::InvalidParameter {
                context: "CBC encryptor",
                reason: "key or initialization vector rejected by the engine",
            }
        })?;
        Ok(Self {
            inner,
            padding,
            carry: Zeroizing::new(Vec::with_capacity(C::BlockSize::USIZE)),
            finalized: false,
        })
    }
}

impl<C: BlockEncryptMut + BlockCipher> Cryptor for CbcEncryptor<C> {
    fn block_len(&self) -> usize {
        C::BlockSize::USIZE
    }

    fn update_len(&self, input_len: usize) -> usize {
        let b = C::BlockSize::USIZE;
        ((self.carry.len() + input_len) / b) * b
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "CBC encryptor", "update after finalize")?;
        let b = C::BlockSize::USIZE;
        validate::parameter(
            output.len() >= self.update_len(input.len()),
            "CBC encryptor",
            "output buffer too small",
        )?;

        let mut input = input;
        let mut written = 0;

        if !self.carry.is_empty() {
            let need = b - self.carry.len();
            if input.len() < need {
                self.carry.extend_from_slice(input);
                return Ok(0);
            }
            self.carry.extend_from_slice(&input[..need]);
            input = &input[need..];
            let out = Block::<C>::from_mut_slice(&mut output[..b]);
            self.inner
                .encrypt_block_b2b_mut(Block::<C>::from_slice(&self.carry), out);
            self.carry.clear();
            written += b;
        }

        let mut chunks = input.chunks_exact(b);
        for chunk in &mut chunks {
            let out = Block::<C>::from_mut_slice(&mut output[written..written + b]);
            self.inner
                .encrypt_block_b2b_mut(Block::<C>::from_slice(chunk), out);
            written += b;
        }
        self.carry.extend_from_slice(chunks.remainder());
        Ok(written)
    }

    fn finalize(&mut self, output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "CBC encryptor", "finalize called twice")?;
        self.finalized = true;
        let b = C::BlockSize::USIZE;
        match self.padding {
            Padding::None => {
                validate::block_aligned("CBC plaintext", self.carry.len(), b)?;
                Ok(0)
            }
            Padding::Pkcs7 => {
                validate::parameter(
                    output.len() >= b,
                    "CBC encryptor",
                    "output buffer too small",
                )?;
                let pad_len = b - self.carry.len();
                let mut block = Block::<C>::default();
                block[..self.carry.len()].copy_from_slice(&self.carry);
                for slot in &mut block[b - pad_len..] {
                    *slot = pad_len as u8;
                }
                let out = Block::<C>::from_mut_slice(&mut output[..b]);
                self.inner.encrypt_block_b2b_mut(&block, out);
                self.carry.clear();
                Ok(b)
            }
        }
    }
}

/// Decrypting CBC engine wrapping [`cbc::Decryptor`].
pub struct CbcDecryptor<C: BlockDecryptMut + BlockCipher> {
    inner: cbc::Decryptor<C>,
    padding: Padding,
    carry: Zeroizing<Vec<u8>>,
    finalized: bool,
    processed_any: bool,
}

impl<C: BlockDecryptMut + BlockCipher> core::fmt::Debug for CbcDecryptor<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CbcDecryptor")
            .field("padding", &self.padding)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

impl<C: BlockDecryptMut + BlockCipher + KeyInit> CbcDecryptor<C> {
    pub fn new(key: &[u8], iv: &[u8], padding: Padding) -> Result<Self> {
        validate::length("block cipher key", key.len(), C::KeySize::USIZE)?;
        validate::length("CBC initialization vector", iv.len(), C::BlockSize::USIZE)?;
        let inner = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| {
            Error::InvalidParameter {
                context: "CBC decryptor",
                reason: "key or initialization vector rejected by the engine",
            }
        })?;
        Ok(Self {
            inner,
            padding,
            carry: Zeroizing::new(Vec::with_capacity(2 * C::BlockSize::USIZE)),
            finalized: false,
            processed_any: false,
        })
    }
}

impl<C: BlockDecryptMut + BlockCipher> CbcDecryptor<C> {
    /// Ciphertext bytes withheld from `update` until finalization.
    fn holdback(&self) -> usize {
        match self.padding {
            Padding::Pkcs7 => C::BlockSize::USIZE,
            Padding::None => 0,
        }
    }
}

impl<C: BlockDecryptMut + BlockCipher> Cryptor for CbcDecryptor<C> {
    fn block_len(&self) -> usize {
        C::BlockSize::USIZE
    }

    fn update_len(&self, input_len: usize) -> usize {
        let b = C::BlockSize::USIZE;
        let total = self.carry.len() + input_len;
        (total.saturating_sub(self.holdback()) / b) * b
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "CBC decryptor", "update after finalize")?;
        let b = C::BlockSize::USIZE;
        let emit = self.update_len(input.len());
        validate::parameter(
            output.len() >= emit,
            "CBC decryptor",
            "output buffer too small",
        )?;

        let mut input = input;
        let mut written = 0;

        // settle blocks straddling the carry first; the carry never
        // exceeds holdback + B - 1 bytes
        while written < emit && !self.carry.is_empty() {
            if self.carry.len() < b {
                let need = b - self.carry.len();
                self.carry.extend_from_slice(&input[..need]);
                input = &input[need..];
            }
            let out = Block::<C>::from_mut_slice(&mut output[written..written + b]);
            self.inner
                .decrypt_block_b2b_mut(Block::<C>::from_slice(&self.carry[..b]), out);
            self.carry.drain(..b);
            written += b;
            self.processed_any = true;
        }

        while written < emit {
            let out = Block::<C>::from_mut_slice(&mut output[written..written + b]);
            self.inner
                .decrypt_block_b2b_mut(Block::<C>::from_slice(&input[..b]), out);
            input = &input[b..];
            written += b;
            self.processed_any = true;
        }

        self.carry.extend_from_slice(input);
        Ok(written)
    }

    fn finalize(&mut self, output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "CBC decryptor", "finalize called twice")?;
        self.finalized = true;
        let b = C::BlockSize::USIZE;
        if self.carry.is_empty() && !self.processed_any {
            return Ok(0);
        }
        validate::block_aligned("CBC ciphertext", self.carry.len(), b)?;
        match self.padding {
            Padding::None => {
                debug_assert!(self.carry.is_empty());
                Ok(0)
            }
            Padding::Pkcs7 => {
                // carry holds exactly the final ciphertext block
                validate::parameter(
                    output.len() >= b,
                    "CBC decryptor",
                    "output buffer too small",
                )?;
                let mut block = Block::<C>::default();
                self.inner
                    .decrypt_block_b2b_mut(Block::<C>::from_slice(&self.carry), &mut block);
                self.carry.clear();
                let pad_len = block[b - 1] as usize;
                if pad_len == 0 || pad_len > b {
                    return Err(Error::InvalidPadding {
                        context: "CBC ciphertext",
                    });
                }
                if block[b - pad_len..].iter().any(|&x| x != pad_len as u8) {
                    return Err(Error::InvalidPadding {
                        context: "CBC ciphertext",
                    });
                }
                let kept = b - pad_len;
                output[..kept].copy_from_slice(&block[..kept]);
                Ok(kept)
            }
        }
    }
}

/// Encrypting unchained (ECB) engine over a raw block cipher. Each
/// block is encrypted independently; no IV is involved.
pub struct EcbEncryptor<C: BlockEncryptMut> {
    inner: C,
    padding: Padding,
    carry: Zeroizing<Vec<u8>>,
    finalized: bool,
}

impl<C: BlockEncryptMut + KeyInit> EcbEncryptor<C> {
    pub fn new(key: &[u8], padding: Padding) -> Result<Self> {
        validate::length("block cipher key", key.len(), C::KeySize::USIZE)?;
        let inner = C::new_from_slice(key).map_err(|_| Error::InvalidParameter {
            context: "ECB encryptor",
            reason: "key rejected by the engine",
        })?;
        Ok(Self {
            inner,
            padding,
            carry: Zeroizing::new(Vec::with_capacity(C::BlockSize::USIZE)),
            finalized: false,
        })
    }
}

impl<C: BlockEncryptMut> Cryptor for EcbEncryptor<C> {
    fn block_len(&self) -> usize {
        C::BlockSize::USIZE
    }

    fn update_len(&self, input_len: usize) -> usize {
        let b = C::BlockSize::USIZE;
        ((self.carry.len() + input_len) / b) * b
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "ECB encryptor", "update after finalize")?;
        let b = C::BlockSize::USIZE;
        validate::parameter(
            output.len() >= self.update_len(input.len()),
            "ECB encryptor",
            "output buffer too small",
        )?;

        let mut input = input;
        let mut written = 0;

        if !self.carry.is_empty() {
            let need = b - self.carry.len();
            if input.len() < need {
                self.carry.extend_from_slice(input);
                return Ok(0);
            }
            self.carry.extend_from_slice(&input[..need]);
            input = &input[need..];
            let out = Block::<C>::from_mut_slice(&mut output[..b]);
            self.inner
                .encrypt_block_b2b_mut(Block::<C>::from_slice(&self.carry), out);
            self.carry.clear();
            written += b;
        }

        let mut chunks = input.chunks_exact(b);
        for chunk in &mut chunks {
            let out = Block::<C>::from_mut_slice(&mut output[written..written + b]);
            self.inner
                .encrypt_block_b2b_mut(Block::<C>::from_slice(chunk), out);
            written += b;
        }
        self.carry.extend_from_slice(chunks.remainder());
        Ok(written)
    }

    fn finalize(&mut self, output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "ECB encryptor", "finalize called twice")?;
        self.finalized = true;
        let b = C::BlockSize::USIZE;
        match self.padding {
            Padding::None => {
                validate::block_aligned("ECB plaintext", self.carry.len(), b)?;
                Ok(0)
            }
            Padding::Pkcs7 => {
                validate::parameter(
                    output.len() >= b,
                    "ECB encryptor",
                    "output buffer too small",
                )?;
                let pad_len = b - self.carry.len();
                let mut block = Block::<C>::default();
                block[..self.carry.len()].copy_from_slice(&self.carry);
                for slot in &mut block[b - pad_len..] {
                    *slot = pad_len as u8;
                }
                let out = Block::<C>::from_mut_slice(&mut output[..b]);
                self.inner.encrypt_block_b2b_mut(&block, out);
                self.carry.clear();
                Ok(b)
            }
        }
    }
}

/// Decrypting unchained (ECB) engine over a raw block cipher.
pub struct EcbDecryptor<C: BlockDecryptMut> {
    inner: C,
    padding: Padding,
    carry: Zeroizing<Vec<u8>>,
    finalized: bool,
    processed_any: bool,
}

impl<C: BlockDecryptMut + KeyInit> EcbDecryptor<C> {
    pub fn new(key: &[u8], padding: Padding) -> Result<Self> {
        validate::length("block cipher key", key.len(), C::KeySize::USIZE)?;
        let inner = C::new_from_slice(key).map_err(|_| Error::InvalidParameter {
            context: "ECB decryptor",
            reason: "key rejected by the engine",
        })?;
        Ok(Self {
            inner,
            padding,
            carry: Zeroizing::new(Vec::with_capacity(2 * C::BlockSize::USIZE)),
            finalized: false,
            processed_any: false,
        })
    }
}

impl<C: BlockDecryptMut> EcbDecryptor<C> {
    fn holdback(&self) -> usize {
        match self.padding {
            Padding::Pkcs7 => C::BlockSize::USIZE,
            Padding::None => 0,
        }
    }
}

impl<C: BlockDecryptMut> Cryptor for EcbDecryptor<C> {
    fn block_len(&self) -> usize {
        C::BlockSize::USIZE
    }

    fn update_len(&self, input_len: usize) -> usize {
        let b = C::BlockSize::USIZE;
        let total = self.carry.len() + input_len;
        (total.saturating_sub(self.holdback()) / b) * b
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "ECB decryptor", "update after finalize")?;
        let b = C::BlockSize::USIZE;
        let emit = self.update_len(input.len());
        validate::parameter(
            output.len() >= emit,
            "ECB decryptor",
            "output buffer too small",
        )?;

        let mut input = input;
        let mut written = 0;

        while written < emit && !self.carry.is_empty() {
            if self.carry.len() < b {
                let need = b - self.carry.len();
                self.carry.extend_from_slice(&input[..need]);
                input = &input[need..];
            }
            let out = Block::<C>::from_mut_slice(&mut output[written..written + b]);
            self.inner
                .decrypt_block_b2b_mut(Block::<C>::from_slice(&self.carry[..b]), out);
            self.carry.drain(..b);
            written += b;
            self.processed_any = true;
        }

        while written < emit {
            let out = Block::<C>::from_mut_slice(&mut output[written..written + b]);
            self.inner
                .decrypt_block_b2b_mut(Block::<C>::from_slice(&input[..b]), out);
            input = &input[b..];
            written += b;
            self.processed_any = true;
        }

        self.carry.extend_from_slice(input);
        Ok(written)
    }

    fn finalize(&mut self, output: &mut [u8]) -> Result<usize> {
        validate::parameter(!self.finalized, "ECB decryptor", "finalize called twice")?;
        self.finalized = true;
        let b = C::BlockSize::USIZE;
        if self.carry.is_empty() && !self.processed_any {
            return Ok(0);
        }
        validate::block_aligned("ECB ciphertext", self.carry.len(), b)?;
        match self.padding {
            Padding::None => Ok(0),
            Padding::Pkcs7 => {
                validate::parameter(
                    output.len() >= b,
                    "ECB decryptor",
                    "output buffer too small",
                )?;
                let mut block = Block::<C>::default();
                self.inner
                    .decrypt_block_b2b_mut(Block::<C>::from_slice(&self.carry), &mut block);
                self.carry.clear();
                let pad_len = block[b - 1] as usize;
                if pad_len == 0 || pad_len > b {
                    return Err(Error::InvalidPadding {
                        context: "ECB ciphertext",
                    });
                }
                if block[b - pad_len..].iter().any(|&x| x != pad_len as u8) {
                    return Err(Error::InvalidPadding {
                        context: "ECB ciphertext",
                    });
                }
                let kept = b - pad_len;
                output[..kept].copy_from_slice(&block[..kept]);
                Ok(kept)
            }
        }
    }
}

/// Encrypting stream that pushes ciphertext produced by a [`Cryptor`]
/// into a nested output stream.
pub struct CryptorWriter<E: Cryptor, S: OutputStream> {
    nested: S,
    cryptor: E,
    input: ChunkBuffer,
    output: ChunkBuffer,
    state: StreamState,
}

impl<E: Cryptor, S: OutputStream> CryptorWriter<E, S> {
    pub fn new(nested: S, cryptor: E) -> Self {
        Self::with_chunk_len(nested, cryptor, DEFAULT_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, cryptor: E, chunk_len: usize) -> Self {
        let b = cryptor.block_len();
        assert!(chunk_len >= b, "chunk length shorter than a cipher block");
        Self {
            nested,
            cryptor,
            input: ChunkBuffer::new(chunk_len),
            // one extra block so a carried remainder always fits
            output: ChunkBuffer::new(chunk_len + b),
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

    fn process_ready(&mut self) -> Result<()> {
        let ready = self.input.ready_len();
        if ready == 0 {
            return Ok(());
        }
        let produced = self
            .cryptor
            .update(self.input.ready(), self.output.free_mut())?;
        self.output.commit(produced);
        self.input.mark_consumed(ready);
        self.flush_output()
    }
}

impl<E: Cryptor, S: OutputStream> OutputStream for CryptorWriter<E, S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
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
            self.process_ready()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.assert_opened();
        self.process_ready()?;
        let produced = self.cryptor.finalize(self.output.free_mut())?;
        self.output.commit(produced);
        self.flush_output()?;
        self.state.begin_close();
        Ok(())
    }
}

/// Decrypting stream that pulls ciphertext from a nested input stream
/// through a [`Cryptor`].
pub struct CryptorReader<E: Cryptor, S: InputStream> {
    nested: S,
    cryptor: E,
    input: ChunkBuffer,
    output: ChunkBuffer,
    eof_reached: bool,
    finalized: bool,
    state: StreamState,
}

impl<E: Cryptor, S: InputStream> CryptorReader<E, S> {
    pub fn new(nested: S, cryptor: E) -> Self {
        Self::with_chunk_len(nested, cryptor, DEFAULT_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, cryptor: E, chunk_len: usize) -> Self {
        let b = cryptor.block_len();
        assert!(chunk_len >= b, "chunk length shorter than a cipher block");
        Self {
            nested,
            cryptor,
            input: ChunkBuffer::new(chunk_len),
            // one extra block so a held-back remainder always fits
            output: ChunkBuffer::new(chunk_len + b),
            eof_reached: false,
            finalized: false,
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

    /// Runs the engine until the output buffer holds ready bytes or the
    /// stream is settled. Only called with an empty output buffer, so
    /// the whole capacity is free and any update result fits.
    fn pump(&mut self) -> Result<()> {
        while self.output.ready_len() == 0 && !self.finalized {
            self.fill_input()?;
            let ready = self.input.ready_len();
            if ready > 0 {
                let produced = self
                    .cryptor
                    .update(self.input.ready(), self.output.free_mut())?;
                self.output.commit(produced);
                self.input.mark_consumed(ready);
            }
            if self.eof_reached && self.input.ready_len() == 0 {
                let produced = self.cryptor.finalize(self.output.free_mut())?;
                self.output.commit(produced);
                self.finalized = true;
            }
        }
        Ok(())
    }
}

impl<E: Cryptor, S: InputStream> InputStream for CryptorReader<E, S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
        Ok(())
    }

    fn has_bytes_available(&self) -> bool {
        !self.finalized || self.output.ready_len() > 0
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
        self.state.begin_close();
        Ok(())
    }
}

/// AES-256-CBC encrypting stream with PKCS#7 padding.
pub type Aes256CbcWriter<S> = CryptorWriter<CbcEncryptor<aes::Aes256>, S>;
/// AES-256-CBC decrypting stream with PKCS#7 padding.
pub type Aes256CbcReader<S> = CryptorReader<CbcDecryptor<aes::Aes256>, S>;

impl<S: OutputStream> Aes256CbcWriter<S> {
    /// Convenience constructor validating the 32-byte key and 16-byte
    /// initialization vector up front.
    pub fn aes256(nested: S, key: &[u8], iv: &[u8]) -> Result<Self> {
        Ok(Self::new(nested, CbcEncryptor::new(key, iv, Padding::Pkcs7)?))
    }
}

impl<S: InputStream> Aes256CbcReader<S> {
    pub fn aes256(nested: S, key: &[u8], iv: &[u8]) -> Result<Self> {
        Ok(Self::new(nested, CbcDecryptor::new(key, iv, Padding::Pkcs7)?))
    }
}
