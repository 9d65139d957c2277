//! Block-cipher-with-chaining adapter
//!
//! Drives a raw block-cipher engine (one that encrypts or decrypts a
//! single fixed-size block and has no native chaining or padding) in
//! CBC mode with PKCS#7 padding. The adapter maintains the IV itself:
//! on encrypt the produced ciphertext block becomes the next IV; on
//! decrypt the just-consumed ciphertext block is captured as the next IV
//! *before* the XOR-recovery step overwrites anything.
//!
//! Ciphertext is always a whole number of blocks and at least one block
//! long: a remainder of `r` bytes is padded with `B - r` bytes of value
//! `B - r`, and a remainder of zero pads a full extra block. The pad is
//! stripped from the ready span at read finalization.

use cipher::typenum::Unsigned;
use cipher::{Block, BlockDecrypt, BlockEncrypt, KeyInit};
use zeroize::Zeroizing;

use streamcrypt_api::error::{validate, Error, Result};
use streamcrypt_api::stream::{InputStream, OutputStream, StreamState};

use crate::buffer::ChunkBuffer;
use crate::DEFAULT_CHUNK_LEN;

/// Encrypting CBC stream over a raw block-cipher engine such as
/// [`twofish::Twofish`] or [`aes::Aes256`].
pub struct BlockCipherWriter<C: BlockEncrypt + KeyInit, S: OutputStream> {
    nested: S,
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
    cipher: Option<C>,
    input: ChunkBuffer,
    output: ChunkBuffer,
    state: StreamState,
}

impl<C: BlockEncrypt + KeyInit, S: OutputStream> BlockCipherWriter<C, S> {
    pub fn new(nested: S, key: &[u8], iv: &[u8]) -> Self {
        Self::with_chunk_len(nested, key, iv, DEFAULT_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, key: &[u8], iv: &[u8], chunk_len: usize) -> Self {
        assert!(
            chunk_len >= C::BlockSize::USIZE,
            "chunk size must hold at least one cipher block"
        );
        Self {
            nested,
            key: Zeroizing::new(key.to_vec()),
            iv: Zeroizing::new(iv.to_vec()),
            cipher: None,
            input: ChunkBuffer::new(chunk_len),
            output: ChunkBuffer::new(chunk_len),
            state: StreamState::default(),
        }
    }

    /// Returns the nested sink. The caller remains responsible for
    /// closing it.
    pub fn into_inner(self) -> S {
        self.nested
    }

    fn encrypt_ready_blocks(&mut self) -> Result<()> {
        let b = C::BlockSize::USIZE;
        let nblocks = self.input.ready_len() / b;
        for _ in 0..nblocks {
            let cipher = self.cipher.as_ref().expect("opened stream has a cipher");
            let mut block = Block::<C>::default();
            let src = &self.input.ready()[..b];
            for i in 0..b {
                block[i] = src[i] ^ self.iv[i];
            }
            cipher.encrypt_block(&mut block);
            self.iv.copy_from_slice(block.as_slice());
            self.output.fill_from(block.as_slice());
            self.input.mark_consumed(b);
        }
        let produced = self.output.ready_len();
        if produced > 0 {
            self.nested.write(self.output.ready())?;
            self.output.mark_consumed(produced);
        }
        if self.input.is_full() {
            // sub-block remainder stranded at the tail of a
            // non-block-multiple capacity
            self.input.compact();
        }
        Ok(())
    }
}

impl<C: BlockEncrypt + KeyInit, S: OutputStream> OutputStream for BlockCipherWriter<C, S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
        let b = C::BlockSize::USIZE;
        validate::length("CBC initialization vector", self.iv.len(), b)?;
        let cipher = C::new_from_slice(&self.key).map_err(|_| Error::InvalidLength {
            context: "block cipher key",
            expected: C::KeySize::USIZE,
            actual: self.key.len(),
        })?;
        self.cipher = Some(cipher);
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
            self.encrypt_ready_blocks()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.assert_opened();
        let b = C::BlockSize::USIZE;
        let cipher = self.cipher.as_ref().expect("opened stream has a cipher");

        // remainder is always < B here; a remainder of zero pads a full
        // extra block so ciphertext is never empty
        let remainder = self.input.ready();
        let pad_len = b - remainder.len();
        let mut block = Block::<C>::default();
        block[..remainder.len()].copy_from_slice(remainder);
        for i in remainder.len()..b {
            block[i] = pad_len as u8;
        }
        for i in 0..b {
            block[i] ^= self.iv[i];
        }
        cipher.encrypt_block(&mut block);
        self.nested.write(block.as_slice())?;

        let leftover = self.input.ready_len();
        self.input.mark_consumed(leftover);
        self.cipher = None;
        self.state.begin_close();
        Ok(())
    }
}

/// Decrypting CBC stream over a raw block-cipher engine.
pub struct BlockCipherReader<C: BlockDecrypt + KeyInit, S: InputStream> {
    nested: S,
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
    cipher: Option<C>,
    input: ChunkBuffer,
    output: ChunkBuffer,
    eof_reached: bool,
    decrypted_any: bool,
    pad_stripped: bool,
    state: StreamState,
}

impl<C: BlockDecrypt + KeyInit, S: InputStream> BlockCipherReader<C, S> {
    pub fn new(nested: S, key: &[u8], iv: &[u8]) -> Self {
        Self::with_chunk_len(nested, key, iv, DEFAULT_CHUNK_LEN)
    }

    pub fn with_chunk_len(nested: S, key: &[u8], iv: &[u8], chunk_len: usize) -> Self {
        assert!(
            chunk_len >= C::BlockSize::USIZE,
            "chunk size must hold at least one cipher block"
        );
        Self {
            nested,
            key: Zeroizing::new(key.to_vec()),
            iv: Zeroizing::new(iv.to_vec()),
            cipher: None,
            input: ChunkBuffer::new(chunk_len),
            output: ChunkBuffer::new(chunk_len),
            eof_reached: false,
            decrypted_any: false,
            pad_stripped: false,
            state: StreamState::default(),
        }
    }

    /// Returns the nested source. The caller remains responsible for
    /// closing it.
    pub fn into_inner(self) -> S {
        self.nested
    }

    fn fill_input(&mut self) -> Result<()> {
        if self.eof_reached {
            return Ok(());
        }
        if self.input.is_full() {
            // a sub-block remainder can strand behind the consumed span
            self.input.compact();
        }
        if self.input.free_len() > 0 {
            let n = self.nested.read(self.input.free_mut())?;
            self.input.commit(n);
        }
        if !self.nested.has_bytes_available() {
            self.eof_reached = true;
        }
        Ok(())
    }

    fn decrypt_one_block(&mut self) {
        let b = C::BlockSize::USIZE;
        let cipher = self.cipher.as_ref().expect("opened stream has a cipher");
        let ciphertext = Block::<C>::clone_from_slice(&self.input.ready()[..b]);
        let mut plaintext = ciphertext.clone();
        cipher.decrypt_block(&mut plaintext);
        for i in 0..b {
            plaintext[i] ^= self.iv[i];
        }
        // the old ciphertext block becomes the next IV
        self.iv.copy_from_slice(ciphertext.as_slice());
        self.input.mark_consumed(b);
        self.output.fill_from(plaintext.as_slice());
        self.decrypted_any = true;
    }

    /// Bulk path while the nested source still has bytes.
    fn decrypt_blocks(&mut self) {
        let b = C::BlockSize::USIZE;
        if self.output.ready_len() > b {
            return;
        }
        let nblocks = self.input.ready_len().min(self.output.free_len()) / b;
        for _ in 0..nblocks {
            self.decrypt_one_block();
        }
    }

    /// Tail path once the nested source is exhausted: finish whole
    /// blocks, reject a partial trailing block, strip the padding.
    fn decrypt_remaining(&mut self) -> Result<()> {
        let b = C::BlockSize::USIZE;
        while self.input.ready_len() >= b && self.output.free_len() >= b {
            self.decrypt_one_block();
        }
        let remainder = self.input.ready_len();
        if remainder > 0 && remainder < b {
            return Err(Error::NotAligned {
                context: "CBC ciphertext",
                block_size: b,
                actual: remainder,
            });
        }
        if remainder == 0 && self.decrypted_any && !self.pad_stripped {
            self.strip_padding();
        }
        Ok(())
    }

    fn strip_padding(&mut self) {
        self.pad_stripped = true;
        let Some(&pad) = self.output.ready().last() else {
            return;
        };
        let pad = (pad as usize).min(self.output.ready_len());
        self.output.shrink_ready(pad);
    }
}

impl<C: BlockDecrypt + KeyInit, S: InputStream> InputStream for BlockCipherReader<C, S> {
    fn open(&mut self) -> Result<()> {
        self.state.begin_open();
        let b = C::BlockSize::USIZE;
        validate::length("CBC initialization vector", self.iv.len(), b)?;
        let cipher = C::new_from_slice(&self.key).map_err(|_| Error::InvalidLength {
            context: "block cipher key",
            expected: C::KeySize::USIZE,
            actual: self.key.len(),
        })?;
        self.cipher = Some(cipher);
        Ok(())
    }

    fn has_bytes_available(&self) -> bool {
        !self.eof_reached || self.input.ready_len() > 0 || self.output.ready_len() > 0
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.state.assert_opened();
        let mut total = 0;
        while total < buf.len() && self.has_bytes_available() {
            self.fill_input()?;
            if self.nested.has_bytes_available() {
                self.decrypt_blocks();
            } else {
                self.decrypt_remaining()?;
            }
            let n = self.output.drain_into(&mut buf[total..]);
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    fn close(&mut self) -> Result<()> {
        self.state.begin_close();
        self.cipher = None;
        Ok(())
    }
}

/// Twofish-CBC encrypting stream.
pub type TwofishCbcWriter<S> = BlockCipherWriter<twofish::Twofish, S>;
/// Twofish-CBC decrypting stream.
pub type TwofishCbcReader<S> = BlockCipherReader<twofish::Twofish, S>;
