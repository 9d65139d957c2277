//! # streamcrypt
//!
//! A composable streaming transform library. Pipelines that encrypt,
//! decrypt, compress or decompress data are built by chaining transform
//! streams, each of which both consumes bytes from and produces bytes to
//! another stream implementing the same minimal contract.
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! streamcrypt = "0.1"
//! ```
//!
//! ## Crate structure
//!
//! This is a facade crate that re-exports functionality from two sub-crates:
//!
//! - `streamcrypt-api`: the stream contract (`InputStream`/`OutputStream`),
//!   the open/close state machine and the error taxonomy
//! - `streamcrypt-streams`: the chunk-buffer engine, the leaf streams and
//!   the transform adapters (manual CBC, native chained CBC, keystream,
//!   deflate/inflate)
//!
//! ## Example
//!
//! ```no_run
//! use streamcrypt::prelude::*;
//!
//! fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
//!     let mut sink = BufferOutputStream::new();
//!     let mut stream = TwofishCbcWriter::new(&mut sink, key, iv);
//!     stream.open()?;
//!     stream.write(plaintext)?;
//!     stream.close()?;
//!     Ok(sink.into_vec())
//! }
//! ```

pub use streamcrypt_api as api;
pub use streamcrypt_streams as streams;

/// Common imports for streamcrypt users
pub mod prelude {
    pub use streamcrypt_api::error::{Error, Result};
    pub use streamcrypt_api::stream::{InputStream, OutputStream};
    pub use streamcrypt_streams::block::{
        BlockCipherReader, BlockCipherWriter, TwofishCbcReader, TwofishCbcWriter,
    };
    pub use streamcrypt_streams::buffer::ChunkBuffer;
    pub use streamcrypt_streams::cryptor::{
        Aes256CbcReader, Aes256CbcWriter, CbcDecryptor, CbcEncryptor, Cryptor, CryptorReader,
        CryptorWriter, EcbDecryptor, EcbEncryptor, Padding,
    };
    pub use streamcrypt_streams::gzip::{DeflateWriter, Format, InflateReader};
    pub use streamcrypt_streams::io::{
        BufferInputStream, BufferOutputStream, FileInputStream, FileOutputStream,
    };
    pub use streamcrypt_streams::keystream::{ChaCha20Reader, ChaCha20Writer};
    pub use streamcrypt_streams::DEFAULT_CHUNK_LEN;
}
