//! Chunk-buffered transform streams
//!
//! Every transform stream in this crate shares one buffered
//! chunk-processing engine: a fixed-capacity [`buffer::ChunkBuffer`] with
//! a consumed/ready/free partition that converts a caller's
//! arbitrarily-sized read/write requests into fixed-size chunks suitable
//! for a cipher or compressor. The adapters differ only in the engine
//! step they run over each chunk:
//!
//! - [`block`]: drives a raw block cipher (Twofish, AES) in CBC mode
//!   with manually maintained IV and PKCS#7 padding
//! - [`cryptor`]: drives a chained cipher engine that owns IV and
//!   padding itself, through an incremental update/finalize protocol
//! - [`keystream`]: drives a keystream cipher (ChaCha20) with
//!   block-aligned bulk calls and an exact-length tail
//! - [`gzip`]: drives a deflate/inflate engine through its
//!   no-flush/finish-flush protocol
//!
//! Leaf sources and sinks feeding the pipeline live in [`io`]. Pipelines
//! such as "compress then encrypt" are built purely by composition: any
//! transform's nested stream may itself be another transform.

pub mod block;
pub mod buffer;
pub mod cryptor;
pub mod gzip;
pub mod io;
pub mod keystream;

/// Default chunk size for the cipher adapters, 32 KiB.
pub const DEFAULT_CHUNK_LEN: usize = 1 << 15;

pub use streamcrypt_api::error::{Error, Result};
pub use streamcrypt_api::stream::{InputStream, OutputStream};
