//! Testing utilities for the streamcrypt workspace

use rand::RngCore;

use streamcrypt_api::error::Result;
use streamcrypt_api::stream::InputStream;

/// Fills a buffer of the given length with random bytes.
pub fn gen_buffer(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Drains an opened input stream to a vector, polling availability the
/// way a pipeline consumer would.
pub fn read_to_end<S: InputStream>(stream: &mut S) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; 1024];
    while stream.has_bytes_available() {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    Ok(out)
}
