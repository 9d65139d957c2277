//! Property-based round-trip tests for the transform streams.

use proptest::prelude::*;

use streamcrypt_api::stream::{InputStream, OutputStream};
use streamcrypt_streams::block::{TwofishCbcReader, TwofishCbcWriter};
use streamcrypt_streams::cryptor::{Aes256CbcReader, Aes256CbcWriter};
use streamcrypt_streams::gzip::{DeflateWriter, Format, InflateReader};
use streamcrypt_streams::io::{BufferInputStream, BufferOutputStream};
use streamcrypt_streams::keystream::{ChaCha20Reader, ChaCha20Writer};

use streamcrypt_tests::read_to_end;

fn arbitrary_data() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=2048)
}

/// Chunk lengths around the cipher block size and well above it.
fn chunk_lens() -> impl Strategy<Value = usize> {
    prop_oneof![Just(16usize), 17usize..64, Just(1usize << 15)]
}

proptest! {
    #[test]
    fn twofish_cbc_roundtrip(
        key in any::<[u8; 32]>(),
        iv in any::<[u8; 16]>(),
        data in arbitrary_data(),
        chunk in chunk_lens(),
    ) {
        let mut sink = BufferOutputStream::new();
        let mut writer = TwofishCbcWriter::with_chunk_len(&mut sink, &key, &iv, chunk);
        writer.open().unwrap();
        writer.write(&data).unwrap();
        writer.close().unwrap();
        let ciphertext = sink.into_vec();
        prop_assert_eq!(ciphertext.len(), 16 * (data.len() / 16 + 1));

        let mut reader =
            TwofishCbcReader::with_chunk_len(BufferInputStream::new(ciphertext), &key, &iv, chunk);
        reader.open().unwrap();
        let recovered = read_to_end(&mut reader).unwrap();
        prop_assert_eq!(recovered, data);
    }

    #[test]
    fn aes256_cbc_roundtrip(
        key in any::<[u8; 32]>(),
        iv in any::<[u8; 16]>(),
        data in arbitrary_data(),
    ) {
        let mut sink = BufferOutputStream::new();
        let mut writer = Aes256CbcWriter::aes256(&mut sink, &key, &iv).unwrap();
        writer.open().unwrap();
        writer.write(&data).unwrap();
        writer.close().unwrap();

        let mut reader =
            Aes256CbcReader::aes256(BufferInputStream::new(sink.into_vec()), &key, &iv).unwrap();
        reader.open().unwrap();
        let recovered = read_to_end(&mut reader).unwrap();
        prop_assert_eq!(recovered, data);
    }

    #[test]
    fn chacha20_roundtrip(
        key in any::<[u8; 32]>(),
        nonce in any::<[u8; 12]>(),
        data in arbitrary_data(),
        chunk in chunk_lens(),
    ) {
        let mut sink = BufferOutputStream::new();
        let mut writer = ChaCha20Writer::with_chunk_len(&mut sink, &key, &nonce, chunk);
        writer.open().unwrap();
        writer.write(&data).unwrap();
        writer.close().unwrap();
        let ciphertext = sink.into_vec();
        prop_assert_eq!(ciphertext.len(), data.len());

        let mut reader =
            ChaCha20Reader::with_chunk_len(BufferInputStream::new(ciphertext), &key, &nonce, chunk);
        reader.open().unwrap();
        let recovered = read_to_end(&mut reader).unwrap();
        prop_assert_eq!(recovered, data);
    }

    #[test]
    fn deflate_roundtrip(
        data in arbitrary_data(),
        level in 0u32..=9,
    ) {
        let mut sink = BufferOutputStream::new();
        let mut writer = DeflateWriter::new(&mut sink, Format::Zlib, level);
        writer.open().unwrap();
        writer.write(&data).unwrap();
        writer.close().unwrap();

        let mut reader = InflateReader::new(BufferInputStream::new(sink.into_vec()), Format::Zlib);
        reader.open().unwrap();
        let recovered = read_to_end(&mut reader).unwrap();
        prop_assert_eq!(recovered, data);
    }

    #[test]
    fn split_writes_equal_one_write(
        key in any::<[u8; 32]>(),
        nonce in any::<[u8; 12]>(),
        data in arbitrary_data(),
        split in 1usize..=64,
    ) {
        let mut sink = BufferOutputStream::new();
        let mut writer = ChaCha20Writer::new(&mut sink, &key, &nonce);
        writer.open().unwrap();
        writer.write(&data).unwrap();
        writer.close().unwrap();
        let whole = sink.into_vec();

        let mut sink = BufferOutputStream::new();
        let mut writer = ChaCha20Writer::new(&mut sink, &key, &nonce);
        writer.open().unwrap();
        for piece in data.chunks(split) {
            writer.write(piece).unwrap();
        }
        writer.close().unwrap();
        prop_assert_eq!(sink.into_vec(), whole);
    }
}
