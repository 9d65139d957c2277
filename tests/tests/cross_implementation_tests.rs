//! Checks that the streaming transforms agree with one-shot
//! applications of the same engines.

use std::io::Read;

use cipher::{KeyIvInit, StreamCipher};

use streamcrypt_api::stream::{InputStream, OutputStream};
use streamcrypt_streams::block::BlockCipherWriter;
use streamcrypt_streams::cryptor::{CbcEncryptor, CryptorWriter, Padding};
use streamcrypt_streams::gzip::{DeflateWriter, Format};
use streamcrypt_streams::io::{BufferInputStream, BufferOutputStream};
use streamcrypt_streams::keystream::ChaCha20Writer;

use streamcrypt_tests::gen_buffer;

/// The manually chained adapter and the native CBC engine must produce
/// identical AES-256 ciphertext for the same key, IV and plaintext.
#[test]
fn manual_and_native_cbc_agree() {
    let key = gen_buffer(32);
    let iv = gen_buffer(16);
    for len in [0, 1, 16, 100, 4096] {
        let plaintext = gen_buffer(len);

        let mut sink = BufferOutputStream::new();
        let mut manual: BlockCipherWriter<aes::Aes256, _> =
            BlockCipherWriter::new(&mut sink, &key, &iv);
        manual.open().unwrap();
        manual.write(&plaintext).unwrap();
        manual.close().unwrap();
        let manual_ct = sink.into_vec();

        let mut sink = BufferOutputStream::new();
        let engine = CbcEncryptor::<aes::Aes256>::new(&key, &iv, Padding::Pkcs7).unwrap();
        let mut native = CryptorWriter::new(&mut sink, engine);
        native.open().unwrap();
        native.write(&plaintext).unwrap();
        native.close().unwrap();

        assert_eq!(manual_ct, sink.into_vec(), "plaintext len {}", len);
    }
}

/// The streamed keystream application must match a one-shot
/// `apply_keystream` over the whole message.
#[test]
fn streamed_chacha20_matches_one_shot() {
    let key = gen_buffer(32);
    let nonce = gen_buffer(12);
    let plaintext = gen_buffer(3000);

    let mut expected = plaintext.clone();
    let mut cipher = chacha20::ChaCha20::new_from_slices(&key, &nonce).unwrap();
    cipher.apply_keystream(&mut expected);

    let mut sink = BufferOutputStream::new();
    let mut writer = ChaCha20Writer::with_chunk_len(&mut sink, &key, &nonce, 100);
    writer.open().unwrap();
    for piece in plaintext.chunks(37) {
        writer.write(piece).unwrap();
    }
    writer.close().unwrap();

    assert_eq!(sink.into_vec(), expected);
}

/// Compressed output must be a plain zlib stream that any zlib reader
/// can decode.
#[test]
fn deflate_output_is_plain_zlib() {
    let data = gen_buffer(15_000);

    let mut sink = BufferOutputStream::new();
    let mut writer = DeflateWriter::new(&mut sink, Format::Zlib, 6);
    writer.open().unwrap();
    writer.write(&data).unwrap();
    writer.close().unwrap();
    let compressed = sink.into_vec();

    let mut decoder = flate2::read::ZlibDecoder::new(compressed.as_slice());
    let mut recovered = Vec::new();
    decoder.read_to_end(&mut recovered).unwrap();
    assert_eq!(recovered, data);
}

/// A stream decrypting with a one-shot-produced ciphertext recovers the
/// original bytes.
#[test]
fn one_shot_ciphertext_streams_back() {
    let key = gen_buffer(32);
    let nonce = gen_buffer(12);
    let plaintext = gen_buffer(512);

    let mut ciphertext = plaintext.clone();
    let mut cipher = chacha20::ChaCha20::new_from_slices(&key, &nonce).unwrap();
    cipher.apply_keystream(&mut ciphertext);

    let source = BufferInputStream::new(ciphertext);
    let mut reader = streamcrypt_streams::keystream::ChaCha20Reader::new(source, &key, &nonce);
    reader.open().unwrap();
    let recovered = streamcrypt_tests::read_to_end(&mut reader).unwrap();
    assert_eq!(recovered, plaintext);
}
