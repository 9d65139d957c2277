//! Multi-stage pipelines built purely by composing transform streams.

use streamcrypt_api::stream::{InputStream, OutputStream};
use streamcrypt_streams::block::{TwofishCbcReader, TwofishCbcWriter};
use streamcrypt_streams::cryptor::{Aes256CbcReader, Aes256CbcWriter};
use streamcrypt_streams::gzip::{DeflateWriter, Format, InflateReader};
use streamcrypt_streams::io::{BufferInputStream, BufferOutputStream};
use streamcrypt_streams::keystream::{ChaCha20Reader, ChaCha20Writer};

use streamcrypt_tests::{gen_buffer, read_to_end};

#[test]
fn compress_then_encrypt_round_trip() {
    let key = gen_buffer(32);
    let iv = gen_buffer(16);
    let plaintext = gen_buffer(100);

    // writing side: deflate feeds the cipher, ciphertext lands in the
    // buffer
    let mut sink = BufferOutputStream::new();
    let mut encryptor = Aes256CbcWriter::aes256(&mut sink, &key, &iv).unwrap();
    encryptor.open().unwrap();
    {
        let mut compressor = DeflateWriter::new(&mut encryptor, Format::Zlib, 6);
        compressor.open().unwrap();
        compressor.write(&plaintext).unwrap();
        compressor.close().unwrap();
    }
    encryptor.close().unwrap();
    let ciphertext = sink.into_vec();

    // reading side: decrypt first, then inflate
    let mut decryptor =
        Aes256CbcReader::aes256(BufferInputStream::new(ciphertext), &key, &iv).unwrap();
    decryptor.open().unwrap();
    let mut reader = InflateReader::new(decryptor, Format::Zlib);
    reader.open().unwrap();
    let recovered = read_to_end(&mut reader).unwrap();
    reader.close().unwrap();
    reader.into_inner().close().unwrap();

    assert_eq!(recovered, plaintext);
}

#[test]
fn compress_then_encrypt_with_twofish() {
    let key = gen_buffer(32);
    let iv = gen_buffer(16);
    let plaintext = gen_buffer(25_000);

    let mut sink = BufferOutputStream::new();
    let mut encryptor = TwofishCbcWriter::new(&mut sink, &key, &iv);
    encryptor.open().unwrap();
    {
        let mut compressor = DeflateWriter::new(&mut encryptor, Format::Raw, 9);
        compressor.open().unwrap();
        for piece in plaintext.chunks(917) {
            compressor.write(piece).unwrap();
        }
        compressor.close().unwrap();
    }
    encryptor.close().unwrap();
    let ciphertext = sink.into_vec();
    assert_eq!(ciphertext.len() % 16, 0);

    let mut decryptor = TwofishCbcReader::new(BufferInputStream::new(ciphertext), &key, &iv);
    decryptor.open().unwrap();
    let mut reader = InflateReader::new(decryptor, Format::Raw);
    reader.open().unwrap();
    assert_eq!(read_to_end(&mut reader).unwrap(), plaintext);
}

#[test]
fn three_stage_pipeline_round_trip() {
    // deflate, then ChaCha20, then AES-256-CBC, and back out again
    let aes_key = gen_buffer(32);
    let aes_iv = gen_buffer(16);
    let chacha_key = gen_buffer(32);
    let nonce = gen_buffer(12);
    let plaintext = gen_buffer(10_000);

    let mut sink = BufferOutputStream::new();
    let mut outer = Aes256CbcWriter::aes256(&mut sink, &aes_key, &aes_iv).unwrap();
    outer.open().unwrap();
    {
        let mut middle = ChaCha20Writer::new(&mut outer, &chacha_key, &nonce);
        middle.open().unwrap();
        {
            let mut inner = DeflateWriter::new(&mut middle, Format::Zlib, 6);
            inner.open().unwrap();
            inner.write(&plaintext).unwrap();
            inner.close().unwrap();
        }
        middle.close().unwrap();
    }
    outer.close().unwrap();
    let wire = sink.into_vec();

    let mut outer = Aes256CbcReader::aes256(BufferInputStream::new(wire), &aes_key, &aes_iv).unwrap();
    outer.open().unwrap();
    let mut middle = ChaCha20Reader::new(outer, &chacha_key, &nonce);
    middle.open().unwrap();
    let mut inner = InflateReader::new(middle, Format::Zlib);
    inner.open().unwrap();
    assert_eq!(read_to_end(&mut inner).unwrap(), plaintext);
}

#[test]
fn pipeline_with_tiny_chunks_round_trips() {
    let key = gen_buffer(32);
    let nonce = gen_buffer(12);
    let plaintext = gen_buffer(777);

    let mut sink = BufferOutputStream::new();
    let mut encryptor = ChaCha20Writer::with_chunk_len(&mut sink, &key, &nonce, 16);
    encryptor.open().unwrap();
    {
        let mut compressor = DeflateWriter::with_chunk_len(&mut encryptor, Format::Zlib, 6, 32);
        compressor.open().unwrap();
        compressor.write(&plaintext).unwrap();
        compressor.close().unwrap();
    }
    encryptor.close().unwrap();
    let wire = sink.into_vec();

    let mut decryptor = ChaCha20Reader::with_chunk_len(BufferInputStream::new(wire), &key, &nonce, 16);
    decryptor.open().unwrap();
    let mut reader = InflateReader::with_chunk_len(decryptor, Format::Zlib, 32);
    reader.open().unwrap();
    assert_eq!(read_to_end(&mut reader).unwrap(), plaintext);
}
