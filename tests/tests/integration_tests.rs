//! End-to-end tests for single transform stages over leaf streams.

use streamcrypt_api::stream::{InputStream, OutputStream};
use streamcrypt_streams::block::{TwofishCbcReader, TwofishCbcWriter};
use streamcrypt_streams::cryptor::{Aes256CbcReader, Aes256CbcWriter};
use streamcrypt_streams::gzip::{DeflateWriter, Format, InflateReader};
use streamcrypt_streams::io::{
    BufferInputStream, BufferOutputStream, FileInputStream, FileOutputStream,
};
use streamcrypt_streams::keystream::{ChaCha20Reader, ChaCha20Writer};

use streamcrypt_tests::{gen_buffer, read_to_end};

#[test]
fn twofish_cbc_round_trip() {
    let key = gen_buffer(32);
    let iv = gen_buffer(16);
    let plaintext = gen_buffer(1000);

    let mut sink = BufferOutputStream::new();
    let mut writer = TwofishCbcWriter::new(&mut sink, &key, &iv);
    writer.open().unwrap();
    writer.write(&plaintext).unwrap();
    writer.close().unwrap();
    let ciphertext = sink.into_vec();
    assert_eq!(ciphertext.len(), 1008);

    let mut reader = TwofishCbcReader::new(BufferInputStream::new(ciphertext), &key, &iv);
    reader.open().unwrap();
    let recovered = read_to_end(&mut reader).unwrap();
    reader.close().unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn aes256_cbc_round_trip() {
    let key = gen_buffer(32);
    let iv = gen_buffer(16);
    let plaintext = gen_buffer(333);

    let mut sink = BufferOutputStream::new();
    let mut writer = Aes256CbcWriter::aes256(&mut sink, &key, &iv).unwrap();
    writer.open().unwrap();
    writer.write(&plaintext).unwrap();
    writer.close().unwrap();

    let mut reader =
        Aes256CbcReader::aes256(BufferInputStream::new(sink.into_vec()), &key, &iv).unwrap();
    reader.open().unwrap();
    assert_eq!(read_to_end(&mut reader).unwrap(), plaintext);
}

#[test]
fn chacha20_round_trip() {
    let key = gen_buffer(32);
    let nonce = gen_buffer(12);
    let plaintext = gen_buffer(4096);

    let mut sink = BufferOutputStream::new();
    let mut writer = ChaCha20Writer::new(&mut sink, &key, &nonce);
    writer.open().unwrap();
    writer.write(&plaintext).unwrap();
    writer.close().unwrap();
    let ciphertext = sink.into_vec();
    assert_eq!(ciphertext.len(), plaintext.len());

    let mut reader = ChaCha20Reader::new(BufferInputStream::new(ciphertext), &key, &nonce);
    reader.open().unwrap();
    assert_eq!(read_to_end(&mut reader).unwrap(), plaintext);
}

#[test]
fn deflate_round_trip() {
    let data = gen_buffer(20_000);

    let mut sink = BufferOutputStream::new();
    let mut writer = DeflateWriter::new(&mut sink, Format::Zlib, 6);
    writer.open().unwrap();
    writer.write(&data).unwrap();
    writer.close().unwrap();

    let mut reader = InflateReader::new(BufferInputStream::new(sink.into_vec()), Format::Zlib);
    reader.open().unwrap();
    assert_eq!(read_to_end(&mut reader).unwrap(), data);
}

#[test]
fn closing_a_transform_leaves_the_nested_stream_usable() {
    let key = gen_buffer(32);
    let nonce = gen_buffer(12);

    let mut sink = BufferOutputStream::new();
    sink.open().unwrap();

    let mut writer = ChaCha20Writer::new(&mut sink, &key, &nonce);
    writer.open().unwrap();
    writer.write(b"through the cipher").unwrap();
    writer.close().unwrap();

    // the transform settled itself but never closed its nested stream
    sink.write(b"straight through").unwrap();
    sink.close().unwrap();
    assert!(sink.as_slice().ends_with(b"straight through"));
}

#[test]
fn file_leaves_round_trip_through_a_cipher() {
    let key = gen_buffer(32);
    let iv = gen_buffer(16);
    let plaintext = gen_buffer(10_000);

    let dir = std::env::temp_dir();
    let path = dir.join(format!("streamcrypt-it-{}.bin", std::process::id()));

    let sink = FileOutputStream::create_path(&path).unwrap();
    let mut writer = Aes256CbcWriter::aes256(sink, &key, &iv).unwrap();
    writer.open().unwrap();
    writer.write(&plaintext).unwrap();
    writer.close().unwrap();
    let mut sink = writer.into_inner();
    sink.close().unwrap();

    let source = FileInputStream::open_path(&path).unwrap();
    let mut reader = Aes256CbcReader::aes256(source, &key, &iv).unwrap();
    reader.open().unwrap();
    let recovered = read_to_end(&mut reader).unwrap();
    reader.close().unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(recovered, plaintext);
}

#[test]
fn boxed_streams_compose_dynamically() {
    let key = gen_buffer(32);
    let nonce = gen_buffer(12);
    let plaintext = gen_buffer(256);

    let sink: Box<dyn OutputStream> = Box::new(BufferOutputStream::new());
    let mut writer = ChaCha20Writer::new(sink, &key, &nonce);
    writer.open().unwrap();
    writer.write(&plaintext).unwrap();
    writer.close().unwrap();
}
