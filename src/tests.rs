use voxell_rng::rng::XorShift128;

use crate::compressor::{Compressor, compression_ratio};

const SHORT_DATA: &[u8] = b"Hello, World!";
const LONG_DATA: &[u8] =
    b"This is a longer string to test the huffman coding algorithm. It should be able to handle various lengths and characters.";
const REPEATING_DATA: &[u8] = b"a baba da babble da dabble babble doo bee babble dabble dooble dee boo dooble daddle boo";
const SINGLE_SYMBOL_DATA: &[u8] = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const ABRACADABRA: &[u8] = b"abracadabra";
const NUL_DATA: &[u8] = b"\0\0\0x\0y\0\0";
const MULTILINE_DATA: &[u8] = "line one\nline two\r\n\ttabbed line three\n\n".as_bytes();
const UNICODE_DATA: &[u8] = "Grüße aus Köln, ça va? Ζεύς 😀 — 日本語のテキスト 😀😀".as_bytes();

fn rng_data(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = XorShift128::new(seed);
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        let next = rng.peek_next_u64();
        data.push((next & 0xFF) as u8);
        rng = XorShift128::new(next);
    }
    data
}

/// Skewed random text: mostly lowercase letters, a few spaces and newlines.
fn rng_text(len: usize, seed: u64) -> Vec<u8> {
    rng_data(len, seed)
        .into_iter()
        .map(|b| match b % 32 {
            0..=25 => b'a' + (b % 32) / 4,
            26..=29 => b' ',
            _ => b'\n',
        })
        .collect()
}

/// Inputs every alphabet must round-trip. Binary inputs are listed in [`binary_cases`].
fn text_cases() -> Vec<(Vec<u8>, &'static str)> {
    vec![
        (REPEATING_DATA.to_vec(), "repeating data"),
        (SHORT_DATA.to_vec(), "short data"),
        (LONG_DATA.to_vec(), "long data"),
        (SINGLE_SYMBOL_DATA.to_vec(), "single symbol data"),
        (ABRACADABRA.to_vec(), "abracadabra"),
        (NUL_DATA.to_vec(), "nul data"),
        (MULTILINE_DATA.to_vec(), "multiline data"),
        (UNICODE_DATA.to_vec(), "unicode data"),
        (rng_text(4000, 0xdeadcafe), "rng text"),
    ]
}

fn binary_cases() -> Vec<(Vec<u8>, &'static str)> {
    vec![(rng_data(1000, 0xdeadcafe), "rng data"), ((0..=255u8).collect(), "every byte")]
}

/// Round-trips every test case through `compressor`, panicking on the first mismatch.
///
/// Binary cases may be rejected, since the text alphabet refuses invalid UTF-8.
pub fn roundtrip_test<C: Compressor>(mut compressor: C) {
    let binary = binary_cases().into_iter().map(|(data, name)| (data, name, false));
    let cases = text_cases().into_iter().map(|(data, name)| (data, name, true)).chain(binary);

    for (test_case, test_name, required) in cases {
        match compressor.test_roundtrip(&test_case) {
            Ok(eq) => {
                let ratio = compression_ratio(eq.get_original(), eq.get_compressed());

                eprintln!(
                    "Compression ratio for {} with {}: {:.2}%",
                    test_name,
                    compressor.compressor_name(),
                    ratio * 100.0
                );

                assert!(
                    eq.is_successful(),
                    "Roundtrip test for {} failed at {}:\n\tExpected: {:?}\n\tGot: {:?}\n\tCompressed: {:?}",
                    compressor.compressor_name(),
                    test_name,
                    eq.get_original(),
                    eq.get_decompressed(),
                    eq.get_compressed(),
                );
            }
            Err(e) if !required => {
                eprintln!("{} rejected {}: {}", compressor.compressor_name(), test_name, e);
            }
            Err(e) => {
                panic!(
                    "Fatal error while trying to compress/decompress {} with {}: {}",
                    test_name,
                    compressor.compressor_name(),
                    e
                );
            }
        }
    }
}

#[test]
fn bytes_alphabet_round_trips_binary_data() {
    use crate::compressor::HuffmanCoding;
    use crate::symbols::Alphabet;

    let mut compressor = HuffmanCoding::new(Alphabet::Bytes);
    for (data, name) in binary_cases() {
        let result = compressor.test_roundtrip(&data).unwrap();
        assert!(result.is_successful(), "{} did not survive the round trip", name);
    }
}

#[test]
fn skewed_text_compresses() {
    use crate::compressor::HuffmanCoding;

    let data = rng_text(4000, 0x5eed);
    let result = HuffmanCoding::default().test_roundtrip(&data).unwrap();
    assert!(result.is_successful());
    assert!(result.ratio() < 0.8, "ratio was {}", result.ratio());
}
