use crate::error::{Error, Result};
use crate::wordlist::WordCorpus;
use sha2::{Digest, Sha512};
use std::sync::OnceLock;
use zeroize::Zeroizing;

const PAD_UNIT: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PAD_REPETITIONS: usize = 1000;

pub const DIGEST_LEN: usize = 64;
pub const DERIVED_HEX_LEN: usize = 64;
const DIGEST_BITS: f64 = (DIGEST_LEN * 8) as f64;

const HEX: &[u8] = b"0123456789abcdef";
const DIGITS: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const SPECIAL: &[u8] =
    b"!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

static CONSTANT_PAD: OnceLock<String> = OnceLock::new();

pub fn constant_pad() -> &'static str {
    CONSTANT_PAD.get_or_init(|| PAD_UNIT.repeat(PAD_REPETITIONS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Hex,
    Alphanumeric,
    /// Printable ASCII from `!` to `~`.
    Special,
    Digits,
}

impl Encoding {
    pub fn alphabet(self) -> &'static [u8] {
        match self {
            Self::Hex => HEX,
            Self::Alphanumeric => ALPHANUMERIC,
            Self::Special => SPECIAL,
            Self::Digits => DIGITS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hex => "Hexadecimal",
            Self::Alphanumeric => "Alphanumeric",
            Self::Special => "Special characters",
            Self::Digits => "Digits",
        }
    }

    pub fn entropy_bits(self, output_len: usize) -> f64 {
        let bits = output_len as f64 * (self.alphabet().len() as f64).log2();
        bits.min(DIGEST_BITS)
    }
}

/// SHA-512 over `pad || site_label || master_secret`.
///
/// The fields are joined without a delimiter, so `("ab", "c")` and
/// `("a", "bc")` hash the same bytes. Existing derived passwords depend on
/// this layout.
pub fn digest(site_label: &str, master_secret: &str) -> Zeroizing<[u8; DIGEST_LEN]> {
    tracing::debug!(
        site_bytes = site_label.len(),
        secret_bytes = master_secret.len(),
        "hashing derivation input"
    );

    let mut hasher = Sha512::new();
    hasher.update(constant_pad().as_bytes());
    hasher.update(site_label.as_bytes());
    hasher.update(master_secret.as_bytes());
    let hash = hasher.finalize();

    let mut output = Zeroizing::new([0u8; DIGEST_LEN]);
    output.copy_from_slice(&hash);
    output
}

pub fn derive(site_label: &str, master_secret: &str) -> Zeroizing<String> {
    let digest = digest(site_label, master_secret);
    hex_prefix(&digest, DERIVED_HEX_LEN)
}

pub fn render(
    digest: &[u8; DIGEST_LEN],
    encoding: Encoding,
    max_length: Option<usize>,
) -> Result<Zeroizing<String>> {
    if max_length == Some(0) {
        return Err(Error::InvalidConfiguration(
            "Output length must be at least 1".to_string(),
        ));
    }

    if encoding == Encoding::Hex {
        let length = max_length.map_or(DERIVED_HEX_LEN, |l| l.min(DERIVED_HEX_LEN));
        return Ok(hex_prefix(digest, length));
    }

    let alphabet = encoding.alphabet();
    let radix = alphabet.len() as u64;
    let limit = max_length.unwrap_or(usize::MAX);

    // Least significant digit comes out first.
    let mut number = Zeroizing::new(digest.to_vec());
    let mut reversed = Zeroizing::new(Vec::with_capacity(DIGEST_LEN * 2));
    while reversed.len() < limit && !is_zero(&number) {
        let remainder = div_rem_small(&mut number, radix);
        reversed.push(alphabet[remainder as usize]);
    }

    let mut output = Zeroizing::new(String::with_capacity(reversed.len()));
    output.extend(reversed.iter().rev().map(|&b| b as char));
    Ok(output)
}

/// Words appended in selection order, stopping before `max_length`
/// characters would be exceeded. Returns the text and the number of words.
pub fn render_words(
    digest: &[u8; DIGEST_LEN],
    corpus: &WordCorpus,
    max_length: Option<usize>,
) -> Result<(Zeroizing<String>, usize)> {
    if max_length == Some(0) {
        return Err(Error::InvalidConfiguration(
            "Output length must be at least 1".to_string(),
        ));
    }
    if corpus.len() < 2 {
        return Err(Error::InvalidConfiguration(
            "Word encoding needs at least two words".to_string(),
        ));
    }
    if corpus.len() as u64 > u64::from(u32::MAX) {
        return Err(Error::InvalidConfiguration(format!(
            "Word list too large ({} words, maximum is {})",
            corpus.len(),
            u32::MAX
        )));
    }

    let radix = corpus.len() as u64;
    let limit = max_length.unwrap_or(usize::MAX);

    let mut number = Zeroizing::new(digest.to_vec());
    let mut output = Zeroizing::new(String::new());
    let mut chars = 0;
    let mut words = 0;

    while !is_zero(&number) {
        let index = div_rem_small(&mut number, radix) as usize;
        let word = &corpus.words()[index];
        let word_chars = word.chars().count();
        if chars + word_chars > limit {
            break;
        }
        output.push_str(word);
        chars += word_chars;
        words += 1;
    }

    if words == 0 {
        return Err(Error::InvalidConfiguration(format!(
            "Output length {} is too short for any word",
            limit
        )));
    }

    Ok((output, words))
}

pub fn words_entropy_bits(corpus: &WordCorpus, word_count: usize) -> f64 {
    (word_count as f64 * corpus.bits_per_word()).min(DIGEST_BITS)
}

fn hex_prefix(digest: &[u8; DIGEST_LEN], length: usize) -> Zeroizing<String> {
    let mut output = Zeroizing::new(String::with_capacity(DIGEST_LEN * 2));
    for byte in digest {
        output.push(HEX[(byte >> 4) as usize] as char);
        output.push(HEX[(byte & 0x0f) as usize] as char);
    }
    output.truncate(length);
    output
}

fn is_zero(number: &[u8]) -> bool {
    number.iter().all(|&b| b == 0)
}

// Divisor must fit in 32 bits.
fn div_rem_small(number: &mut [u8], divisor: u64) -> u64 {
    let mut remainder = 0u64;
    for byte in number.iter_mut() {
        let acc = (remainder << 8) | u64::from(*byte);
        *byte = (acc / divisor) as u8;
        remainder = acc % divisor;
    }
    remainder
}
