use crate::error::{Error, Result};
use crate::wordlist::WordCorpus;
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use zeroize::Zeroizing;

pub const DEFAULT_WORD_COUNT: usize = 8;

const KEY_LEN: usize = 32;
const SAMPLE_SPACE: u64 = 1 << 32;

pub fn generate_passphrase(corpus: &WordCorpus, count: usize) -> Result<Zeroizing<String>> {
    generate_passphrase_with_separator(corpus, count, "")
}

pub fn generate_passphrase_with_separator(
    corpus: &WordCorpus,
    count: usize,
    separator: &str,
) -> Result<Zeroizing<String>> {
    validate(corpus, count)?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    getrandom::fill(&mut key[..]).map_err(|e| Error::RandomSource(e.to_string()))?;

    tracing::debug!(words = count, corpus = corpus.len(), "drawing passphrase");
    Ok(draw_words(&key, corpus, count, separator))
}

pub fn entropy_bits(corpus: &WordCorpus, count: usize) -> f64 {
    count as f64 * corpus.bits_per_word()
}

fn validate(corpus: &WordCorpus, count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::InvalidConfiguration(
            "Word count must be a positive integer".to_string(),
        ));
    }
    if corpus.is_empty() {
        return Err(Error::InvalidConfiguration(
            "Word list contains no words".to_string(),
        ));
    }
    if corpus.len() as u64 > u64::from(u32::MAX) {
        return Err(Error::InvalidConfiguration(format!(
            "Word list too large ({} words, maximum is {})",
            corpus.len(),
            u32::MAX
        )));
    }
    Ok(())
}

// ChaCha20 keystream, unbiased rejection over 32-bit values.
fn draw_words(
    key: &[u8; KEY_LEN],
    corpus: &WordCorpus,
    count: usize,
    separator: &str,
) -> Zeroizing<String> {
    let corpus_len = corpus.len() as u64;
    let rejection_threshold = SAMPLE_SPACE - (SAMPLE_SPACE % corpus_len);

    let mut cipher = ChaCha20::new(key.into(), &[0u8; 12].into());
    let mut buffer = Zeroizing::new(vec![0u8; 512]);
    cipher.apply_keystream(&mut buffer);
    let mut pos = 0;

    let mut output = Zeroizing::new(String::new());
    let mut drawn = 0;

    while drawn < count {
        if pos + 4 > buffer.len() {
            buffer.fill(0);
            cipher.apply_keystream(&mut buffer);
            pos = 0;
        }

        let random_u32 = u32::from_le_bytes([
            buffer[pos],
            buffer[pos + 1],
            buffer[pos + 2],
            buffer[pos + 3],
        ]);
        pos += 4;

        if u64::from(random_u32) < rejection_threshold {
            let index = (u64::from(random_u32) % corpus_len) as usize;
            if drawn > 0 {
                output.push_str(separator);
            }
            output.push_str(&corpus.words()[index]);
            drawn += 1;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_corpus() -> WordCorpus {
        WordCorpus::parse("alpha bravo charlie delta echo foxtrot golf hotel india juliett").unwrap()
    }

    fn is_capitalized_ascii(word: &str) -> bool {
        let mut chars = word.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_lowercase())
    }

    fn split_words(passphrase: &str) -> Vec<&str> {
        let mut starts: Vec<usize> = passphrase
            .char_indices()
            .filter(|(_, c)| c.is_ascii_uppercase())
            .map(|(i, _)| i)
            .collect();
        starts.push(passphrase.len());
        starts.windows(2).map(|w| &passphrase[w[0]..w[1]]).collect()
    }

    #[test]
    fn test_passphrase_composition() {
        let corpus = sample_corpus();

        for _ in 0..50 {
            let passphrase = generate_passphrase(&corpus, DEFAULT_WORD_COUNT).unwrap();
            let words = split_words(&passphrase);

            assert_eq!(words.len(), DEFAULT_WORD_COUNT, "{}", &**passphrase);
            for word in &words {
                assert!(is_capitalized_ascii(word), "Invalid word \"{word}\"");
                assert!(corpus.words().iter().any(|w| w == word));
            }
            assert_eq!(words.concat(), *passphrase);
        }
    }

    #[test]
    fn test_passphrase_with_separator() {
        let corpus = sample_corpus();
        let passphrase = generate_passphrase_with_separator(&corpus, 5, "-").unwrap();
        let words: Vec<&str> = passphrase.split('-').collect();
        assert_eq!(words.len(), 5);
        assert!(words.iter().all(|w| corpus.words().iter().any(|c| c == w)));
    }

    #[test]
    fn test_zero_count_rejected() {
        let corpus = sample_corpus();
        let result = generate_passphrase(&corpus, 0);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let result = WordCorpus::from_words(Vec::<&str>::new())
            .and_then(|corpus| generate_passphrase(&corpus, DEFAULT_WORD_COUNT));
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_single_word_corpus() {
        let corpus = WordCorpus::parse("only").unwrap();
        let passphrase = generate_passphrase(&corpus, 3).unwrap();
        assert_eq!(*passphrase, "OnlyOnlyOnly");
        assert_eq!(entropy_bits(&corpus, 3), 0.0);
    }

    #[test]
    fn test_draw_deterministic_for_key() {
        let corpus = sample_corpus();
        let key = [42u8; KEY_LEN];
        let first = draw_words(&key, &corpus, 24, " ");
        let second = draw_words(&key, &corpus, 24, " ");
        assert_eq!(*first, *second);

        let other = draw_words(&[7u8; KEY_LEN], &corpus, 24, " ");
        assert_ne!(*first, *other);
    }

    #[test]
    fn test_fresh_key_per_call() {
        let corpus = WordCorpus::from_words((0..7776).map(|i| format!("w{i}"))).unwrap();
        let first = generate_passphrase_with_separator(&corpus, 8, " ").unwrap();
        let second = generate_passphrase_with_separator(&corpus, 8, " ").unwrap();
        assert_ne!(*first, *second);
    }

    #[test]
    fn test_uniform_distribution() {
        let corpus = sample_corpus();
        let draws = 100_000;
        let passphrase = generate_passphrase_with_separator(&corpus, draws, " ").unwrap();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in passphrase.split(' ') {
            *counts.entry(word).or_default() += 1;
        }

        assert_eq!(counts.len(), corpus.len());
        assert_eq!(counts.values().sum::<usize>(), draws);

        // Standard deviation of each frequency is about 0.00095.
        let expected = 1.0 / corpus.len() as f64;
        for (word, count) in &counts {
            let frequency = *count as f64 / draws as f64;
            assert!(
                (frequency - expected).abs() < 0.006,
                "Frequency of {word} is {frequency:.4}, expected {expected:.4}"
            );
        }
    }

    #[test]
    fn test_rejection_threshold() {
        let threshold = |len: u64| SAMPLE_SPACE - (SAMPLE_SPACE % len);

        assert_eq!(threshold(1), SAMPLE_SPACE);
        assert_eq!(threshold(2), SAMPLE_SPACE);
        assert_eq!(threshold(10) % 10, 0);
        assert_eq!(threshold(7776) % 7776, 0);
        assert!(SAMPLE_SPACE - threshold(10000) < 10000);
    }

    #[test]
    fn test_entropy_bits() {
        let corpus = WordCorpus::from_words((0..1024).map(|i| format!("w{i}"))).unwrap();
        assert_eq!(entropy_bits(&corpus, 8), 80.0);
    }
}
