use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

pub const DEFAULT_WORDLIST_PATH: &str = "google-10000-english-usa.txt";

pub fn normalize_word(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCorpus {
    words: Vec<String>,
}

impl WordCorpus {
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| normalize_word(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(Error::InvalidConfiguration(
                "Word list contains no words".to_string(),
            ));
        }

        Ok(Self { words })
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::from_words(text.split_whitespace())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let corpus = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            words = corpus.len(),
            "loaded word list"
        );
        Ok(corpus)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn bits_per_word(&self) -> f64 {
        (self.words.len() as f64).log2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_word() {
        let cases = [
            ("hELLo", "Hello"),
            (" world ", "World"),
            ("\tTHE\n", "The"),
            ("a", "A"),
            ("already", "Already"),
            ("ÉCOLE", "École"),
            ("   ", ""),
        ];

        for (raw, expected) in cases {
            assert_eq!(normalize_word(raw), expected, "normalizing {raw:?}");
        }
    }

    #[test]
    fn test_normalization_idempotent() {
        let once = normalize_word("  mIxEd ");
        let twice = normalize_word(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_splits_on_any_whitespace() {
        let corpus = WordCorpus::parse("the of\nAND\r\nto\t\tin  \n\n").unwrap();
        assert_eq!(corpus.words(), ["The", "Of", "And", "To", "In"]);
        assert_eq!(corpus.len(), 5);
        assert!(!corpus.is_empty());
    }

    #[test]
    fn test_parse_preserves_order_and_duplicates() {
        let corpus = WordCorpus::parse("b a b").unwrap();
        assert_eq!(corpus.words(), ["B", "A", "B"]);
        assert_eq!(corpus.get(1), Some("A"));
        assert_eq!(corpus.get(3), None);
    }

    #[test]
    fn test_empty_corpus_rejected() {
        for text in ["", "   ", "\n\n\t"] {
            let result = WordCorpus::parse(text);
            assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        }

        let result = WordCorpus::from_words(Vec::<String>::new());
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_bits_per_word() {
        let corpus = WordCorpus::from_words(["a", "b", "c", "d"]).unwrap();
        assert_eq!(corpus.bits_per_word(), 2.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "the\nOF\nand").unwrap();

        let corpus = WordCorpus::load(file.path()).unwrap();
        assert_eq!(corpus.words(), ["The", "Of", "And"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let err = WordCorpus::load(&path).unwrap_err();
        match &err {
            Error::ResourceUnavailable { path: reported, .. } => assert_eq!(reported, &path),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_load_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = WordCorpus::load(file.path());
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }
}
