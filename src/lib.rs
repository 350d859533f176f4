pub mod clipboard;
pub mod error;
pub mod generator;
pub mod kdf;
pub mod wordlist;

pub use clipboard::{ClipboardSink, SystemClipboard};
pub use error::{Error, Result};
pub use generator::{generate_passphrase, generate_passphrase_with_separator};
pub use kdf::{Encoding, derive, digest, render, render_words};
pub use wordlist::{WordCorpus, normalize_word};
