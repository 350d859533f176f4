mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hashpass::kdf::DIGEST_LEN;
use hashpass::{ClipboardSink, SystemClipboard, WordCorpus};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(
    name = "hashpass",
    version,
    about = "Stateless site passwords and random word passphrases"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print only the result
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive the password for a site from a master secret
    Derive(DeriveArgs),
    /// Generate a random passphrase from a word list
    Passphrase(PassphraseArgs),
}

#[derive(Args)]
struct DeriveArgs {
    #[arg(short, long, value_enum, default_value = "hex")]
    encoding: EncodingArg,

    /// Word list for `--encoding words`
    #[arg(
        short,
        long,
        env = "HASHPASS_WORDLIST",
        default_value = hashpass::wordlist::DEFAULT_WORDLIST_PATH
    )]
    wordlist: PathBuf,

    /// Maximum output length in characters
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    length: Option<u64>,

    /// Apply Unicode NFC normalization to the site and master secret
    #[arg(long)]
    nfc: bool,

    /// Do not copy the result to the clipboard
    #[arg(long, env = "HASHPASS_NO_CLIPBOARD")]
    no_clipboard: bool,
}

#[derive(Args)]
struct PassphraseArgs {
    #[arg(
        short,
        long,
        env = "HASHPASS_WORDLIST",
        default_value = hashpass::wordlist::DEFAULT_WORDLIST_PATH
    )]
    wordlist: PathBuf,

    /// Number of words
    #[arg(
        short,
        long,
        default_value_t = hashpass::generator::DEFAULT_WORD_COUNT as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    count: u64,

    #[arg(short, long, default_value = "")]
    separator: String,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
enum EncodingArg {
    Hex,
    Alphanumeric,
    Special,
    Digits,
    Words,
}

impl EncodingArg {
    fn charset(self) -> Option<hashpass::Encoding> {
        match self {
            Self::Hex => Some(hashpass::Encoding::Hex),
            Self::Alphanumeric => Some(hashpass::Encoding::Alphanumeric),
            Self::Special => Some(hashpass::Encoding::Special),
            Self::Digits => Some(hashpass::Encoding::Digits),
            Self::Words => None,
        }
    }
}

enum Rendering<'a> {
    Charset(hashpass::Encoding),
    Words(&'a WordCorpus),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ui::DisplayOptions {
        unicode_support: ui::detect_unicode_support(),
        color_support: ui::detect_color_support(),
        quiet: cli.quiet,
    };

    let mut clipboard = SystemClipboard::new();

    match cli.command {
        Command::Derive(args) => run_derive(args, &mut clipboard, &options),
        Command::Passphrase(args) => run_passphrase(args, &options),
    }
}

fn run_derive(
    args: DeriveArgs,
    clipboard: &mut SystemClipboard,
    options: &ui::DisplayOptions,
) -> Result<()> {
    let corpus = match args.encoding {
        EncodingArg::Words => Some(WordCorpus::load(&args.wordlist)?),
        _ => None,
    };
    let rendering = match (args.encoding.charset(), &corpus) {
        (Some(encoding), _) => Rendering::Charset(encoding),
        (None, Some(corpus)) => Rendering::Words(corpus),
        (None, None) => anyhow::bail!("Word encoding requires a word list"),
    };
    let max_length = args
        .length
        .map(usize::try_from)
        .transpose()
        .context("Output length out of range")?;

    let raw_label = ui::prompt_site_label()?;
    let site_label = ui::normalize_input(&raw_label, args.nfc);
    ui::warn_suspicious_input(&site_label, "Site label")?;

    let mut reader = ui::TerminalReader::new();
    let raw_secret = ui::confirm_secret(&mut reader, ui::report_mismatch)?;
    let master_secret = ui::normalize_input(&raw_secret, args.nfc);
    ui::warn_suspicious_input(&master_secret, "Master secret")?;

    let digest = hashpass::digest(&site_label, &master_secret);
    let sink = if args.no_clipboard {
        None
    } else {
        Some(clipboard as &mut dyn ClipboardSink)
    };
    let (output, summary) = produce_derived(&digest, rendering, max_length, sink)?;

    ui::display_output(&output, &summary, options)
}

// A failing sink only shows up as `copied == Some(false)`.
fn produce_derived(
    digest: &[u8; DIGEST_LEN],
    rendering: Rendering<'_>,
    max_length: Option<usize>,
    sink: Option<&mut dyn ClipboardSink>,
) -> Result<(Zeroizing<String>, ui::OutputSummary)> {
    let (output, charset, entropy) = match rendering {
        Rendering::Charset(encoding) => {
            let output = hashpass::render(digest, encoding, max_length)?;
            let entropy = encoding.entropy_bits(output.len());
            (output, encoding.name(), entropy)
        }
        Rendering::Words(corpus) => {
            let (output, words) = hashpass::render_words(digest, corpus, max_length)?;
            let entropy = hashpass::kdf::words_entropy_bits(corpus, words);
            (output, "Words", entropy)
        }
    };
    tracing::info!(charset, length = output.len(), "derived site password");

    let copied = sink.map(|sink| sink.try_send(&output));

    let summary = ui::OutputSummary {
        kind: ui::OutputKind::Derived { charset },
        entropy,
        copied,
    };
    Ok((output, summary))
}

fn run_passphrase(args: PassphraseArgs, options: &ui::DisplayOptions) -> Result<()> {
    let count = usize::try_from(args.count).context("Word count out of range")?;
    let corpus = WordCorpus::load(&args.wordlist)?;
    tracing::info!(words = corpus.len(), path = %args.wordlist.display(), "word list ready");

    let output = hashpass::generate_passphrase_with_separator(&corpus, count, &args.separator)?;

    let summary = ui::OutputSummary {
        kind: ui::OutputKind::Passphrase {
            word_count: count,
            corpus_size: corpus.len(),
        },
        entropy: hashpass::generator::entropy_bits(&corpus, count),
        copied: None,
    };

    ui::display_output(&output, &summary, options)
}
