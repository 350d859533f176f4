use anyhow::{Context, Result};
use console::{Style, Term};
use rpassword::read_password;
use std::io::{self, BufRead};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

pub const MIN_SAFE_ENTROPY: f64 = 100.0;
pub const PARANOID_ENTROPY: f64 = 300.0;

pub const MIN_SAFE_WORD_COUNT: usize = 8;

pub enum OutputKind {
    Derived {
        charset: &'static str,
    },
    Passphrase {
        word_count: usize,
        corpus_size: usize,
    },
}

pub struct OutputSummary {
    pub kind: OutputKind,
    pub entropy: f64,
    /// `None` when clipboard output is disabled.
    pub copied: Option<bool>,
}

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stderr)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stderr).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

pub trait SecretReader {
    fn read_secret(&mut self, prompt: &str) -> Result<Zeroizing<String>>;
}

pub struct TerminalReader {
    term: Term,
}

impl TerminalReader {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for TerminalReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretReader for TerminalReader {
    fn read_secret(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        self.term.write_str(prompt)?;
        self.term.flush()?;
        let secret = read_password().context("Failed to read master secret")?;
        Ok(Zeroizing::new(secret))
    }
}

pub fn confirm_secret<R, F>(reader: &mut R, mut on_mismatch: F) -> Result<Zeroizing<String>>
where
    R: SecretReader + ?Sized,
    F: FnMut(),
{
    loop {
        let first = reader.read_secret("Master secret: ")?;
        let second = reader.read_secret("Repeat master secret: ")?;

        if first.as_bytes() == second.as_bytes() {
            return Ok(first);
        }

        tracing::debug!("master secret entries differ");
        on_mismatch();
    }
}

pub fn prompt_site_label() -> Result<Zeroizing<String>> {
    let term = Term::stderr();
    term.write_line("Site the password is used for (should be unique):")?;
    term.write_str("Site: ")?;
    term.flush()?;

    let stdin = io::stdin();
    read_site_label(&mut stdin.lock())
}

// Only the line terminator is removed.
fn read_site_label<R: BufRead>(input: &mut R) -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    let read = input
        .read_line(&mut line)
        .context("Failed to read site label")?;

    if read == 0 {
        anyhow::bail!("No site label provided");
    }

    let trimmed_len = strip_line_ending(&line).len();
    line.truncate(trimmed_len);
    Ok(line)
}

fn strip_line_ending(s: &str) -> &str {
    let s = s.strip_suffix('\n').unwrap_or(s);
    s.strip_suffix('\r').unwrap_or(s)
}

pub fn normalize_input(s: &str, nfc: bool) -> Zeroizing<String> {
    if nfc {
        Zeroizing::new(s.nfc().collect())
    } else {
        Zeroizing::new(s.to_string())
    }
}

fn control_character_positions(s: &str) -> Vec<usize> {
    s.chars()
        .enumerate()
        .filter(|(_, c)| c.is_control())
        .map(|(pos, _)| pos)
        .collect()
}

pub fn warn_suspicious_input(s: &str, input_name: &str) -> Result<()> {
    let term = Term::stderr();

    if s.is_empty() {
        term.write_line(&format!("WARNING: {} is empty", input_name))?;
        return Ok(());
    }

    let positions = control_character_positions(s);
    if !positions.is_empty() {
        term.write_line(&format!(
            "WARNING: {} contains {} control character(s) at position(s): {}",
            input_name,
            positions.len(),
            positions
                .iter()
                .map(|pos| pos.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))?;
    }

    Ok(())
}

pub fn report_mismatch() {
    let term = Term::stderr();
    term.write_line("Secrets do not match, please try again.").ok();
}

pub fn security_rating(entropy: f64) -> (&'static str, bool) {
    if entropy >= PARANOID_ENTROPY {
        ("Paranoid", true)
    } else if entropy >= MIN_SAFE_ENTROPY {
        ("Strong", true)
    } else {
        ("Weak", false)
    }
}

pub fn display_output(
    output: &Zeroizing<String>,
    summary: &OutputSummary,
    options: &DisplayOptions,
) -> Result<()> {
    println!("{}", &**output);

    if !options.quiet {
        display_stats(output.chars().count(), summary, options)?;
    }

    Ok(())
}

fn status_style(secure: bool, options: &DisplayOptions) -> Style {
    match (options.color_support, secure) {
        (false, _) => Style::new(),
        (true, true) => Style::new().green(),
        (true, false) => Style::new().yellow(),
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

fn display_stats(length: usize, summary: &OutputSummary, options: &DisplayOptions) -> Result<()> {
    let term = Term::stderr();
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);

    let (status_text, entropy_secure) = security_rating(summary.entropy);
    let entropy_style = status_style(entropy_secure, options);
    let entropy_icon = if entropy_secure { check_ok } else { check_warn };

    term.write_line("")?;
    term.write_line("Stats:")?;
    term.write_line(&format!(
        "  ├─ Entropy    {} {} bits ({})",
        entropy_style.apply_to(format!("[{}]", entropy_icon)),
        entropy_style.apply_to(format!("{:.1}", summary.entropy)),
        entropy_style.apply_to(status_text)
    ))?;
    term.write_line(&format!(
        "  ├─ Length     {} {}",
        length,
        plural(length, "char", "chars")
    ))?;

    match summary.kind {
        OutputKind::Derived { charset } => {
            term.write_line("  ├─ Hash       SHA-512")?;
            term.write_line(&format!("  ├─ Charset    {}", charset))?;
        }
        OutputKind::Passphrase {
            word_count,
            corpus_size,
        } => {
            let words_secure = word_count >= MIN_SAFE_WORD_COUNT;
            let words_style = status_style(words_secure, options);
            term.write_line(&format!(
                "  ├─ Words      {} {} {}",
                words_style.apply_to(format!(
                    "[{}]",
                    if words_secure { check_ok } else { check_warn }
                )),
                words_style.apply_to(word_count),
                plural(word_count, "word", "words")
            ))?;
            term.write_line(&format!(
                "  ├─ Wordlist   {} {}",
                corpus_size,
                plural(corpus_size, "word", "words")
            ))?;
        }
    }

    let clipboard = match summary.copied {
        Some(true) => "Copied",
        Some(false) => "Unavailable",
        None => "Disabled",
    };
    term.write_line(&format!("  └─ Clipboard  {}", clipboard))?;

    term.write_line(&format!(
        "\n{} Security: {}",
        entropy_style.apply_to(format!("[{}]", entropy_icon)),
        entropy_style.apply_to(status_text)
    ))?;

    Ok(())
}
