use std::ops::Range;
use std::str::FromStr;

use aho_corasick::{AhoCorasick, MatchKind};
use fancy_regex::Regex as FancyRegex;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(feature = "pcre2")]
use pcre2::bytes::Regex as Pcre2Regex;

use super::patterns::PatternFamily;
use super::scanner::Scanner;

#[derive(Error, Debug)]
pub enum PretokenizerError {
    #[error("Regex compilation error (fancy-regex): {0}")]
    FancyRegexError(#[from] fancy_regex::Error),
    #[cfg(feature = "pcre2")]
    #[error("Regex compilation error (PCRE2): {0}")]
    Pcre2Error(#[from] pcre2::Error),
    #[error("Aho-Corasick build error: {0}")]
    AhoCorasickError(#[from] aho_corasick::BuildError),
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(#[from] EncodingError),
    #[error("Unknown pretokenizer: {0}")]
    UnknownPattern(String),
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),
    #[error("Scanner backend needs a built-in pattern family, not a custom pattern")]
    ScannerUnavailable,
    #[error("PCRE2 feature not enabled. Compile with --features pcre2")]
    Pcre2NotEnabled,
}

/// Why input handed over as raw code units could not be read as text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingError {
    #[error("invalid UTF-8 after byte {valid_up_to}")]
    Utf8 { valid_up_to: usize },
    #[error("unpaired UTF-16 surrogate {unit:#06x} at code unit {index}")]
    UnpairedSurrogate { index: usize, unit: u16 },
}

/// Which matching engine a [`Pretokenizer`] runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Hand-written linear-time scanner (built-in families only)
    #[default]
    Scanner,
    /// fancy-regex, a backtracking engine with lookaround support
    FancyRegex,
    /// PCRE2 with JIT (requires the `pcre2` feature)
    Pcre2,
}

impl BackendKind {
    /// Canonical name, accepted by `str::parse`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Scanner => "scanner",
            Self::FancyRegex => "fancy-regex",
            Self::Pcre2 => "pcre2",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = PretokenizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scanner" => Ok(Self::Scanner),
            "fancy" | "fancy-regex" | "fancy_regex" | "regex" => Ok(Self::FancyRegex),
            "pcre2" => Ok(Self::Pcre2),
            _ => Err(PretokenizerError::UnknownBackend(s.to_string())),
        }
    }
}

/// Matching engine behind a [`Pretokenizer`].
enum Backend {
    Scanner(Scanner),
    FancyRegex(Box<FancyRegex>),
    #[cfg(feature = "pcre2")]
    Pcre2(Pcre2Regex),
}

impl Backend {
    fn compile(
        kind: BackendKind,
        family: Option<PatternFamily>,
        pattern: &str,
    ) -> Result<Self, PretokenizerError> {
        match kind {
            BackendKind::Scanner => family
                .map(|family| Backend::Scanner(Scanner::new(family)))
                .ok_or(PretokenizerError::ScannerUnavailable),
            BackendKind::FancyRegex => {
                Ok(Backend::FancyRegex(Box::new(FancyRegex::new(pattern)?)))
            }
            BackendKind::Pcre2 => Self::compile_pcre2(pattern),
        }
    }

    #[cfg(feature = "pcre2")]
    fn compile_pcre2(pattern: &str) -> Result<Self, PretokenizerError> {
        let mut regex_builder = pcre2::bytes::RegexBuilder::new();
        regex_builder.jit_if_available(true);
        regex_builder.utf(true);
        regex_builder.ucp(true);
        Ok(Backend::Pcre2(regex_builder.build(pattern)?))
    }

    #[cfg(not(feature = "pcre2"))]
    fn compile_pcre2(_pattern: &str) -> Result<Self, PretokenizerError> {
        Err(PretokenizerError::Pcre2NotEnabled)
    }

    fn kind(&self) -> BackendKind {
        match self {
            Backend::Scanner(_) => BackendKind::Scanner,
            Backend::FancyRegex(_) => BackendKind::FancyRegex,
            #[cfg(feature = "pcre2")]
            Backend::Pcre2(_) => BackendKind::Pcre2,
        }
    }

    /// Byte spans covering all of `text`.
    fn spans(&self, text: &str) -> Vec<Range<usize>> {
        match self {
            Backend::Scanner(scanner) => scanner.spans(text).collect(),
            Backend::FancyRegex(regex) => {
                let mut matches = Vec::new();
                for m in regex.find_iter(text) {
                    match m {
                        Ok(m) => matches.push(m.start()..m.end()),
                        Err(err) => {
                            warn!(error = %err, "fancy-regex gave up, keeping the rest as one pretoken");
                            break;
                        }
                    }
                }
                fill_gaps(text.len(), matches)
            }
            #[cfg(feature = "pcre2")]
            Backend::Pcre2(regex) => {
                let mut matches = Vec::new();
                for m in regex.find_iter(text.as_bytes()) {
                    match m {
                        Ok(m) => matches.push(m.start()..m.end()),
                        Err(err) => {
                            warn!(error = %err, "PCRE2 gave up, keeping the rest as one pretoken");
                            break;
                        }
                    }
                }
                fill_gaps(text.len(), matches)
            }
        }
    }
}

/// Turn regex matches into a lossless segmentation.
///
/// Empty matches are dropped and every stretch no match covers becomes a
/// span of its own, so the spans always tile `0..len`.
fn fill_gaps(len: usize, matches: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut spans = Vec::with_capacity(matches.len() + 1);
    let mut last_end = 0;

    for m in matches {
        if m.is_empty() || m.start < last_end {
            continue;
        }
        if m.start > last_end {
            spans.push(last_end..m.start);
        }
        last_end = m.end;
        spans.push(m);
    }

    if last_end < len {
        spans.push(last_end..len);
    }

    spans
}

/// Splits text into pretokens with one of the GPT-style grammars.
///
/// Pretokens are contiguous, non-empty substrings of the input; concatenated
/// in order they reproduce the input exactly.
///
/// # Backends
///
/// By default a built-in family runs on the hand-written [`Scanner`], which is
/// linear in the input length. The same grammar can run on fancy-regex, or on
/// PCRE2 with the `pcre2` feature:
///
/// ```
/// use pretok::{BackendKind, PatternFamily, Pretokenizer};
///
/// let scanner = Pretokenizer::new(PatternFamily::Qwen2);
/// let regex = Pretokenizer::new(PatternFamily::Qwen2)
///     .with_backend(BackendKind::FancyRegex)
///     .unwrap();
///
/// let text = " Hello\n I'm ok  @\n Hel";
/// assert_eq!(scanner.split(text), regex.split(text));
/// ```
///
/// Custom patterns always run on a regex backend; see
/// [`Pretokenizer::from_pattern`].
///
/// # Thread Safety
///
/// A `Pretokenizer` holds no per-call state. Share it across threads freely;
/// [`Pretokenizer::split_batch`] splits independent inputs on the Rayon pool.
pub struct Pretokenizer {
    family: Option<PatternFamily>,
    pattern: String,
    backend: Backend,
    special_tokens: Vec<String>,
    special_matcher: Option<AhoCorasick>,
}

impl Pretokenizer {
    /// Scanner-backed pretokenizer for a built-in family.
    pub fn new(family: PatternFamily) -> Self {
        debug!(%family, "building scanner pretokenizer");
        Self {
            family: Some(family),
            pattern: family.pattern().to_string(),
            backend: Backend::Scanner(Scanner::new(family)),
            special_tokens: Vec::new(),
            special_matcher: None,
        }
    }

    /// Pretokenizer for a model or pretokenizer name such as `"qwen2"`,
    /// `"llama-bpe"` or `"gpt2"`.
    pub fn from_name(name: &str) -> Result<Self, PretokenizerError> {
        Ok(Self::new(name.parse()?))
    }

    /// Pretokenizer for an arbitrary regex, compiled with fancy-regex.
    ///
    /// If `pattern` is one of the built-in family patterns the family is
    /// recognised and [`BackendKind::Scanner`] stays available.
    pub fn from_pattern(pattern: &str) -> Result<Self, PretokenizerError> {
        let family = PatternFamily::ALL
            .into_iter()
            .find(|family| family.pattern() == pattern);
        let backend = Backend::compile(BackendKind::FancyRegex, family, pattern)?;
        debug!(?family, pattern, "compiled regex pretokenizer");

        Ok(Self {
            family,
            pattern: pattern.to_string(),
            backend,
            special_tokens: Vec::new(),
            special_matcher: None,
        })
    }

    /// Switch the matching engine.
    ///
    /// # Errors
    ///
    /// - [`PretokenizerError::ScannerUnavailable`] when asking a custom
    ///   pattern to run on the scanner
    /// - [`PretokenizerError::Pcre2NotEnabled`] when asking for PCRE2 without
    ///   the `pcre2` feature
    /// - a compilation error from the selected regex engine
    pub fn with_backend(mut self, kind: BackendKind) -> Result<Self, PretokenizerError> {
        if self.backend.kind() != kind {
            self.backend = Backend::compile(kind, self.family, &self.pattern)?;
            debug!(backend = ?kind, pattern = %self.pattern, "switched pretokenizer backend");
        }
        Ok(self)
    }

    /// Keep the given literal tokens intact in [`Pretokenizer::split_with_special`].
    ///
    /// Overlapping candidates resolve leftmost-longest, so `<|im_start|>` wins
    /// over a shorter token that is a prefix of it. Empty strings are ignored.
    pub fn with_special_tokens<S: AsRef<str>>(
        mut self,
        tokens: &[S],
    ) -> Result<Self, PretokenizerError> {
        let special_tokens: Vec<String> = tokens
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        self.special_matcher = if special_tokens.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(&special_tokens)?,
            )
        };
        debug!(count = special_tokens.len(), "registered special tokens");
        self.special_tokens = special_tokens;
        Ok(self)
    }

    /// The built-in family, or `None` for a custom pattern.
    pub fn family(&self) -> Option<PatternFamily> {
        self.family
    }

    /// The regex source of the grammar.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn special_tokens(&self) -> &[String] {
        &self.special_tokens
    }

    /// Split `text` into pretokens.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.split_spans(text)
            .into_iter()
            .map(|span| &text[span])
            .collect()
    }

    /// Byte ranges of the pretokens of `text`.
    pub fn split_spans(&self, text: &str) -> Vec<Range<usize>> {
        if text.is_empty() {
            return Vec::new();
        }
        self.backend.spans(text)
    }

    /// Pretoken ranges counted in code points rather than bytes.
    ///
    /// These are the offsets Python strings and UTF-32 buffers index with.
    pub fn split_char_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut chars = 0;
        self.split_spans(text)
            .into_iter()
            .map(|span| {
                let start = chars;
                chars += text[span].chars().count();
                start..chars
            })
            .collect()
    }

    /// Split `text`, emitting registered special tokens as whole pretokens.
    ///
    /// The grammar runs independently on each stretch between special tokens.
    /// Without registered special tokens this is [`Pretokenizer::split`].
    pub fn split_with_special<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let Some(ref special_matcher) = self.special_matcher else {
            return self.split(text);
        };

        let mut result = Vec::new();
        let mut last_end = 0;

        for m in special_matcher.find_iter(text) {
            if m.start() > last_end {
                result.extend(self.split(&text[last_end..m.start()]));
            }
            result.push(&text[m.start()..m.end()]);
            last_end = m.end();
        }

        if last_end < text.len() {
            result.extend(self.split(&text[last_end..]));
        }

        result
    }

    /// Split UTF-8 bytes, rejecting malformed input.
    pub fn split_bytes<'t>(&self, bytes: &'t [u8]) -> Result<Vec<&'t str>, PretokenizerError> {
        let text = std::str::from_utf8(bytes).map_err(|e| EncodingError::Utf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        Ok(self.split(text))
    }

    /// Split UTF-16 code units, rejecting unpaired surrogates.
    pub fn split_utf16(&self, units: &[u16]) -> Result<Vec<String>, PretokenizerError> {
        let mut text = String::with_capacity(units.len());
        let mut index = 0;

        for decoded in char::decode_utf16(units.iter().copied()) {
            match decoded {
                Ok(c) => {
                    text.push(c);
                    index += c.len_utf16();
                }
                Err(err) => {
                    return Err(EncodingError::UnpairedSurrogate {
                        index,
                        unit: err.unpaired_surrogate(),
                    }
                    .into())
                }
            }
        }

        Ok(self.split(&text).into_iter().map(str::to_string).collect())
    }

    /// Split many independent texts in parallel.
    pub fn split_batch<'t, S>(&self, texts: &'t [S]) -> Vec<Vec<&'t str>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.split(text.as_ref()))
            .collect()
    }

    /// Batch version of [`Pretokenizer::split_with_special`].
    pub fn split_batch_with_special<'t, S>(&self, texts: &'t [S]) -> Vec<Vec<&'t str>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.split_with_special(text.as_ref()))
            .collect()
    }
}

impl Default for Pretokenizer {
    fn default() -> Self {
        Self::new(PatternFamily::default())
    }
}

impl std::fmt::Debug for Pretokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pretokenizer")
            .field("family", &self.family)
            .field("backend", &self.backend.kind())
            .field("special_tokens", &self.special_tokens)
            .finish()
    }
}

/// Split `text` with the qwen2 grammar on the scanner.
pub fn split(text: &str) -> Vec<&str> {
    Scanner::new(PatternFamily::Qwen2)
        .spans(text)
        .map(|span| &text[span])
        .collect()
}
