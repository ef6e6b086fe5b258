//! Pretokenization pattern families.
//!
//! Each family is a priority-ordered alternation. The regex strings below are
//! the canonical definitions and are what the regex backends compile; the
//! scanner implements the same alternations rule by rule.
//!
//! | Family   | Numerals          | Contractions      | Newline rules |
//! |----------|-------------------|-------------------|---------------|
//! | `qwen2`  | one per pretoken  | case-insensitive  | yes           |
//! | `llama3` | up to three       | case-insensitive  | yes           |
//! | `gpt2`   | whole run         | case-sensitive    | no            |

use std::fmt;
use std::str::FromStr;

use super::pretokenizer::PretokenizerError;

/// Qwen2 pretokenization pattern.
///
/// Same shape as cl100k_base except that `\p{N}` matches exactly one numeral,
/// so `"2024"` becomes four pretokens.
pub const QWEN2_PATTERN: &str = r"(?i:'s|'t|'re|'ve|'m|'ll|'d)|[^\r\n\p{L}\p{N}]?\p{L}+|\p{N}| ?[^\s\p{L}\p{N}]+[\r\n]*|\s*[\r\n]+|\s+(?!\S)|\s+";

/// Llama 3 pretokenization pattern (numerals grouped up to three).
pub const LLAMA3_PATTERN: &str = r"(?i:'s|'t|'re|'ve|'m|'ll|'d)|[^\r\n\p{L}\p{N}]?\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]+[\r\n]*|\s*[\r\n]+|\s+(?!\S)|\s+";

/// GPT-2 pretokenization pattern.
pub const GPT2_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// A built-in pretokenization grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PatternFamily {
    /// GPT-2 (r50k_base) and tokenizers derived from it
    Gpt2,
    /// Meta Llama 3 family
    Llama3,
    /// Qwen2 / Qwen2.5 and distillations built on its vocabulary
    #[default]
    Qwen2,
}

impl PatternFamily {
    /// All built-in families, in declaration order.
    pub const ALL: [PatternFamily; 3] = [Self::Gpt2, Self::Llama3, Self::Qwen2];

    /// Resolve a family from a model or pretokenizer name.
    ///
    /// Matching is ASCII case-insensitive and ignores surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let is = |aliases: &[&str]| aliases.iter().any(|a| name.eq_ignore_ascii_case(a));

        if is(&["qwen2", "qwen2.5", "qwen", "deepseek-r1-qwen", "kormo"]) {
            return Some(Self::Qwen2);
        }

        if is(&[
            "llama3",
            "llama3.1",
            "llama3.2",
            "llama3.3",
            "llama-v3",
            "llama-bpe",
            "smaug-bpe",
            "falcon3",
        ]) {
            return Some(Self::Llama3);
        }

        if is(&["gpt2", "gpt-2", "r50k_base"]) {
            return Some(Self::Gpt2);
        }

        None
    }

    /// Canonical name, accepted by [`PatternFamily::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Gpt2 => "gpt2",
            Self::Llama3 => "llama3",
            Self::Qwen2 => "qwen2",
        }
    }

    /// The regex source for this family.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Gpt2 => GPT2_PATTERN,
            Self::Llama3 => LLAMA3_PATTERN,
            Self::Qwen2 => QWEN2_PATTERN,
        }
    }
}

impl fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternFamily {
    type Err = PretokenizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| PretokenizerError::UnknownPattern(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(PatternFamily::from_name("qwen2"), Some(PatternFamily::Qwen2));
        assert_eq!(PatternFamily::from_name(" QWEN2 "), Some(PatternFamily::Qwen2));
        assert_eq!(
            PatternFamily::from_name("deepseek-r1-qwen"),
            Some(PatternFamily::Qwen2)
        );
        assert_eq!(PatternFamily::from_name("llama-bpe"), Some(PatternFamily::Llama3));
        assert_eq!(PatternFamily::from_name("Llama3.1"), Some(PatternFamily::Llama3));
        assert_eq!(PatternFamily::from_name("gpt2"), Some(PatternFamily::Gpt2));
        assert_eq!(PatternFamily::from_name("cl100k_base"), None);
        assert_eq!(PatternFamily::from_name(""), None);
    }

    #[test]
    fn test_name_roundtrip() {
        for family in PatternFamily::ALL {
            assert_eq!(PatternFamily::from_name(family.name()), Some(family));
            assert_eq!(family.to_string().parse::<PatternFamily>().unwrap(), family);
        }
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "sentencepiece".parse::<PatternFamily>().unwrap_err();
        assert!(matches!(err, PretokenizerError::UnknownPattern(ref n) if n == "sentencepiece"));
    }

    #[test]
    fn test_default_is_qwen2() {
        assert_eq!(PatternFamily::default(), PatternFamily::Qwen2);
        assert_eq!(PatternFamily::default().pattern(), QWEN2_PATTERN);
    }

    #[test]
    fn test_patterns_compile() {
        for family in PatternFamily::ALL {
            assert!(
                fancy_regex::Regex::new(family.pattern()).is_ok(),
                "{family} pattern failed to compile"
            );
        }
    }
}
