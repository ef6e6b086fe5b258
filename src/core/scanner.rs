//! Hand-written single-pass matcher for the built-in pattern families.
//!
//! Each family is an ordered table of [`Rule`]s, one per alternative of its
//! regex. At every cursor position the rules are tried in table order and the
//! first one that matches wins, exactly like leftmost-first alternation in a
//! backtracking regex engine.
//!
//! A rule never backtracks. Where the regex would (the optional prefix of
//! `[^\r\n\p{L}\p{N}]?\p{L}+`, the `\s*` of `\s*[\r\n]+`, the lookahead of
//! `\s+(?!\S)`) the rule computes the outcome the backtracking engine settles
//! on directly. Every rule scans forward at most over the run it matches, so
//! a full split is linear in the input length.

use std::fmt;
use std::ops::Range;

use super::patterns::PatternFamily;
use super::unicode::{
    fold_contraction_letter, is_letter, is_letter_prefix, is_newline, is_numeral, is_symbol,
    is_whitespace,
};

/// One alternative of a grammar.
///
/// Called with a cursor on a char boundary strictly inside `text`; returns the
/// byte offset where the match ends, or `None` if the alternative does not
/// match at the cursor.
type Rule = fn(&str, usize) -> Option<usize>;

/// `(?i:'s|'t|'re|'ve|'m|'ll|'d)|[^\r\n\p{L}\p{N}]?\p{L}+|\p{N}| ?[^\s\p{L}\p{N}]+[\r\n]*|\s*[\r\n]+|\s+(?!\S)|\s+`
const QWEN2_RULES: &[Rule] = &[
    folded_contraction,
    prefixed_letters,
    single_numeral,
    symbols_then_newlines,
    newline_run,
    trailing_whitespace,
    whitespace_run,
];

/// Same as qwen2 with `\p{N}{1,3}` in place of `\p{N}`.
const LLAMA3_RULES: &[Rule] = &[
    folded_contraction,
    prefixed_letters,
    numeral_triplet,
    symbols_then_newlines,
    newline_run,
    trailing_whitespace,
    whitespace_run,
];

/// `'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+`
const GPT2_RULES: &[Rule] = &[
    exact_contraction,
    spaced_letters,
    spaced_numerals,
    spaced_symbols,
    trailing_whitespace,
    whitespace_run,
];

/// Linear-time splitter for one [`PatternFamily`].
#[derive(Clone, Copy)]
pub struct Scanner {
    family: PatternFamily,
    rules: &'static [Rule],
}

impl Scanner {
    pub fn new(family: PatternFamily) -> Self {
        let rules = match family {
            PatternFamily::Gpt2 => GPT2_RULES,
            PatternFamily::Llama3 => LLAMA3_RULES,
            PatternFamily::Qwen2 => QWEN2_RULES,
        };
        Self { family, rules }
    }

    pub fn family(&self) -> PatternFamily {
        self.family
    }

    /// Iterate over the byte spans of the pretokens of `text`.
    ///
    /// Spans are non-empty, contiguous and cover `text` completely.
    pub fn spans<'t>(&self, text: &'t str) -> Spans<'t> {
        Spans {
            rules: self.rules,
            text,
            pos: 0,
        }
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("family", &self.family)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Iterator returned by [`Scanner::spans`].
#[derive(Clone)]
pub struct Spans<'t> {
    rules: &'static [Rule],
    text: &'t str,
    pos: usize,
}

impl Iterator for Spans<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        let start = self.pos;
        let first = self.text[start..].chars().next()?;

        // A rule reporting an empty match is treated as not matching. If no
        // rule applies at all, one code point is emitted so the scan advances.
        let end = self
            .rules
            .iter()
            .find_map(|rule| rule(self.text, start).filter(|&end| end > start))
            .unwrap_or(start + first.len_utf8());

        self.pos = end;
        Some(start..end)
    }
}

impl std::iter::FusedIterator for Spans<'_> {}

// =============================================================================
// Helpers
// =============================================================================

#[inline]
fn char_at(text: &str, pos: usize) -> Option<char> {
    text[pos..].chars().next()
}

/// End of the run of characters satisfying `class` starting at `pos`.
#[inline]
fn skip_while(text: &str, pos: usize, class: fn(char) -> bool) -> usize {
    let rest = &text[pos..];
    pos + rest.find(|c: char| !class(c)).unwrap_or(rest.len())
}

#[inline]
fn non_empty(start: usize, end: usize) -> Option<usize> {
    (end > start).then_some(end)
}

/// ` ?` in front of `class`: consume a space only if `class` matches after it.
#[inline]
fn optional_space(text: &str, pos: usize, class: fn(char) -> bool) -> usize {
    if text[pos..].starts_with(' ') && char_at(text, pos + 1).is_some_and(class) {
        pos + 1
    } else {
        pos
    }
}

// =============================================================================
// Rules
// =============================================================================

fn contraction(text: &str, pos: usize, fold: fn(char) -> char) -> Option<usize> {
    let mut chars = text[pos..].chars();
    if chars.next()? != '\'' {
        return None;
    }
    let first = chars.next()?;
    let end = pos + 1 + first.len_utf8();

    match fold(first) {
        's' | 't' | 'm' | 'd' => Some(end),
        lead @ ('r' | 'v' | 'l') => {
            let second = chars.next()?;
            let expected = if lead == 'l' { 'l' } else { 'e' };
            (fold(second) == expected).then(|| end + second.len_utf8())
        }
        _ => None,
    }
}

/// `(?i:'s|'t|'re|'ve|'m|'ll|'d)`
fn folded_contraction(text: &str, pos: usize) -> Option<usize> {
    contraction(text, pos, fold_contraction_letter)
}

/// `'s|'t|'re|'ve|'m|'ll|'d`
fn exact_contraction(text: &str, pos: usize) -> Option<usize> {
    contraction(text, pos, |c| c)
}

/// `[^\r\n\p{L}\p{N}]?\p{L}+`
///
/// The prefix is only taken when a letter follows it; otherwise the regex
/// backtracks to an empty prefix, which then needs a letter at the cursor.
fn prefixed_letters(text: &str, pos: usize) -> Option<usize> {
    let first = char_at(text, pos)?;
    let start = if is_letter(first) {
        pos
    } else if is_letter_prefix(first) {
        pos + first.len_utf8()
    } else {
        return None;
    };
    non_empty(start, skip_while(text, start, is_letter))
}

/// `\p{N}`
fn single_numeral(text: &str, pos: usize) -> Option<usize> {
    char_at(text, pos)
        .filter(|&c| is_numeral(c))
        .map(|c| pos + c.len_utf8())
}

/// `\p{N}{1,3}`
fn numeral_triplet(text: &str, pos: usize) -> Option<usize> {
    let end = text[pos..]
        .chars()
        .take(3)
        .take_while(|&c| is_numeral(c))
        .fold(pos, |end, c| end + c.len_utf8());
    non_empty(pos, end)
}

/// ` ?[^\s\p{L}\p{N}]+[\r\n]*`
fn symbols_then_newlines(text: &str, pos: usize) -> Option<usize> {
    let start = optional_space(text, pos, is_symbol);
    let end = non_empty(start, skip_while(text, start, is_symbol))?;
    Some(skip_while(text, end, is_newline))
}

/// `\s*[\r\n]+`
///
/// `\s*` first swallows the whole whitespace run and then gives characters
/// back until `[\r\n]+` can match, so the match ends right after the last
/// CR or LF of the run.
fn newline_run(text: &str, pos: usize) -> Option<usize> {
    let mut end = None;
    for (i, c) in text[pos..].char_indices() {
        if !is_whitespace(c) {
            break;
        }
        if is_newline(c) {
            end = Some(pos + i + 1);
        }
    }
    end
}

/// `\s+(?!\S)`
///
/// The whole whitespace run at the end of the input. Anywhere else the run
/// minus its last character, which is left to attach to what follows.
fn trailing_whitespace(text: &str, pos: usize) -> Option<usize> {
    let mut last = None;
    let mut end = pos;
    for (i, c) in text[pos..].char_indices() {
        if !is_whitespace(c) {
            break;
        }
        last = Some(pos + i);
        end = pos + i + c.len_utf8();
    }

    let last = last?;
    if end == text.len() {
        Some(end)
    } else {
        non_empty(pos, last)
    }
}

/// `\s+`
fn whitespace_run(text: &str, pos: usize) -> Option<usize> {
    non_empty(pos, skip_while(text, pos, is_whitespace))
}

fn spaced_run(text: &str, pos: usize, class: fn(char) -> bool) -> Option<usize> {
    let start = optional_space(text, pos, class);
    non_empty(start, skip_while(text, start, class))
}

/// ` ?\p{L}+`
fn spaced_letters(text: &str, pos: usize) -> Option<usize> {
    spaced_run(text, pos, is_letter)
}

/// ` ?\p{N}+`
fn spaced_numerals(text: &str, pos: usize) -> Option<usize> {
    spaced_run(text, pos, is_numeral)
}

/// ` ?[^\s\p{L}\p{N}]+`
fn spaced_symbols(text: &str, pos: usize) -> Option<usize> {
    spaced_run(text, pos, is_symbol)
}
