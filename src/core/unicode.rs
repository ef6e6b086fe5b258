//! Code point classes used by the pretokenization grammars.
//!
//! The regex patterns are written in terms of `\p{L}`, `\p{N}` and `\s`. The
//! scanner needs the same classes without a regex engine:
//!
//! - `\p{L}`: General_Category Letter (Lu, Ll, Lt, Lm, Lo)
//! - `\p{N}`: General_Category Number (Nd, Nl, No)
//! - `\s`: the White_Space property, which is what [`char::is_whitespace`] tests
//!
//! `char::is_alphabetic` is deliberately not used for letters: the Alphabetic
//! property also covers letter numbers and many combining marks, which `\p{L}`
//! does not.

use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// `\p{L}`
#[inline]
pub fn is_letter(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_alphabetic();
    }
    c.general_category_group() == GeneralCategoryGroup::Letter
}

/// `\p{N}`
#[inline]
pub fn is_numeral(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_digit();
    }
    c.general_category_group() == GeneralCategoryGroup::Number
}

/// `\s`
#[inline]
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// `[\r\n]`
#[inline]
pub fn is_newline(c: char) -> bool {
    c == '\r' || c == '\n'
}

/// `[^\s\p{L}\p{N}]`: punctuation, symbols, marks, controls and so on.
#[inline]
pub fn is_symbol(c: char) -> bool {
    !is_whitespace(c) && !is_letter(c) && !is_numeral(c)
}

/// `[^\r\n\p{L}\p{N}]`: the optional one-character prefix of a letter run.
///
/// Unlike [`is_symbol`] this admits whitespace other than CR and LF, which is
/// how `" Hello"` and `"\tHello"` stay one pretoken.
#[inline]
pub fn is_letter_prefix(c: char) -> bool {
    !is_newline(c) && !is_letter(c) && !is_numeral(c)
}

/// Simple case folding restricted to the letters that occur in English
/// contraction suffixes.
///
/// `ſ` (U+017F LATIN SMALL LETTER LONG S) folds to `s`; no other non-ASCII
/// code point folds onto `s t r e v m l d`.
#[inline]
pub fn fold_contraction_letter(c: char) -> char {
    match c {
        '\u{017F}' => 's',
        c => c.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        for c in ['a', 'Z', 'é', 'ß', 'Ω', 'я', '中', 'あ', 'ǅ', 'ʰ'] {
            assert!(is_letter(c), "{c:?} should be a letter");
        }
        // Combining marks and letter numbers are Alphabetic but not \p{L}.
        for c in ['\u{0301}', '\u{094D}', 'Ⅻ', '1', '_', ' '] {
            assert!(!is_letter(c), "{c:?} should not be a letter");
        }
    }

    #[test]
    fn test_numerals() {
        for c in ['0', '9', '٣', '५', 'Ⅻ', '½', '²', '〇'] {
            assert!(is_numeral(c), "{c:?} should be a numeral");
        }
        for c in ['a', '-', '.', ' '] {
            assert!(!is_numeral(c), "{c:?} should not be a numeral");
        }
    }

    #[test]
    fn test_whitespace() {
        for c in [' ', '\t', '\n', '\r', '\u{000B}', '\u{000C}', '\u{0085}', '\u{00A0}', '\u{3000}']
        {
            assert!(is_whitespace(c), "{c:?} should be whitespace");
        }
        // Zero width space is a format character, not White_Space.
        assert!(!is_whitespace('\u{200B}'));
    }

    #[test]
    fn test_symbol_and_prefix_classes() {
        assert!(is_symbol('@'));
        assert!(is_symbol('\''));
        assert!(is_symbol('\u{0301}'));
        assert!(!is_symbol(' '));
        assert!(!is_symbol('a'));

        assert!(is_letter_prefix(' '));
        assert!(is_letter_prefix('\t'));
        assert!(is_letter_prefix('@'));
        assert!(!is_letter_prefix('\n'));
        assert!(!is_letter_prefix('\r'));
        assert!(!is_letter_prefix('7'));
        assert!(!is_letter_prefix('x'));
    }

    #[test]
    fn test_fold_contraction_letter() {
        assert_eq!(fold_contraction_letter('S'), 's');
        assert_eq!(fold_contraction_letter('ſ'), 's');
        assert_eq!(fold_contraction_letter('L'), 'l');
        assert_eq!(fold_contraction_letter('é'), 'é');
    }
}
