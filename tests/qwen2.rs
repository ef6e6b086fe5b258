//! Integration tests for the qwen2 pretokenization grammar.
//!
//! These tests pin down the exact pretoken boundaries the qwen2 pattern
//! produces, including the single-numeral rule that sets it apart from
//! cl100k-style patterns.

use pretok::{split, PatternFamily, Pretokenizer};

fn create_qwen2_pretokenizer() -> Pretokenizer {
    Pretokenizer::new(PatternFamily::Qwen2)
}

/// Test the two sample strings the grammar was first checked against.
#[test]
fn test_qwen2_reference_samples() {
    let pretokenizer = create_qwen2_pretokenizer();

    assert_eq!(
        pretokenizer.split(" 123 a bit"),
        vec![" ", "1", "2", "3", " a", " bit"]
    );
    assert_eq!(
        pretokenizer.split(" Hello\n I'm ok  @\n Hel"),
        vec![" Hello", "\n", " I", "'m", " ok", " ", " @\n", " Hel"]
    );
}

/// Test that the free function uses the qwen2 grammar.
#[test]
fn test_qwen2_free_function() {
    let text = " Hello\n I'm ok  @\n Hel";
    assert_eq!(split(text), create_qwen2_pretokenizer().split(text));
}

/// Test that the empty string yields no pretokens.
#[test]
fn test_qwen2_empty() {
    assert!(create_qwen2_pretokenizer().split("").is_empty());
    assert!(create_qwen2_pretokenizer().split_spans("").is_empty());
}

/// Test that numerals are emitted one per pretoken, in any script.
#[test]
fn test_qwen2_numerals_split_singly() {
    let pretokenizer = create_qwen2_pretokenizer();

    assert_eq!(pretokenizer.split("123"), vec!["1", "2", "3"]);
    assert_eq!(pretokenizer.split("٣٤٥"), vec!["٣", "٤", "٥"]);
    assert_eq!(
        pretokenizer.split("It costs $1,299.99"),
        vec!["It", " costs", " $", "1", ",", "2", "9", "9", ".", "9", "9"]
    );
}

/// Test contraction suffixes, which match case-insensitively.
#[test]
fn test_qwen2_contractions() {
    let pretokenizer = create_qwen2_pretokenizer();

    assert_eq!(
        pretokenizer.split("DON'T YOU'LL we'Re"),
        vec!["DON", "'T", " YOU", "'LL", " we", "'Re"]
    );
    assert_eq!(pretokenizer.split("it'ſ"), vec!["it", "'ſ"]);
    // An apostrophe that starts no contraction prefixes the following word.
    assert_eq!(pretokenizer.split("o'clock"), vec!["o", "'clock"]);
}

/// Test that a space attaches to a following word or symbol run.
#[test]
fn test_qwen2_leading_space() {
    let pretokenizer = create_qwen2_pretokenizer();

    assert_eq!(
        pretokenizer.split("Hello, 世界! 你好"),
        vec!["Hello", ",", " 世界", "!", " 你好"]
    );
    assert_eq!(
        pretokenizer.split("I ❤\u{FE0F} Rust"),
        vec!["I", " ❤\u{FE0F}", " Rust"]
    );
}

/// Test whitespace runs before words, before newlines and at the end.
#[test]
fn test_qwen2_whitespace() {
    let pretokenizer = create_qwen2_pretokenizer();

    assert_eq!(pretokenizer.split("   "), vec!["   "]);
    assert_eq!(pretokenizer.split("\n\n"), vec!["\n\n"]);
    assert_eq!(pretokenizer.split("a\t\tb"), vec!["a", "\t", "\tb"]);
    assert_eq!(
        pretokenizer.split("line1\r\nline2\r\n"),
        vec!["line", "1", "\r\n", "line", "2", "\r\n"]
    );
    assert_eq!(pretokenizer.split("end   "), vec!["end", "   "]);
}

/// Test a snippet of source code.
#[test]
fn test_qwen2_code() {
    let pretokenizer = create_qwen2_pretokenizer();

    assert_eq!(
        pretokenizer.split("fn main() {\n    println!(\"hi\");\n}"),
        vec!["fn", " main", "()", " {\n", "   ", " println", "!(\"", "hi", "\");\n", "}"]
    );
}

/// Test that combining marks are not letters.
#[test]
fn test_qwen2_combining_marks() {
    let pretokenizer = create_qwen2_pretokenizer();
    assert_eq!(pretokenizer.split("cafe\u{0301}"), vec!["cafe", "\u{0301}"]);
}

/// Test that splitting is lossless and stable on re-splitting.
#[test]
fn test_qwen2_roundtrip_and_idempotence() {
    let pretokenizer = create_qwen2_pretokenizer();

    let test_cases = vec![
        "Hello, world!",
        "The quick brown fox jumps over the lazy dog.",
        "1234567890",
        "Special characters: !@#$%^&*()",
        "Multi-line\ntext\nwith\nnewlines",
        "Unicode: こんにちは 世界 🦀",
        "  \r\n\t mixed \u{3000}whitespace\u{00A0} ",
    ];

    for text in test_cases {
        let pieces = pretokenizer.split(text);
        let rejoined = pieces.concat();
        assert_eq!(rejoined, text, "Roundtrip failed for: {:?}", text);
        assert_eq!(
            pretokenizer.split(&rejoined),
            pieces,
            "Re-split changed boundaries for: {:?}",
            text
        );
    }
}

/// Test that a very long whitespace run is handled in one pass.
#[test]
fn test_qwen2_long_whitespace_run() {
    let pretokenizer = create_qwen2_pretokenizer();
    let text = format!("{}x", " ".repeat(100_000));

    let pieces = pretokenizer.split(&text);
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].len(), 99_999);
    assert_eq!(pieces[1], " x");
}
