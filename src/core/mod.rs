//! Core pretokenization engine for pretok.
//!
//! Pretokenization is the step in front of byte-pair encoding that cuts raw
//! text into chunks BPE merges never cross: words with their leading space,
//! contraction suffixes, numerals, punctuation runs and whitespace runs.
//!
//! # Architecture
//!
//! - [`Pretokenizer`]: public entry point; owns the grammar, the matching
//!   backend and optional special tokens
//! - [`PatternFamily`]: the built-in grammars (qwen2, llama3, gpt2) and their
//!   regex sources
//! - [`Scanner`]: linear-time matcher driven by an ordered rule table per
//!   family
//! - [`unicode`]: `\p{L}` / `\p{N}` / `\s` classification without a regex
//!   engine
//!
//! # Backends
//!
//! - **Scanner** (default): no backtracking, linear in input length
//! - **fancy-regex**: runs the regex source itself, needed for custom patterns
//! - **PCRE2 with JIT** (`pcre2` feature)

mod patterns;
mod pretokenizer;
mod scanner;
pub mod unicode;

pub use patterns::{PatternFamily, GPT2_PATTERN, LLAMA3_PATTERN, QWEN2_PATTERN};
pub use pretokenizer::{split, BackendKind, EncodingError, Pretokenizer, PretokenizerError};
pub use scanner::{Scanner, Spans};
