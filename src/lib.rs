pub mod core;
#[cfg(feature = "python")]
mod python;

pub use crate::core::{
    split, BackendKind, EncodingError, PatternFamily, Pretokenizer, PretokenizerError, Scanner,
    Spans, GPT2_PATTERN, LLAMA3_PATTERN, QWEN2_PATTERN,
};
