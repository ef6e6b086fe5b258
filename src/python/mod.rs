mod bindings;

use crate::core::{GPT2_PATTERN, LLAMA3_PATTERN, QWEN2_PATTERN};
pub use bindings::PyPretokenizer;

use pyo3::prelude::*;

/// pretok - GPT-style pretokenization with Python bindings
///
/// - Linear-time scanner for the qwen2, llama3 and gpt2 grammars
/// - fancy-regex backend for custom patterns
/// - Optional PCRE2 with JIT (requires `pcre2` feature)
/// - Rayon parallelism for batch splitting
/// - Aho-Corasick for special token isolation
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPretokenizer>()?;
    m.add_function(wrap_pyfunction!(bindings::split, m)?)?;
    m.add("QWEN2_PATTERN", QWEN2_PATTERN)?;
    m.add("LLAMA3_PATTERN", LLAMA3_PATTERN)?;
    m.add("GPT2_PATTERN", GPT2_PATTERN)?;
    Ok(())
}
