//! Python bindings for the pretok pretokenizer.
//!
//! This module provides PyO3 wrappers around the core Rust pretokenizer,
//! exposing a Python-friendly API while maintaining Rust performance.
//!
//! # Thread Safety
//!
//! The pretokenizer is immutable and can be shared across Python threads.
//! Batch splitting uses Rayon and releases the GIL while it runs.
//!
//! # Example
//!
//! ```python
//! from pretok import Pretokenizer
//!
//! pretokenizer = Pretokenizer("qwen2")
//! pretokenizer.split(" Hello\n I'm ok  @\n Hel")
//! # [' Hello', '\n', ' I', "'m", ' ok', ' ', ' @\n', ' Hel']
//!
//! # Code point offsets, usable for slicing the original str
//! pretokenizer.spans("é 世界")
//! # [(0, 1), (1, 4)]
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyString};

use crate::core::{BackendKind, PatternFamily, Pretokenizer, PretokenizerError};

fn to_py_err(err: PretokenizerError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn to_owned(pieces: Vec<&str>) -> Vec<String> {
    pieces.into_iter().map(str::to_string).collect()
}

/// Build the error for a Python str that holds lone surrogates.
///
/// Such a str cannot be viewed as UTF-8, so it is re-encoded to UTF-16 with
/// surrogates passed through and handed to the UTF-16 boundary, which
/// reports the position of the first unpaired surrogate.
fn encoding_error(inner: &Pretokenizer, text: &Bound<'_, PyString>) -> PyErr {
    let encoded = match text.call_method1("encode", ("utf-16-le", "surrogatepass")) {
        Ok(encoded) => encoded,
        Err(err) => return err,
    };
    let bytes = match encoded.downcast::<PyBytes>() {
        Ok(bytes) => bytes,
        Err(err) => return err.into(),
    };
    let units: Vec<u16> = bytes
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    match inner.split_utf16(&units) {
        Err(err) => to_py_err(err),
        Ok(_) => PyValueError::new_err("string is not valid Unicode"),
    }
}

/// Python wrapper for the Rust Pretokenizer.
#[pyclass(name = "Pretokenizer", frozen)]
pub struct PyPretokenizer {
    inner: Pretokenizer,
}

impl PyPretokenizer {
    fn with_text<R>(
        &self,
        text: &Bound<'_, PyString>,
        f: impl FnOnce(&str) -> R,
    ) -> PyResult<R> {
        match text.to_cow() {
            Ok(text) => Ok(f(&text)),
            Err(_) => Err(encoding_error(&self.inner, text)),
        }
    }
}

#[pymethods]
impl PyPretokenizer {
    /// Create a pretokenizer for a built-in pattern family.
    ///
    /// Args:
    ///     name: Family or model name ("qwen2", "llama3", "gpt2", "llama-bpe", ...)
    ///     backend: "scanner" (default), "fancy-regex" or "pcre2"
    ///     special_tokens: Optional list of literal tokens kept whole by split_with_special
    #[new]
    #[pyo3(signature = (name="qwen2", backend="scanner", special_tokens=None))]
    fn new(name: &str, backend: &str, special_tokens: Option<Vec<String>>) -> PyResult<Self> {
        let backend: BackendKind = backend.parse().map_err(to_py_err)?;
        let inner = Pretokenizer::from_name(name)
            .and_then(|p| p.with_backend(backend))
            .and_then(|p| p.with_special_tokens(special_tokens.as_deref().unwrap_or(&[])))
            .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Create a pretokenizer from a custom regex pattern.
    ///
    /// Args:
    ///     pattern: Regex with fancy-regex / PCRE2 syntax (lookaround allowed)
    ///     backend: "fancy-regex" (default) or "pcre2"
    ///     special_tokens: Optional list of literal tokens kept whole by split_with_special
    #[staticmethod]
    #[pyo3(signature = (pattern, backend="fancy-regex", special_tokens=None))]
    fn from_pattern(
        pattern: &str,
        backend: &str,
        special_tokens: Option<Vec<String>>,
    ) -> PyResult<Self> {
        let backend: BackendKind = backend.parse().map_err(to_py_err)?;
        let inner = Pretokenizer::from_pattern(pattern)
            .and_then(|p| p.with_backend(backend))
            .and_then(|p| p.with_special_tokens(special_tokens.as_deref().unwrap_or(&[])))
            .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Built-in family name, or None for a custom pattern.
    #[getter]
    fn family(&self) -> Option<&'static str> {
        self.inner.family().map(PatternFamily::name)
    }

    /// Regex source of the grammar.
    #[getter]
    fn pattern(&self) -> &str {
        self.inner.pattern()
    }

    /// Name of the matching backend.
    #[getter]
    fn backend(&self) -> &'static str {
        self.inner.backend().name()
    }

    /// Split text into pretokens.
    ///
    /// Raises:
    ///     ValueError: If the str contains unpaired surrogates
    fn split(&self, text: &Bound<'_, PyString>) -> PyResult<Vec<String>> {
        self.with_text(text, |text| to_owned(self.inner.split(text)))
    }

    /// Split text, keeping registered special tokens whole.
    fn split_with_special(&self, text: &Bound<'_, PyString>) -> PyResult<Vec<String>> {
        self.with_text(text, |text| to_owned(self.inner.split_with_special(text)))
    }

    /// Split UTF-8 encoded bytes.
    ///
    /// Raises:
    ///     ValueError: If the bytes are not valid UTF-8
    fn split_bytes(&self, data: &[u8]) -> PyResult<Vec<String>> {
        self.inner
            .split_bytes(data)
            .map(to_owned)
            .map_err(to_py_err)
    }

    /// Pretoken boundaries as (start, end) code point offsets.
    fn spans(&self, text: &Bound<'_, PyString>) -> PyResult<Vec<(usize, usize)>> {
        self.with_text(text, |text| {
            self.inner
                .split_char_spans(text)
                .into_iter()
                .map(|span| (span.start, span.end))
                .collect()
        })
    }

    /// Split many texts in parallel with the GIL released.
    fn split_batch(&self, py: Python<'_>, texts: Vec<String>) -> Vec<Vec<String>> {
        py.allow_threads(|| {
            self.inner
                .split_batch(&texts)
                .into_iter()
                .map(to_owned)
                .collect()
        })
    }

    fn __repr__(&self) -> String {
        match self.inner.family() {
            Some(family) => format!(
                "Pretokenizer(name='{}', backend='{}')",
                family,
                self.inner.backend()
            ),
            None => format!(
                "Pretokenizer.from_pattern({:?}, backend='{}')",
                self.inner.pattern(),
                self.inner.backend()
            ),
        }
    }
}

/// Split text with the qwen2 grammar.
#[pyfunction]
pub fn split(text: &Bound<'_, PyString>) -> PyResult<Vec<String>> {
    match text.to_cow() {
        Ok(text) => Ok(to_owned(crate::core::split(&text))),
        Err(_) => Err(encoding_error(&Pretokenizer::default(), text)),
    }
}
