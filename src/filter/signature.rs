//! Filter signatures
//!
//! Canonical cache keys for the filtered-list region.

use std::fmt;

/// Rendered in place of any absent field.
pub const ABSENT: &str = "~";

/// Canonical, order-independent key for a filter combination.
///
/// Fields are always rendered in one fixed order as `name=value` pairs. Text
/// values are quoted and escaped, so no free-text input can impersonate a
/// neighbouring field or the `~` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterSignature(String);

impl FilterSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates `name=value` segments for a signature.
#[derive(Debug, Default)]
pub(crate) struct SignatureWriter {
    buf: String,
}

impl SignatureWriter {
    pub fn new() -> Self {
        Self {
            buf: String::from("filter"),
        }
    }

    /// Field whose value is unambiguous when formatted with `Display`.
    pub fn plain<T: fmt::Display>(mut self, name: &str, value: Option<T>) -> Self {
        let rendered = value.map(|v| v.to_string());
        self.push(name, rendered.as_deref().unwrap_or(ABSENT));
        self
    }

    /// Free-text field, quoted and escaped.
    pub fn text(mut self, name: &str, value: Option<&str>) -> Self {
        let rendered = value.map(|v| format!("{:?}", v));
        self.push(name, rendered.as_deref().unwrap_or(ABSENT));
        self
    }

    /// Amount field. `-0.0` and `0.0` render alike.
    pub fn amount(mut self, name: &str, value: Option<f64>) -> Self {
        let rendered = value.map(|v| format!("{:?}", v + 0.0));
        self.push(name, rendered.as_deref().unwrap_or(ABSENT));
        self
    }

    pub fn finish(self) -> FilterSignature {
        FilterSignature(self.buf)
    }

    fn push(&mut self, name: &str, value: &str) {
        self.buf.push(';');
        self.buf.push_str(name);
        self.buf.push('=');
        self.buf.push_str(value);
    }
}
