//! Payload parsing and fragment extraction strategies.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::PayloadError;

/// Signature of a caller-supplied extraction function.
pub type ExtractFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// Locates the incremental text inside a parsed JSON payload.
///
/// Extraction never fails on a well-formed payload: a missing, `null`,
/// non-string or empty field simply yields no fragment.
#[derive(Clone)]
pub enum FragmentExtractor {
    /// An RFC 6901 JSON pointer such as `/choices/0/delta/content`.
    Pointer(String),
    /// A caller-supplied function.
    Custom(Arc<ExtractFn>),
}

impl FragmentExtractor {
    /// Extract with a JSON pointer.
    #[must_use]
    pub fn pointer(path: impl Into<String>) -> Self {
        Self::Pointer(path.into())
    }

    /// Extract with a custom function.
    #[must_use]
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Find the fragment in an already-parsed payload.
    #[must_use]
    pub fn extract_value(&self, json: &Value) -> Option<String> {
        let fragment = match self {
            Self::Pointer(path) => json.pointer(path).and_then(Value::as_str).map(str::to_owned),
            Self::Custom(f) => f(json),
        };
        fragment.filter(|text| !text.is_empty())
    }

    /// Decode raw payload bytes and find the fragment.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when the bytes are not UTF-8 or not JSON.
    pub fn extract(&self, payload: &[u8]) -> Result<Option<String>, PayloadError> {
        let text = std::str::from_utf8(payload)?;
        let json: Value = serde_json::from_str(text)?;
        Ok(self.extract_value(&json))
    }
}

impl fmt::Debug for FragmentExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pointer(path) => f.debug_tuple("Pointer").field(path).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}
