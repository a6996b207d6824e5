//! Classification of identity-library failures.
//!
//! The identity library reports failures as loosely-shaped values. They are
//! wrapped in [`UpstreamFailure`] at the boundary and converted into a
//! [`ClassifiedError`] before any response logic branches on them.

use serde_json::Value;

/// Discriminator carried by the identity library's API errors.
pub const API_ERROR_NAME: &str = "APIError";

/// Opaque failure raised or returned by the identity subsystem.
#[derive(Debug)]
pub enum UpstreamFailure {
    /// Structured error object (`{name, statusCode, headers, ...}`).
    Object(Value),
    /// Error instance.
    Error(Box<dyn std::error::Error + Send + Sync>),
    /// Bare message.
    Message(String),
}

impl UpstreamFailure {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    /// Message text for error instances and bare strings; `None` for objects.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Error(err) => Some(err.to_string()),
            Self::Message(msg) => Some(msg.clone()),
            Self::Object(_) => None,
        }
    }
}

impl From<Value> for UpstreamFailure {
    fn from(value: Value) -> Self {
        Self::Object(value)
    }
}

/// A recognised failure shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedError {
    /// The library signalled a redirect by raising an error.
    Redirect { status: u16, headers: Vec<(String, String)> },
    /// Private signing-key material could not be decrypted.
    DecryptFailure { message: String },
    Unknown,
}

fn redirect_parts(value: &Value) -> Option<(u16, &Value)> {
    let object = value.as_object()?;
    if object.get("name").and_then(Value::as_str) != Some(API_ERROR_NAME) {
        return None;
    }

    let status = object.get("statusCode").and_then(Value::as_u64)?;
    if !(300..=399).contains(&status) {
        return None;
    }

    let headers = object.get("headers")?;
    if !(headers.is_object() || headers.is_array()) {
        return None;
    }

    Some((u16::try_from(status).ok()?, headers))
}

/// Redirect-as-error: an API error object with a 3xx status and headers.
pub fn is_redirect_error(candidate: &UpstreamFailure) -> bool {
    match candidate {
        UpstreamFailure::Object(value) => redirect_parts(value).is_some(),
        _ => false,
    }
}

fn is_decrypt_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("decrypt") && lower.contains("private key")
}

/// Key-decrypt failure: the message mentions both "decrypt" and "private key"
/// (case-insensitive). Only error instances and bare strings qualify.
pub fn is_decrypt_error(candidate: &UpstreamFailure) -> bool {
    candidate.text().is_some_and(|text| is_decrypt_message(&text))
}

/// Headers-like value to name/value pairs. Accepts an object of scalar values or
/// an array of `[name, value]` pairs; anything else is skipped.
fn header_pairs(headers: &Value) -> Vec<(String, String)> {
    let scalar = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    };

    match headers {
        Value::Object(map) => map
            .iter()
            .filter_map(|(name, value)| Some((name.clone(), scalar(value)?)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|pair| {
                let pair = pair.as_array()?;
                match pair.as_slice() {
                    [Value::String(name), value] => Some((name.clone(), scalar(value)?)),
                    _ => None,
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Convert an opaque failure into a tagged variant.
pub fn classify(candidate: &UpstreamFailure) -> ClassifiedError {
    if let UpstreamFailure::Object(value) = candidate {
        if let Some((status, headers)) = redirect_parts(value) {
            return ClassifiedError::Redirect {
                status,
                headers: header_pairs(headers),
            };
        }
    }

    match candidate.text() {
        Some(message) if is_decrypt_message(&message) => ClassifiedError::DecryptFailure { message },
        _ => ClassifiedError::Unknown,
    }
}
