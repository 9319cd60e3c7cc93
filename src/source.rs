use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The source could not produce a payload right now.
    #[error("payload for {domain} unavailable: {reason}")]
    Unavailable { domain: String, reason: String },

    #[error("payload for {domain} is invalid: {reason}")]
    InvalidPayload { domain: String, reason: String },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Analytics payload for one domain, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload(Map<String, Value>);

impl RawPayload {
    pub fn from_value(domain: &str, value: Value) -> Result<Self, FetchError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(FetchError::InvalidPayload {
                domain: domain.to_string(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    /// A section of the payload. `null` reads the same as absent.
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn domain(&self) -> Option<&str> {
        self.section("domain").and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Anything that can produce a payload for a domain.
pub trait PayloadSource {
    fn fetch(&self, domain: &str) -> Result<RawPayload, FetchError>;
}

impl<S: PayloadSource + ?Sized> PayloadSource for &S {
    fn fetch(&self, domain: &str) -> Result<RawPayload, FetchError> {
        (**self).fetch(domain)
    }
}
