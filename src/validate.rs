//! Per-item validation shared by the normalizers.
//!
//! Malformed items never fail a whole section. Each cleaning step runs its
//! parser over the raw items and gets back the kept values alongside a record
//! of what was dropped and why.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("item is not an object")]
    NotAnObject,

    #[error("field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{0}' has a value that cannot be coerced")]
    InvalidField(&'static str),

    #[error("domain is empty")]
    EmptyDomain,
}

/// A raw item that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub index: usize,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub valid: Vec<T>,
    pub dropped: Vec<Rejected>,
}

impl<T> Partition<T> {
    pub fn from_items<'a, I, F>(items: I, mut parse: F) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
        F: FnMut(&'a Value) -> Result<T, RejectReason>,
    {
        let mut valid = Vec::new();
        let mut dropped = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            match parse(item) {
                Ok(value) => valid.push(value),
                Err(reason) => dropped.push(Rejected { index, reason }),
            }
        }
        Self { valid, dropped }
    }

    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// The items of an array-valued field, or nothing when it is absent, falsy
/// or not an array.
pub fn array_items<'a>(parent: Option<&'a Value>, key: &str) -> &'a [Value] {
    parent
        .and_then(|p| p.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
