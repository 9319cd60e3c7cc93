//! Domain list loading.
//!
//! Supported inputs:
//! - JSON: `{"domains": [...]}`, an array of strings, or an array of objects
//!   with a `domain` field
//! - CSV: a `domain` column when the header has one, otherwise the first
//!   column of every row
//! - Text (`.txt`, `.list`): one domain per line
//!
//! The result is trimmed, deduplicated and sorted.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported input file type '{extension}': {path}")]
    UnsupportedFileType { path: PathBuf, extension: String },

    #[error("Failed to read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse JSON input {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse CSV input {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Unsupported JSON structure for input domains: {0}")]
    UnsupportedJsonShape(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
    Text,
}

impl InputFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "txt" | "list" => Some(Self::Text),
            _ => None,
        }
    }
}

pub fn load_domains(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let format = InputFormat::from_path(path).ok_or_else(|| InputError::UnsupportedFileType {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
    })?;

    let content = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let domains = match format {
        InputFormat::Json => {
            let value: Value = serde_json::from_str(&content).map_err(|source| InputError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            parse_json_domains(&value)
                .ok_or_else(|| InputError::UnsupportedJsonShape(path.to_path_buf()))?
        }
        InputFormat::Csv => parse_csv_domains(&content).map_err(|source| InputError::Csv {
            path: path.to_path_buf(),
            source,
        })?,
        InputFormat::Text => parse_text_domains(&content),
    };

    let unique = dedupe_sorted(&domains);
    info!(
        action = "loaded",
        component = "domain_list",
        file_path = ?path,
        domain_count = domains.len(),
        unique_count = unique.len(),
        "Loaded domains"
    );
    Ok(unique)
}

/// Returns `None` when the document has none of the supported shapes.
pub fn parse_json_domains(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Object(obj) => {
            let items = obj.get("domains")?.as_array()?;
            Some(items.iter().filter_map(scalar_text).collect())
        }
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(obj) => obj.get("domain").and_then(scalar_text),
                    _ => None,
                })
                .filter(|d| !d.is_empty())
                .collect(),
        ),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub fn parse_csv_domains(content: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let domain_idx = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == "domain");

    let mut domains = Vec::new();
    if let Some(idx) = domain_idx {
        for record in reader.records() {
            if let Some(domain) = record?.get(idx).map(str::trim) {
                if !domain.is_empty() {
                    domains.push(domain.to_string());
                }
            }
        }
        return Ok(domains);
    }

    // No domain header: every row, the first one included, is data.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    for record in reader.records() {
        if let Some(domain) = record?.get(0).map(str::trim) {
            if !domain.is_empty() {
                domains.push(domain.to_string());
            }
        }
    }
    Ok(domains)
}

pub fn parse_text_domains(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn dedupe_sorted(domains: &[String]) -> Vec<String> {
    domains
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
