use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::record::{build_record, OutputRecord};
use crate::retry::{any_error, retry_with_backoff, RetryPolicy};
use crate::source::{FetchError, PayloadSource};
use crate::stats::{DomainFailure, RunReport};

/// Fetches, normalizes and collects one record per domain.
pub struct Pipeline<S> {
    source: S,
    policy: RetryPolicy,
    retry_on: fn(&FetchError) -> bool,
}

impl<S: PayloadSource> Pipeline<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            retry_on: any_error,
        }
    }

    /// Restricts which fetch errors are retried. Every error is retried by
    /// default.
    pub fn retry_on(mut self, predicate: fn(&FetchError) -> bool) -> Self {
        self.retry_on = predicate;
        self
    }

    /// Processes `domains` in order. A domain that still fails after its
    /// retries is recorded in the report and skipped.
    pub fn run(&self, domains: &[String]) -> RunReport {
        let start_time = Instant::now();
        let total = domains.len();
        let mut report = RunReport::default();

        for (idx, domain) in domains.iter().enumerate() {
            info!(
                action = "process",
                component = "pipeline",
                index = idx + 1,
                total,
                domain = domain.as_str(),
                "Processing domain"
            );
            match self.fetch_record(domain) {
                Ok(record) => report.records.push(record),
                Err(e) => {
                    error!(
                        action = "skip",
                        component = "pipeline",
                        domain = domain.as_str(),
                        error = %e,
                        "Failed to process domain"
                    );
                    report.failures.push(DomainFailure {
                        domain: domain.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.elapsed = start_time.elapsed();
        info!(
            action = "complete",
            component = "pipeline",
            records = report.records.len(),
            failures = report.failures.len(),
            duration_ms = report.elapsed.as_millis(),
            "Pipeline run completed"
        );
        report
    }

    fn fetch_record(&self, domain: &str) -> Result<OutputRecord, FetchError> {
        let payload = retry_with_backoff(&self.policy, "fetch_domain_data", self.retry_on, || {
            self.source.fetch(domain)
        })?;
        Ok(build_record(&payload))
    }
}

/// Writes `records` as one pretty-printed JSON array, replacing any existing
/// file and creating missing parent directories.
pub fn write_records(records: &[OutputRecord], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(records).context("Failed to serialize records")?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write records to {}", output_path.display()))?;

    info!(
        action = "write",
        component = "output",
        records = records.len(),
        file_path = ?output_path,
        "Wrote records"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawPayload;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Fails each domain a scripted number of times before succeeding.
    struct ScriptedSource {
        failures_before_success: HashMap<String, u32>,
        calls: RefCell<HashMap<String, u32>>,
    }

    impl ScriptedSource {
        fn new(script: &[(&str, u32)]) -> Self {
            Self {
                failures_before_success: script.iter().map(|(d, n)| ((*d).to_string(), *n)).collect(),
                calls: RefCell::new(HashMap::new()),
            }
        }

        fn calls(&self, domain: &str) -> u32 {
            self.calls.borrow().get(domain).copied().unwrap_or(0)
        }
    }

    impl PayloadSource for ScriptedSource {
        fn fetch(&self, domain: &str) -> Result<RawPayload, FetchError> {
            let mut calls = self.calls.borrow_mut();
            let count = calls.entry(domain.to_string()).or_insert(0);
            *count += 1;
            if *count <= self.failures_before_success.get(domain).copied().unwrap_or(0) {
                return Err(FetchError::Unavailable {
                    domain: domain.to_string(),
                    reason: format!("attempt {count} timed out"),
                });
            }
            RawPayload::from_value(domain, json!({"domain": domain}))
        }
    }

    fn no_wait(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::ZERO)
    }

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| (*d).to_string()).collect()
    }

    #[test]
    fn failing_domain_is_skipped_and_run_continues() {
        let source = ScriptedSource::new(&[("a.com", 0), ("broken.com", u32::MAX), ("c.com", 0)]);
        let pipeline = Pipeline::new(&source, no_wait(2));

        let report = pipeline.run(&domains(&["a.com", "broken.com", "c.com"]));

        let built: Vec<&str> = report.records.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(built, vec!["a.com", "c.com"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].domain, "broken.com");
        assert_eq!(source.calls("broken.com"), 3);
        assert_eq!(report.domains_processed(), 3);
    }

    #[test]
    fn transient_failures_are_retried() {
        let source = ScriptedSource::new(&[("flaky.com", 2)]);
        let report = Pipeline::new(&source, no_wait(3)).run(&domains(&["flaky.com"]));

        assert_eq!(report.records.len(), 1);
        assert!(report.failures.is_empty());
        assert_eq!(source.calls("flaky.com"), 3);
    }

    #[test]
    fn retry_predicate_limits_retries() {
        let source = ScriptedSource::new(&[("flaky.com", 1)]);
        let report = Pipeline::new(&source, no_wait(3))
            .retry_on(|e| !e.is_transient())
            .run(&domains(&["flaky.com"]));

        assert!(report.records.is_empty());
        assert_eq!(source.calls("flaky.com"), 1);
    }

    #[test]
    fn write_records_creates_parents_and_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/out/records.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale").unwrap();

        let source = ScriptedSource::new(&[]);
        let report = Pipeline::new(&source, no_wait(0)).run(&domains(&["a.com", "b.com"]));
        write_records(&report.records, &path).unwrap();

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let array = written.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1]["domain"], json!("b.com"));

        let fresh = dir.path().join("brand/new/dir/records.json");
        write_records(&[], &fresh).unwrap();
        assert_eq!(fs::read_to_string(&fresh).unwrap(), "[]");
    }
}
