use std::path::Path;
use std::time::Duration;

use crate::record::OutputRecord;
use crate::utils::format_number;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFailure {
    pub domain: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<OutputRecord>,
    pub failures: Vec<DomainFailure>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn domains_processed(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn print_summary(&self, output_path: &Path) {
        println!("\n--- Run Summary ---");
        println!(
            "Domains processed: {}",
            format_number(self.domains_processed())
        );
        println!("Records written: {}", format_number(self.records.len()));
        println!("Failed domains: {}", format_number(self.failures.len()));
        for failure in &self.failures {
            println!("- {}: {}", failure.domain, failure.error);
        }
        println!("Output: {}", output_path.display());
        println!("Elapsed: {:.1}s", self.elapsed.as_secs_f64());
    }
}
