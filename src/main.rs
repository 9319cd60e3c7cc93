use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use siteintel::{load_domains, write_records, Args, Pipeline, Settings, SettingsOrigin, SyntheticSource};

fn main() -> Result<()> {
    let args = Args::parse();
    let (settings, origin) = Settings::load(&args.settings)?;
    siteintel::utils::setup_logging(settings.level_filter())?;

    match &origin {
        SettingsOrigin::File(path) => {
            info!(action = "load", component = "settings", file_path = ?path, "Loaded settings")
        }
        SettingsOrigin::Defaults { missing } => {
            warn!(action = "load", component = "settings", file_path = ?missing, "Settings file not found, using built-in defaults")
        }
    }

    let input_file = args.input.unwrap_or_else(|| settings.input_file.clone());
    let output_file = args.output.unwrap_or_else(|| settings.output_file.clone());
    info!(action = "configure", component = "paths", input = ?input_file, output = ?output_file, "Resolved input and output paths");

    let domains = match load_domains(&input_file) {
        Ok(domains) => domains,
        Err(e) => {
            error!(action = "load", component = "domain_list", file_path = ?input_file, error = %e, "Failed to load domains");
            std::process::exit(1);
        }
    };

    let pipeline = Pipeline::new(SyntheticSource::default(), settings.retry_policy());
    let report = pipeline.run(&domains);
    write_records(&report.records, &output_file)?;

    report.print_summary(&output_file);
    Ok(())
}
