use clap::Parser;
use std::path::PathBuf;

use crate::settings::DEFAULT_SETTINGS_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "siteintel",
    about = "Build normalized per-domain analytics records from a list of websites",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to input domains file (overrides settings)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Path to output JSON file (overrides settings)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_bundled_settings_path() {
        let args = Args::parse_from(["siteintel"]);
        assert_eq!(args.settings, PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert!(args.input.is_none());
        assert!(args.output.is_none());
    }

    #[test]
    fn overrides_paths() {
        let args = Args::parse_from([
            "siteintel",
            "-i",
            "domains.csv",
            "--output",
            "out/records.json",
            "--settings",
            "custom.json",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("domains.csv")));
        assert_eq!(args.output, Some(PathBuf::from("out/records.json")));
        assert_eq!(args.settings, PathBuf::from("custom.json"));
    }
}
