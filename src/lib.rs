pub mod args;
pub mod coerce;
pub mod competitors;
pub mod demographics;
pub mod domains;
pub mod pipeline;
pub mod record;
pub mod retry;
pub mod settings;
pub mod source;
pub mod stats;
pub mod synthetic;
pub mod traffic;
pub mod utils;
pub mod validate;

pub use args::Args;
pub use domains::load_domains;
pub use pipeline::{write_records, Pipeline};
pub use record::{build_record, OutputRecord};
pub use retry::RetryPolicy;
pub use settings::{Settings, SettingsOrigin};
pub use source::{FetchError, PayloadSource, RawPayload};
pub use stats::RunReport;
pub use synthetic::SyntheticSource;
