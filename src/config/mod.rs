//! Configuration loading and validation
//!
//! Configuration is read once at startup from a TOML file and validated
//! before anything else runs. A batch size of zero or a malformed base URL
//! is a startup error, never a runtime surprise.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig, SourcesConfig};
pub use validation::validate;
