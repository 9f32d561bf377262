pub mod config;
pub mod fixtures;

pub use config::BenchConfig;
pub use fixtures::{UnreachablePrimary, document_keys, html_document};
