pub mod conformance;
mod config;
mod error;
mod memory;
mod rest;
mod traits;

pub use config::{ConfigError, SourceConfig};
pub use error::SourceError;
pub use memory::MemorySource;
pub use rest::RestSource;
pub use traits::CollectionSource;
