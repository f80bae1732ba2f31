pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::memory_store::MemoryStore;
pub use config::ServiceConfig;
pub use self::core::{schema::build_schema, syndication::SyndicationClient};
pub use domain::model::SyndicatedBook;
pub use utils::error::{PublisherError, Result};
