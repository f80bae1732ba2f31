pub mod toml_config;

pub use toml_config::ServiceConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "publisher-graph")]
#[command(about = "A small GraphQL publishing service with syndicated books")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML service file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to listen on, overrides server.listen")]
    pub listen: Option<String>,

    #[arg(long, help = "Print the GraphQL schema (SDL) and exit")]
    pub print_schema: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Reads the service file (or defaults) and applies command-line overrides.
    pub fn load_service_config(&self) -> crate::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(listen) = &self.listen {
            config.server.listen = listen.clone();
        }

        Ok(config)
    }
}
