use crate::core::syndication::DEFAULT_ENDPOINTS;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PublisherError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub syndication: SyndicationConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub graphiql: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN_ADDR.to_string(),
            graphiql: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `compact` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyndicationConfig {
    pub endpoints: Vec<String>,
}

impl Default for SyndicationConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedItem {
    pub kind: String,
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    /// taxonomy name -> term names
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<String>>,
}

impl ServiceConfig {
    /// Loads the service file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PublisherError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PublisherError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("server.listen", &self.server.listen)?;
        validation::validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;

        for endpoint in &self.syndication.endpoints {
            validation::validate_url("syndication.endpoints", endpoint)?;
        }
        validation::validate_unique("syndication.endpoints", &self.syndication.endpoints)?;

        for item in &self.seed.items {
            validation::validate_non_empty_string("seed.items.kind", &item.kind)?;
            validation::validate_non_empty_string("seed.items.title", &item.title)?;
        }

        Ok(())
    }

    pub fn json_logging(&self) -> bool {
        self.logging.format == "json"
    }
}

impl ConfigProvider for ServiceConfig {
    fn listen_addr(&self) -> &str {
        &self.server.listen
    }

    fn syndication_endpoints(&self) -> &[String] {
        &self.syndication.endpoints
    }

    fn graphiql_enabled(&self) -> bool {
        self.server.graphiql
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
