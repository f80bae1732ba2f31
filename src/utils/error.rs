use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublisherError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },

    #[error("No {kind} found with id {id}")]
    NotFound { kind: String, id: u64 },

    #[error("Invalid ID: '{value}'")]
    InvalidId { value: String },

    #[error("Schema error: {message}")]
    SchemaError { message: String },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

impl PublisherError {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PublisherError::ApiError(_) | PublisherError::UnexpectedResponse { .. } => {
                "Check that the remote GraphQL endpoint is reachable and returns data.books"
            }
            PublisherError::IoError(_) => "Check file paths and permissions",
            PublisherError::TomlError(_) => "Check the syntax of the configuration file",
            PublisherError::ConfigError { .. } | PublisherError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and restart the service"
            }
            PublisherError::NotFound { .. } | PublisherError::InvalidId { .. } => {
                "Query the list field first to find a valid ID"
            }
            PublisherError::SchemaError { .. } => {
                "Two registrations probably declare conflicting types or fields"
            }
            PublisherError::ServerError { .. } => "Check that the listen address is free",
        }
    }
}

pub type Result<T> = std::result::Result<T, PublisherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_suggestions() {
        let invalid = PublisherError::InvalidConfigValueError {
            field: "server.listen".to_string(),
            value: "nope".to_string(),
            reason: "not a socket address".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "Invalid configuration value for server.listen: 'nope' (not a socket address)"
        );
        assert_eq!(
            invalid.recovery_suggestion(),
            "Fix the configuration value and restart the service"
        );

        let toml_err = toml::from_str::<toml::Value>("listen = ").unwrap_err();
        assert_eq!(
            PublisherError::from(toml_err).recovery_suggestion(),
            "Check the syntax of the configuration file"
        );
    }
}
