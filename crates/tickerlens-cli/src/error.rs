use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickerlens_core::ValidationError),

    #[error(transparent)]
    Config(#[from] tickerlens_core::ConfigError),

    #[error(transparent)]
    Fetch(#[from] tickerlens_core::FetchError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) | Self::Command(_) => 2,
            Self::Fetch(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
