use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file: {0}")]
    ConfigRead(#[source] std::io::Error),
    #[error("failed to write config file: {0}")]
    ConfigWrite(#[source] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("failed to encode telemetry batch: {0}")]
    Telemetry(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
