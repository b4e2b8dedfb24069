use crate::config::ConfigError;
use crate::provider::ProviderError;
use std::time::Duration;

/// Reasons a matched request could not be answered. All of them become a 500.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("fetch did not complete within {0:?}")]
    Timeout(Duration),
    #[error("could not serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("could not create provider client: {0}")]
    Provider(#[from] ProviderError),
}
