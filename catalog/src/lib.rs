pub mod api;
pub mod collector;
pub mod config;
pub mod digitalocean;
pub mod envelope;
pub mod errors;
pub mod fetchers;
pub mod metrics_defs;
pub mod pagination;
pub mod provider;
pub mod types;

#[cfg(test)]
mod testutils;

use crate::api::CatalogService;
use crate::config::{Config, Credential};
use crate::digitalocean::DigitalOceanClient;
use crate::errors::CatalogError;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

/// Serves the catalog until a listener fails.
pub async fn run(config: Config, credential: Credential) -> Result<(), CatalogError> {
    config.validate()?;

    let client = DigitalOceanClient::new(&config.provider, credential)?;
    let service = CatalogService::new(Arc::new(client), &config.provider);

    tracing::info!(
        base_url = %config.provider.base_url,
        per_page = config.provider.per_page,
        "Starting catalog"
    );

    let catalog_task = run_http_service(&config.listener.host, config.listener.port, service);

    match &config.admin_listener {
        Some(admin) => {
            let admin_service = AdminService::<_, CatalogError>::new(|| true);
            let admin_task = run_http_service(&admin.host, admin.port, admin_service);
            tokio::try_join!(catalog_task, admin_task)?;
        }
        None => catalog_task.await?,
    }

    Ok(())
}
