use crate::config::{Credential, ProviderConfig};
use crate::metrics_defs::UPSTREAM_RETRIES;
use crate::pagination::{Links, PaginationError};
use crate::provider::{ListKind, Page, PageRequest, Provider, ProviderError};
use crate::types::{DatabaseOptions, KubernetesOptions};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::counter;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

const USER_AGENT: &str = concat!("cloudmeta-catalog/", env!("CARGO_PKG_VERSION"));

const RETRIABLE_STATUS_CODES: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,     // 429
    StatusCode::INTERNAL_SERVER_ERROR, // 500
    StatusCode::BAD_GATEWAY,           // 502
    StatusCode::SERVICE_UNAVAILABLE,   // 503
    StatusCode::GATEWAY_TIMEOUT,       // 504
];

/// Doubles `base` for every retry already made, saturating at `Duration::MAX`.
fn backoff_delay(base: Duration, retries: u32) -> Duration {
    base.checked_mul(2_u32.saturating_pow(retries))
        .unwrap_or(Duration::MAX)
}

/// DigitalOcean v2 API client authenticated with a bearer token.
pub struct DigitalOceanClient {
    client: reqwest::Client,
    base_url: Url,
    credential: Credential,
    retries: u32,
    retry_base_delay: Duration,
}

impl DigitalOceanClient {
    pub fn new(config: &ProviderConfig, credential: Credential) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(DigitalOceanClient {
            client,
            base_url,
            credential,
            retries: config.retries,
            retry_base_delay: config.retry_base_delay(),
        })
    }

    async fn get_json(&self, url: Url) -> Result<Map<String, Value>, ProviderError> {
        let mut retries = 0;

        loop {
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(self.credential.token())
                .header(ACCEPT, "application/json")
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<Map<String, Value>>().await?);
            }

            if RETRIABLE_STATUS_CODES.contains(&status) && retries < self.retries {
                let delay = backoff_delay(self.retry_base_delay, retries);
                tracing::warn!(%status, %url, attempt = retries + 1, ?delay, "Retrying provider request");
                counter!(UPSTREAM_RETRIES).increment(1);
                sleep(delay).await;
                retries += 1;
                continue;
            }

            return Err(ProviderError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }
    }

    /// Resolves an API path below `base_url`, keeping any path prefix it carries.
    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get_options<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let mut body = self.get_json(self.endpoint(path)?).await?;
        let options = body
            .remove("options")
            .ok_or_else(|| ProviderError::UnexpectedPayload(format!("{path}: missing options")))?;

        serde_json::from_value(options)
            .map_err(|e| ProviderError::UnexpectedPayload(format!("{path}: {e}")))
    }
}

#[async_trait]
impl Provider for DigitalOceanClient {
    async fn list_page(
        &self,
        kind: ListKind,
        request: PageRequest,
    ) -> Result<Page, ProviderError> {
        let mut url = self.endpoint(kind.path())?;
        url.query_pairs_mut()
            .extend_pairs(kind.query())
            .append_pair("page", &request.page.to_string())
            .append_pair("per_page", &request.per_page.to_string());

        let mut body = self.get_json(url).await?;
        let key = kind.collection_key();

        let items = match body.remove(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ProviderError::UnexpectedPayload(format!(
                    "{key} is not an array"
                )));
            }
        };

        let links = match body.remove("links") {
            None | Some(Value::Null) => None,
            Some(links) => Some(
                serde_json::from_value::<Links>(links)
                    .map_err(|e| PaginationError::MalformedLinks(e.to_string()))?,
            ),
        };

        Ok(Page { items, links })
    }

    async fn kubernetes_options(&self) -> Result<KubernetesOptions, ProviderError> {
        self.get_options("/v2/kubernetes/options").await
    }

    async fn database_options(&self) -> Result<DatabaseOptions, ProviderError> {
        self.get_options("/v2/databases/options").await
    }
}
