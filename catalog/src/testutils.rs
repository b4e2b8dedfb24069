use crate::pagination::{Links, Pages};
use crate::provider::{ListKind, Page, PageRequest, Provider, ProviderError};
use crate::types::{DatabaseOptions, KubernetesOptions};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory provider serving scripted pages linked the way the real API links them.
#[derive(Default)]
pub struct FakeProvider {
    pages: HashMap<ListKind, Vec<Vec<Value>>>,
    kubernetes_options: KubernetesOptions,
    database_options: DatabaseOptions,
    failing: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<(ListKind, PageRequest)>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, kind: ListKind, pages: Vec<Vec<Value>>) -> Self {
        self.pages.insert(kind, pages);
        self
    }

    pub fn with_kubernetes_options(mut self, options: KubernetesOptions) -> Self {
        self.kubernetes_options = options;
        self
    }

    pub fn with_database_options(mut self, options: DatabaseOptions) -> Self {
        self.database_options = options;
        self
    }

    /// Every call fails with a 503 from the upstream.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Every call waits this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<(ListKind, PageRequest)> {
        self.requests.lock().unwrap().clone()
    }

    async fn before_call(&self, path: &str) -> Result<(), ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(ProviderError::UnexpectedStatus {
                status: StatusCode::SERVICE_UNAVAILABLE,
                url: format!("https://api.digitalocean.com{path}"),
            });
        }
        Ok(())
    }
}

fn page_link(kind: ListKind, page: usize) -> String {
    format!("https://api.digitalocean.com{}?page={page}", kind.path())
}

#[async_trait]
impl Provider for FakeProvider {
    async fn list_page(
        &self,
        kind: ListKind,
        request: PageRequest,
    ) -> Result<Page, ProviderError> {
        self.requests.lock().unwrap().push((kind, request));
        self.before_call(kind.path()).await?;

        let pages = self.pages.get(&kind).cloned().unwrap_or_default();
        let index = request.page as usize - 1;
        let items = pages.get(index).cloned().unwrap_or_default();

        let links = if index + 1 < pages.len() {
            Links {
                pages: Some(Pages {
                    next: Some(page_link(kind, index + 2)),
                    last: Some(page_link(kind, pages.len())),
                    ..Pages::default()
                }),
            }
        } else {
            Links::default()
        };

        Ok(Page {
            items,
            links: Some(links),
        })
    }

    async fn kubernetes_options(&self) -> Result<KubernetesOptions, ProviderError> {
        self.before_call("/v2/kubernetes/options").await?;
        Ok(self.kubernetes_options.clone())
    }

    async fn database_options(&self) -> Result<DatabaseOptions, ProviderError> {
        self.before_call("/v2/databases/options").await?;
        Ok(self.database_options.clone())
    }
}
