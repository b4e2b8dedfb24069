use crate::pagination::{Links, PaginationError};
use crate::types::{DatabaseOptions, KubernetesOptions};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

/// The paginated collections exposed by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    ApplicationImages,
    DistributionImages,
    Regions,
    Sizes,
}

impl ListKind {
    pub fn path(&self) -> &'static str {
        match self {
            ListKind::ApplicationImages | ListKind::DistributionImages => "/v2/images",
            ListKind::Regions => "/v2/regions",
            ListKind::Sizes => "/v2/sizes",
        }
    }

    /// Extra query parameters identifying the collection.
    pub fn query(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ListKind::ApplicationImages => &[("type", "application")],
            ListKind::DistributionImages => &[("type", "distribution")],
            ListKind::Regions | ListKind::Sizes => &[],
        }
    }

    /// Key of the records array in the list response body.
    pub fn collection_key(&self) -> &'static str {
        match self {
            ListKind::ApplicationImages | ListKind::DistributionImages => "images",
            ListKind::Regions => "regions",
            ListKind::Sizes => "sizes",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

/// One batch of records and the links describing where the next one is.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T = Value> {
    pub items: Vec<T>,
    pub links: Option<Links>,
}

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: StatusCode, url: String },
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
    #[error("pagination error: {0}")]
    Pagination(#[from] PaginationError),
    #[error("gave up after {0} pages")]
    PageLimitExceeded(usize),
}

/// Read access to the provider's account metadata.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn list_page(&self, kind: ListKind, request: PageRequest)
    -> Result<Page, ProviderError>;

    async fn kubernetes_options(&self) -> Result<KubernetesOptions, ProviderError>;

    async fn database_options(&self) -> Result<DatabaseOptions, ProviderError>;
}
