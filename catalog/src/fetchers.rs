use crate::collector::Collector;
use crate::provider::{ListKind, Provider, ProviderError};
use crate::types::KubernetesOptions;
use serde_json::Value;
use std::collections::BTreeMap;

/// Which image listing to serve. Anything other than `apps` means distributions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageType {
    Application,
    Distribution,
}

impl ImageType {
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "apps" => ImageType::Application,
            _ => ImageType::Distribution,
        }
    }

    fn list_kind(self) -> ListKind {
        match self {
            ImageType::Application => ListKind::ApplicationImages,
            ImageType::Distribution => ListKind::DistributionImages,
        }
    }
}

async fn collect_all(
    provider: &dyn Provider,
    collector: &Collector,
    kind: ListKind,
) -> Result<Vec<Value>, ProviderError> {
    collector
        .collect(|request| provider.list_page(kind, request))
        .await
}

pub async fn images(
    provider: &dyn Provider,
    collector: &Collector,
    image_type: ImageType,
) -> Result<Vec<Value>, ProviderError> {
    collect_all(provider, collector, image_type.list_kind()).await
}

pub async fn regions(
    provider: &dyn Provider,
    collector: &Collector,
) -> Result<Vec<Value>, ProviderError> {
    collect_all(provider, collector, ListKind::Regions).await
}

pub async fn sizes(
    provider: &dyn Provider,
    collector: &Collector,
) -> Result<Vec<Value>, ProviderError> {
    collect_all(provider, collector, ListKind::Sizes).await
}

pub async fn kubernetes_options(provider: &dyn Provider) -> Result<KubernetesOptions, ProviderError> {
    provider.kubernetes_options().await
}

/// Database options as a generic, key-ordered mapping.
///
/// The typed options are serialized and read back so callers get exactly the
/// fields the provider returned, whatever their schema.
pub async fn database_options(
    provider: &dyn Provider,
) -> Result<BTreeMap<String, Value>, ProviderError> {
    let options = provider.database_options().await?;
    let value = serde_json::to_value(&options)
        .map_err(|e| ProviderError::UnexpectedPayload(e.to_string()))?;

    serde_json::from_value(value).map_err(|e| ProviderError::UnexpectedPayload(e.to_string()))
}
