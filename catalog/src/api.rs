use crate::collector::Collector;
use crate::config::ProviderConfig;
use crate::envelope::Envelope;
use crate::errors::{CatalogError, FetchError};
use crate::fetchers::{self, ImageType};
use crate::metrics_defs::{
    REQUEST_COUNT, REQUEST_DURATION, REQUEST_FAILED, REQUEST_NOT_FOUND, REQUESTS_INFLIGHT,
};
use crate::provider::Provider;
use http::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use shared::http::{APPLICATION_JSON, full_body, make_error_response};
use shared::{counter, gauge, histogram};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared caches may keep a response for an hour; browsers always revalidate.
pub const CACHE_CONTROL_VALUE: &str = "s-maxage=3600, maxage=0";

pub type CatalogResponse = Response<BoxBody<Bytes, CatalogError>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Images(ImageType),
    Regions,
    Sizes,
    KubernetesOptions,
    DatabaseOptions,
}

impl Route {
    /// Matches exact, case-sensitive paths.
    pub fn from_path(path: &str) -> Option<Route> {
        match path {
            "/images/apps" | "/images/distros" => {
                let segment = path.rsplit('/').next().unwrap_or_default();
                Some(Route::Images(ImageType::from_segment(segment)))
            }
            "/regions" => Some(Route::Regions),
            "/sizes" => Some(Route::Sizes),
            "/k8s" => Some(Route::KubernetesOptions),
            "/databases/options" => Some(Route::DatabaseOptions),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Images(ImageType::Application) => "images_apps",
            Route::Images(ImageType::Distribution) => "images_distros",
            Route::Regions => "regions",
            Route::Sizes => "sizes",
            Route::KubernetesOptions => "k8s",
            Route::DatabaseOptions => "database_options",
        }
    }
}

/// Serves the metadata routes from a provider.
#[derive(Clone)]
pub struct CatalogService {
    provider: Arc<dyn Provider>,
    collector: Collector,
    timeout: Duration,
}

impl CatalogService {
    pub fn new(provider: Arc<dyn Provider>, config: &ProviderConfig) -> Self {
        CatalogService {
            provider,
            collector: Collector::from_config(config),
            timeout: config.request_timeout(),
        }
    }

    pub async fn handle(&self, path: &str) -> CatalogResponse {
        let Some(route) = Route::from_path(path) else {
            tracing::warn!(path, "No route matched");
            counter!(REQUEST_NOT_FOUND).increment(1);
            return make_error_response(StatusCode::NOT_FOUND);
        };

        let _inflight = InflightGuard::new();
        let start = Instant::now();
        counter!(REQUEST_COUNT, "route" => route.name()).increment(1);

        let result = match tokio::time::timeout(self.timeout, self.fetch(route)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        histogram!(REQUEST_DURATION, "route" => route.name())
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(body) => json_response(body),
            Err(e) => {
                tracing::error!(error = %e, route = route.name(), "Failed to serve request");
                counter!(REQUEST_FAILED, "route" => route.name()).increment(1);
                make_error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    async fn fetch(&self, route: Route) -> Result<Bytes, FetchError> {
        let provider = self.provider.as_ref();
        let collector = &self.collector;

        match route {
            Route::Images(image_type) => {
                let images = fetchers::images(provider, collector, image_type).await?;
                to_body(Envelope::build("images", images))
            }
            Route::Regions => {
                let regions = fetchers::regions(provider, collector).await?;
                to_body(Envelope::build("regions", regions))
            }
            Route::Sizes => {
                let sizes = fetchers::sizes(provider, collector).await?;
                to_body(Envelope::build("sizes", sizes))
            }
            Route::KubernetesOptions => {
                let options = fetchers::kubernetes_options(provider).await?;
                to_body(Envelope::build("options", options))
            }
            Route::DatabaseOptions => {
                let options = fetchers::database_options(provider).await?;
                to_body(Envelope::build("options", options))
            }
        }
    }
}

impl<B> Service<Request<B>> for CatalogService {
    type Response = CatalogResponse;
    type Error = CatalogError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let service = self.clone();
        let path = req.uri().path().to_owned();

        Box::pin(async move { Ok(service.handle(&path).await) })
    }
}

fn to_body<P: Serialize>(envelope: Envelope<P>) -> Result<Bytes, FetchError> {
    Ok(Bytes::from(serde_json::to_vec(&envelope)?))
}

fn json_response(body: Bytes) -> CatalogResponse {
    let mut response = Response::new(full_body(body));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE));
    response
}

struct InflightGuard;

impl InflightGuard {
    fn new() -> Self {
        gauge!(REQUESTS_INFLIGHT).increment(1.0);
        InflightGuard
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        gauge!(REQUESTS_INFLIGHT).decrement(1.0);
    }
}
