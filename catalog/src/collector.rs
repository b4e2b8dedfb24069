use crate::config::ProviderConfig;
use crate::metrics_defs::UPSTREAM_PAGES;
use crate::pagination::PaginationError;
use crate::provider::{Page, PageRequest, ProviderError};
use shared::counter;
use std::future::Future;

/// Walks a paginated list to completion and flattens it into one collection.
///
/// Pages are requested one after another starting at page 1. Records keep the
/// order in which pages were returned. The first failing page aborts the whole
/// walk and nothing collected so far is returned.
#[derive(Clone, Copy, Debug)]
pub struct Collector {
    per_page: u32,
    max_pages: usize,
}

impl Collector {
    pub fn new(per_page: u32, max_pages: usize) -> Self {
        Collector {
            per_page,
            max_pages,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Collector::new(config.per_page, config.max_pages)
    }

    pub async fn collect<T, F, Fut>(&self, mut fetch_page: F) -> Result<Vec<T>, ProviderError>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Page<T>, ProviderError>>,
    {
        let mut collection = Vec::new();
        let mut request = PageRequest {
            page: 1,
            per_page: self.per_page,
        };

        for _ in 0..self.max_pages {
            let page = fetch_page(request).await?;
            counter!(UPSTREAM_PAGES).increment(1);
            tracing::debug!(
                page = request.page,
                records = page.items.len(),
                "Fetched page"
            );

            collection.extend(page.items);

            // An empty page does not end the walk; only the links do.
            let next = match page.links {
                Some(links) => links.next_page()?,
                None => None,
            };

            match next {
                None => return Ok(collection),
                Some(next) if next <= request.page => {
                    return Err(PaginationError::NotAdvancing {
                        current: request.page,
                        next,
                    }
                    .into());
                }
                Some(next) => request.page = next,
            }
        }

        Err(ProviderError::PageLimitExceeded(self.max_pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{Links, Pages};
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn link(page: u32) -> String {
        format!("https://api.digitalocean.com/v2/regions?page={page}&per_page=200")
    }

    fn page(items: &[&str], next: Option<u32>) -> Page<String> {
        let links = next.map(|next| Links {
            pages: Some(Pages {
                next: Some(link(next)),
                last: Some(link(next + 10)),
                ..Pages::default()
            }),
        });
        Page {
            items: items.iter().map(|s| s.to_string()).collect(),
            links,
        }
    }

    fn failure() -> ProviderError {
        ProviderError::UnexpectedStatus {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: link(2),
        }
    }

    /// Replays a scripted sequence of pages and records the requests made.
    #[derive(Clone)]
    struct Script {
        pages: Arc<Mutex<VecDeque<Result<Page<String>, ProviderError>>>>,
        requests: Arc<Mutex<Vec<PageRequest>>>,
    }

    impl Script {
        fn new(pages: Vec<Result<Page<String>, ProviderError>>) -> Self {
            Script {
                pages: Arc::new(Mutex::new(pages.into())),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        async fn run(&self, collector: Collector) -> Result<Vec<String>, ProviderError> {
            collector
                .collect(|request| {
                    self.requests.lock().unwrap().push(request);
                    let next = self.pages.lock().unwrap().pop_front();
                    async move { next.expect("collector requested more pages than scripted") }
                })
                .await
        }

        fn requested_pages(&self) -> Vec<u32> {
            self.requests.lock().unwrap().iter().map(|r| r.page).collect()
        }
    }

    #[tokio::test]
    async fn test_collects_pages_in_order() {
        let script = Script::new(vec![
            Ok(page(&["a", "b"], Some(2))),
            Ok(page(&["c"], Some(3))),
            Ok(page(&["d", "e", "f"], None)),
        ]);

        let collection = script.run(Collector::new(200, 100)).await.unwrap();

        assert_eq!(collection, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(script.requested_pages(), vec![1, 2, 3]);
        assert!(
            script
                .requests
                .lock()
                .unwrap()
                .iter()
                .all(|r| r.per_page == 200)
        );
    }

    #[tokio::test]
    async fn test_single_page_without_links() {
        let script = Script::new(vec![Ok(page(&["a", "b"], None))]);
        assert_eq!(
            script.run(Collector::new(200, 100)).await.unwrap(),
            vec!["a", "b"]
        );

        let script = Script::new(vec![Ok(Page {
            items: vec![],
            links: Some(Links { pages: None }),
        })]);
        assert!(script.run(Collector::new(200, 100)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_with_next_keeps_going() {
        let script = Script::new(vec![
            Ok(page(&["a"], Some(2))),
            Ok(page(&[], Some(3))),
            Ok(page(&["b"], None)),
        ]);

        let collection = script.run(Collector::new(200, 100)).await.unwrap();
        assert_eq!(collection, vec!["a", "b"]);
        assert_eq!(script.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_follows_page_number_from_link() {
        let script = Script::new(vec![Ok(page(&["a"], Some(4))), Ok(page(&["b"], None))]);

        script.run(Collector::new(200, 100)).await.unwrap();
        assert_eq!(script.requested_pages(), vec![1, 4]);
    }

    #[tokio::test]
    async fn test_error_discards_partial_results() {
        let script = Script::new(vec![
            Ok(page(&["a", "b"], Some(2))),
            Err(failure()),
            Ok(page(&["c"], None)),
        ]);

        let result = script.run(Collector::new(200, 100)).await;
        assert!(matches!(
            result,
            Err(ProviderError::UnexpectedStatus { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE
        ));
        // Nothing is requested after the failing page
        assert_eq!(script.requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_malformed_links_abort() {
        let script = Script::new(vec![Ok(Page {
            items: vec!["a".to_string()],
            links: Some(Links {
                pages: Some(Pages {
                    next: Some("::not a link::".into()),
                    ..Pages::default()
                }),
            }),
        })]);

        assert!(matches!(
            script.run(Collector::new(200, 100)).await,
            Err(ProviderError::Pagination(PaginationError::InvalidLink { .. }))
        ));
    }

    #[tokio::test]
    async fn test_non_advancing_link_aborts() {
        let script = Script::new(vec![Ok(page(&["a"], Some(2))), Ok(page(&["b"], Some(2)))]);

        assert!(matches!(
            script.run(Collector::new(200, 100)).await,
            Err(ProviderError::Pagination(PaginationError::NotAdvancing {
                current: 2,
                next: 2
            }))
        ));
    }

    #[tokio::test]
    async fn test_page_limit() {
        let script = Script::new((1..=5).map(|n| Ok(page(&["x"], Some(n + 1)))).collect());

        assert!(matches!(
            script.run(Collector::new(200, 3)).await,
            Err(ProviderError::PageLimitExceeded(3))
        ));
        assert_eq!(script.requested_pages(), vec![1, 2, 3]);

        // Reaching the last page exactly at the limit is fine
        let script = Script::new(vec![Ok(page(&["a"], Some(2))), Ok(page(&["b"], None))]);
        assert_eq!(
            script.run(Collector::new(200, 2)).await.unwrap(),
            vec!["a", "b"]
        );
    }
}
