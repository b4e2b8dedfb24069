use serde::Deserialize;
use url::Url;

/// The `links` object returned alongside every list response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Links {
    pub pages: Option<Pages>,
}

/// Page URLs. The provider omits `next` and `last` on the final page.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Pages {
    pub first: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PaginationError {
    #[error("malformed links object: {0}")]
    MalformedLinks(String),
    #[error("invalid next page link {link:?}: {reason}")]
    InvalidLink { link: String, reason: String },
    #[error("next page link {0:?} has no page parameter")]
    MissingPage(String),
    #[error("last page link present without a next page link")]
    MissingNext,
    #[error("next page {next} does not advance past page {current}")]
    NotAdvancing { current: u32, next: u32 },
}

impl Links {
    /// Returns the page number to request next, or `None` on the last page.
    pub fn next_page(&self) -> Result<Option<u32>, PaginationError> {
        let Some(pages) = &self.pages else {
            return Ok(None);
        };

        match (&pages.next, &pages.last) {
            (None, None) => Ok(None),
            (None, Some(_)) => Err(PaginationError::MissingNext),
            (Some(next), _) => page_param(next).map(Some),
        }
    }
}

fn page_param(link: &str) -> Result<u32, PaginationError> {
    let url = Url::parse(link).map_err(|e| PaginationError::InvalidLink {
        link: link.to_string(),
        reason: e.to_string(),
    })?;

    let (_, value) = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .ok_or_else(|| PaginationError::MissingPage(link.to_string()))?;

    value.parse().map_err(|_| PaginationError::InvalidLink {
        link: link.to_string(),
        reason: format!("page {value:?} is not a number"),
    })
}
