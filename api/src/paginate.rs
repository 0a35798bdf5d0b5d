//! Cursor pagination over the FPL listing endpoints.
//!
//! Pages are requested strictly one after another: page `n + 1` is only asked
//! for once page `n` has said `has_next: true`.
use crate::client::{ApiError, ApiResult, Fetcher};
use crate::wire::Page;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroU32;

/// Where the `{results, has_next}` pair sits in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    /// At the top level (fixtures).
    Flat,
    /// Under the named key (standings nest it under `"standings"`).
    Nested(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Query key carrying the 1-based page cursor.
    pub page_param: &'static str,
    /// `None` trusts `has_next` forever.
    pub max_pages: Option<NonZeroU32>,
}

impl PageOptions {
    pub fn new(page_param: &'static str) -> Self {
        Self { page_param, max_pages: None }
    }

    pub fn with_max_pages(mut self, max_pages: Option<NonZeroU32>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Walk every page of `url` and return all results in page order.
///
/// Any failed page fails the whole walk; nothing fetched so far is returned.
pub async fn paginate<F, T>(
    fetcher: &F,
    url: &str,
    base_params: &[(&'static str, String)],
    shape: PageShape,
    options: PageOptions,
) -> ApiResult<Vec<T>>
where
    F: Fetcher,
    T: DeserializeOwned,
{
    let mut results = Vec::new();
    let mut page: u32 = 1;

    loop {
        if let Some(max_pages) = options.max_pages
            && page > max_pages.get()
        {
            return Err(ApiError::PageLimitExceeded { url: url.to_owned(), max_pages: max_pages.get() });
        }

        let mut params = base_params.to_vec();
        params.push((options.page_param, page.to_string()));

        let body = fetcher.fetch(url, &params).await?;
        let Page { results: batch, has_next } = decode_page::<T>(body, shape, url)?;
        debug!("{url} page {page}: {} results, has_next={has_next}", batch.len());
        results.extend(batch);

        if !has_next {
            return Ok(results);
        }
        page += 1;
    }
}

fn decode_page<T: DeserializeOwned>(body: Value, shape: PageShape, url: &str) -> ApiResult<Page<T>> {
    let malformed = |reason: String| ApiError::MalformedResponse { url: url.to_owned(), reason };

    let payload = match (shape, body) {
        (PageShape::Flat, body) => body,
        (PageShape::Nested(key), Value::Object(mut map)) => map
            .remove(key)
            .ok_or_else(|| malformed(format!("missing `{key}` object")))?,
        (PageShape::Nested(key), _) => {
            return Err(malformed(format!("expected an object holding `{key}`")));
        }
    };

    serde_json::from_value(payload).map_err(|e| malformed(e.to_string()))
}
