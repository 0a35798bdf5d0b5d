//! In-memory `Fetcher` for unit tests: canned pages keyed by URL.
use crate::client::{ApiError, ApiResult, Fetcher};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

pub const BASE: &str = "https://fpl.test/api/";

#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    logged_in: bool,
    /// URL -> pages, indexed by the 1-based page cursor. `None` fails that page.
    pages: HashMap<String, Vec<Option<Value>>>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedFetcher {
    pub fn logged_in() -> Self {
        Self { logged_in: true, ..Self::default() }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, url: impl Into<String>, pages: Vec<Value>) -> Self {
        self.pages.insert(url.into(), pages.into_iter().map(Some).collect());
        self
    }

    pub fn with_failing_page(mut self, url: &str, page: usize) -> Self {
        if let Some(pages) = self.pages.get_mut(url)
            && let Some(slot) = pages.get_mut(page - 1)
        {
            *slot = None;
        }
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(u, _)| u == url).count()
    }
}

impl Fetcher for ScriptedFetcher {
    fn base_url(&self) -> &str {
        BASE
    }

    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> ApiResult<Value> {
        self.calls.lock().unwrap().push((
            url.to_owned(),
            params.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect(),
        ));

        let page = params
            .iter()
            .find(|(k, _)| k.starts_with("page"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(1);

        self.pages
            .get(url)
            .and_then(|pages| pages.get(page - 1))
            .cloned()
            .flatten()
            .ok_or_else(|| ApiError::NotFound(format!("{url} page {page}")))
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in
    }
}
