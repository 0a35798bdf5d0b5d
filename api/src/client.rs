use log::{debug, info};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const FPL_API: &str = "https://fantasy.premierleague.com/api/";
const FPL_LOGIN: &str = "https://users.premierleague.com/accounts/login/";
const LOGIN_REDIRECT: &str = "https://fantasy.premierleague.com/a/login";
const LOGIN_APP: &str = "plfpl-web";
const SESSION_COOKIE: &str = "pl_profile";

/// The transport seam. The aggregation engine only ever talks to the API
/// through this trait, so tests can script responses page by page.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Root every endpoint path is joined onto, with a trailing slash.
    fn base_url(&self) -> &str;

    /// GET `url` with `params` as the query string and return the parsed body.
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> ApiResult<Value>;

    fn is_logged_in(&self) -> bool;
}

/// The handful of endpoints the H2H engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    H2hStandings { league: u64 },
    H2hFixtures { league: u64 },
    EntryPicks { entry: u64, event: u32 },
}

impl Endpoint {
    pub fn url(&self, base: &str) -> String {
        match self {
            Endpoint::H2hStandings { league } => format!("{base}leagues-h2h/{league}/standings/"),
            Endpoint::H2hFixtures { league } => {
                format!("{base}leagues-h2h-matches/league/{league}/")
            }
            Endpoint::EntryPicks { entry, event } => {
                format!("{base}entry/{entry}/event/{event}/picks/")
            }
        }
    }
}

/// FPL API client with its own cookie jar, which doubles as the login session.
#[derive(Debug, Clone)]
pub struct FplApi {
    client: Client,
    jar: Arc<Jar>,
    base_url: String,
    login_url: String,
    timeout: Duration,
}

impl Default for FplApi {
    fn default() -> Self {
        let jar = Arc::new(Jar::default());
        Self {
            client: Client::builder()
                .user_agent("fpl-h2h/0.1 (league tables)")
                .cookie_provider(Arc::clone(&jar))
                .build()
                .unwrap_or_default(),
            jar,
            base_url: FPL_API.to_owned(),
            login_url: FPL_LOGIN.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    /// A privileged endpoint was requested without a logged-in session.
    Unauthorized(String),
    LoginFailed(String),
    /// The body parsed as JSON but not into the shape we need.
    MalformedResponse { url: String, reason: String },
    PageLimitExceeded { url: String, max_pages: u32 },
    InvalidPhase(u8),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Unauthorized(what) => {
                write!(f, "Not authorised to get {what}. Log in first.")
            }
            ApiError::LoginFailed(msg) => write!(f, "Login failed: {msg}"),
            ApiError::MalformedResponse { url, reason } => {
                write!(f, "Malformed response from {url}: {reason}")
            }
            ApiError::PageLimitExceeded { url, max_pages } => {
                write!(f, "{url} still reported more pages after {max_pages} pages")
            }
            ApiError::InvalidPhase(n) => write!(f, "Invalid phase {n}: expected 1-4"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl FplApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another API root (a mock server, a proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reuse an existing session, e.g. a `pl_profile=...` cookie copied out of a browser.
    pub fn with_session_cookie(self, cookie: &str) -> Self {
        if let Ok(url) = Url::parse(&self.base_url) {
            self.jar.add_cookie_str(cookie, &url);
        }
        self
    }

    /// Log in with FPL credentials. On success the session cookie lands in
    /// the jar and every later request carries it.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        let form = [
            ("login", email),
            ("password", password),
            ("app", LOGIN_APP),
            ("redirect_uri", LOGIN_REDIRECT),
        ];
        let response = self
            .client
            .post(&self.login_url)
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, self.login_url.clone()))?;

        let landed = response.url().as_str().to_owned();
        debug!("login redirected to {landed}");
        if !landed.contains("state=success") {
            return Err(ApiError::LoginFailed(format!("redirected to {landed}")));
        }
        if !self.is_logged_in() {
            return Err(ApiError::LoginFailed(format!("no {SESSION_COOKIE} cookie issued")));
        }

        info!("logged in as {email}");
        Ok(())
    }
}

impl Fetcher for FplApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> ApiResult<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<Value>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
                Err(ApiError::NotFound(url.to_owned()))
            }
            Err(e) => Err(ApiError::Api(e, url.to_owned())),
        }
    }

    fn is_logged_in(&self) -> bool {
        let Ok(url) = Url::parse(&self.base_url) else {
            return false;
        };
        self.jar
            .cookies(&url)
            .and_then(|header| {
                header.to_str().ok().map(|cookies| {
                    cookies
                        .split(';')
                        .any(|c| c.trim_start().starts_with(&format!("{SESSION_COOKIE}=")))
                })
            })
            .unwrap_or(false)
    }
}
