use crate::client::{ApiError, ApiResult, Endpoint, Fetcher};
use crate::fixture::H2HFixture;
use crate::paginate::{PageOptions, PageShape, paginate};
use crate::wire::{FixtureRecord, LeagueEnvelope, LeagueInfo, StandingsRecord};
use crate::{Entry, LeagueConfig, Phase};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

const FIXTURES_PAGE_PARAM: &str = "page";
const STANDINGS_PAGE_PARAM: &str = "page_standings";

/// Filters for a fixtures listing. Everything unset means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureQuery {
    pub gameweek: Option<u32>,
    pub entry: Option<u64>,
    pub phase: Option<Phase>,
}

impl FixtureQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gameweek(mut self, gameweek: u32) -> Self {
        self.gameweek = Some(gameweek);
        self
    }

    pub fn entry(mut self, entry: u64) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn phase(mut self, phase: Option<Phase>) -> Self {
        self.phase = phase;
        self
    }

    /// Server-side filters. The phase is applied locally after fetching.
    /// A zero gameweek or entry is not a filter and is left off.
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(gameweek) = self.gameweek.filter(|&gw| gw > 0) {
            params.push(("event", gameweek.to_string()));
        }
        if let Some(entry) = self.entry.filter(|&id| id > 0) {
            params.push(("entry", entry.to_string()));
        }
        params
    }
}

/// A head-to-head league bound to the session that loaded it.
///
/// Standings and entries are fetched once and kept for the league's lifetime;
/// fixtures are fetched fresh on every call.
#[derive(Debug)]
pub struct H2HLeague<F> {
    id: u64,
    name: String,
    created: Option<DateTime<Utc>>,
    session: Arc<F>,
    config: LeagueConfig,
    standings: OnceCell<Vec<StandingsRecord>>,
    entries: OnceCell<Vec<Entry>>,
}

impl<F: Fetcher> H2HLeague<F> {
    pub fn new(info: LeagueInfo, session: Arc<F>, config: LeagueConfig) -> Self {
        Self {
            id: info.id,
            name: info.name,
            created: info.created,
            session,
            config,
            standings: OnceCell::new(),
            entries: OnceCell::new(),
        }
    }

    /// Look the league up by id; its name comes from the head of the standings.
    pub async fn load(session: Arc<F>, id: u64, config: LeagueConfig) -> ApiResult<Self> {
        let url = Endpoint::H2hStandings { league: id }.url(session.base_url());
        let body = session.fetch(&url, &[(STANDINGS_PAGE_PARAM, "1".to_owned())]).await?;
        let LeagueEnvelope { league } = serde_json::from_value(body)
            .map_err(|e| ApiError::MalformedResponse { url, reason: e.to_string() })?;
        info!("loaded league {} ({})", league.name, league.id);
        Ok(Self::new(league, session, config))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<F> {
        &self.session
    }

    /// Fixtures and results of the league, in the order the API lists them.
    pub async fn get_fixtures(&self, query: FixtureQuery) -> ApiResult<Vec<H2HFixture<F>>> {
        if !self.session.is_logged_in() {
            return Err(ApiError::Unauthorized("H2H fixtures".into()));
        }

        let url = Endpoint::H2hFixtures { league: self.id }.url(self.session.base_url());
        let records: Vec<FixtureRecord> = paginate(
            &*self.session,
            &url,
            &query.params(),
            PageShape::Flat,
            self.page_options(FIXTURES_PAGE_PARAM),
        )
        .await?;

        let window = Phase::window_for(query.phase);
        let fetched = records.len();
        let fixtures: Vec<H2HFixture<F>> = records
            .into_iter()
            .filter(|r| window.contains(&r.event))
            .map(|r| H2HFixture::new(r, Arc::clone(&self.session), self.config.scoring))
            .collect();

        debug!(
            "league {}: {} of {fetched} fixtures within gameweeks {}-{}",
            self.id,
            fixtures.len(),
            window.start(),
            window.end()
        );
        Ok(fixtures)
    }

    /// Every standings row, in the order the API ranks them.
    pub async fn standings(&self) -> ApiResult<&[StandingsRecord]> {
        self.standings
            .get_or_try_init(|| async {
                let url = Endpoint::H2hStandings { league: self.id }.url(self.session.base_url());
                paginate(
                    &*self.session,
                    &url,
                    &[],
                    PageShape::Nested("standings"),
                    self.page_options(STANDINGS_PAGE_PARAM),
                )
                .await
            })
            .await
            .map(Vec::as_slice)
    }

    pub async fn entries(&self) -> ApiResult<&[Entry]> {
        self.entries
            .get_or_try_init(|| async {
                Ok(self.standings().await?.iter().map(Entry::from).collect())
            })
            .await
            .map(Vec::as_slice)
    }

    fn page_options(&self, page_param: &'static str) -> PageOptions {
        PageOptions::new(page_param).with_max_pages(self.config.max_pages)
    }
}

impl<F> fmt::Display for H2HLeague<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.id)
    }
}
