//! Per-fixture derived scores.
//!
//! Every derived field is evaluated at most once per fixture and cached. The
//! dependency chain is points -> win -> draw -> loss -> total; each accessor
//! pulls its inputs through the other accessors, so a field always sees the
//! same cached values its siblings saw.
use crate::ScoringStrategy;
use crate::client::{ApiError, ApiResult, Endpoint, Fetcher};
use crate::wire::{FixtureRecord, PicksResponse};
use log::debug;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// League points for a win. A draw is worth 1, a loss 0.
pub const WIN_POINTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Which side `entry` played in `record`, if either.
    pub fn of(record: &FixtureRecord, entry: u64) -> Option<Side> {
        if record.entry_1_entry == Some(entry) {
            Some(Side::One)
        } else if record.entry_2_entry == Some(entry) {
            Some(Side::Two)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct Derived {
    points: [OnceCell<i32>; 2],
    win: [OnceCell<bool>; 2],
    draw: [OnceCell<bool>; 2],
    loss: [OnceCell<bool>; 2],
    total: [OnceCell<u32>; 2],
}

/// One head-to-head matchup plus its lazily derived results.
#[derive(Debug)]
pub struct H2HFixture<F> {
    record: FixtureRecord,
    session: Arc<F>,
    scoring: ScoringStrategy,
    derived: Derived,
}

impl<F: Fetcher> H2HFixture<F> {
    pub fn new(record: FixtureRecord, session: Arc<F>, scoring: ScoringStrategy) -> Self {
        Self { record, session, scoring, derived: Derived::default() }
    }

    pub fn event(&self) -> u32 {
        self.record.event
    }

    pub fn entry(&self, side: Side) -> Option<u64> {
        match side {
            Side::One => self.record.entry_1_entry,
            Side::Two => self.record.entry_2_entry,
        }
    }

    pub fn player_name(&self, side: Side) -> &str {
        let name = match side {
            Side::One => &self.record.entry_1_player_name,
            Side::Two => &self.record.entry_2_player_name,
        };
        name.as_deref().unwrap_or("BYE")
    }

    pub fn side_of(&self, entry: u64) -> Option<Side> {
        Side::of(&self.record, entry)
    }

    fn raw_points(&self, side: Side) -> i32 {
        match side {
            Side::One => self.record.entry_1_points,
            Side::Two => self.record.entry_2_points,
        }
    }

    pub async fn points(&self, side: Side) -> ApiResult<i32> {
        self.derived.points[side.index()]
            .get_or_try_init(|| self.score(side))
            .await
            .copied()
    }

    pub async fn win(&self, side: Side) -> ApiResult<bool> {
        self.derived.win[side.index()]
            .get_or_try_init(|| async {
                let one = self.points(Side::One).await?;
                let two = self.points(Side::Two).await?;
                Ok(match side {
                    Side::One => one > two,
                    Side::Two => one < two,
                })
            })
            .await
            .copied()
    }

    /// A level score counts as a draw for both sides, unless nobody scored.
    pub async fn draw(&self, side: Side) -> ApiResult<bool> {
        match side {
            Side::One => self.level().await,
            Side::Two => self.derived.draw[1].get_or_try_init(|| self.level()).await.copied(),
        }
    }

    async fn level(&self) -> ApiResult<bool> {
        self.derived.draw[0]
            .get_or_try_init(|| async {
                let one = self.points(Side::One).await?;
                let two = self.points(Side::Two).await?;
                Ok(0 < one && one == two)
            })
            .await
            .copied()
    }

    pub async fn loss(&self, side: Side) -> ApiResult<bool> {
        self.derived.loss[side.index()]
            .get_or_try_init(|| self.win(side.opponent()))
            .await
            .copied()
    }

    /// League points earned by `side`: 3 for a win, 1 for a draw.
    pub async fn total(&self, side: Side) -> ApiResult<u32> {
        self.derived.total[side.index()]
            .get_or_try_init(|| async {
                let win = self.win(side).await?;
                let draw = self.draw(side).await?;
                Ok(WIN_POINTS * u32::from(win) + u32::from(draw))
            })
            .await
            .copied()
    }

    async fn score(&self, side: Side) -> ApiResult<i32> {
        let raw = self.raw_points(side);
        match self.scoring {
            ScoringStrategy::RawPoints => Ok(raw),
            ScoringStrategy::LaterGameweekPicks { cutoff, offset, last_event } => {
                if self.record.event <= cutoff {
                    return Ok(raw);
                }
                let Some(entry) = self.entry(side) else {
                    return Ok(raw);
                };
                let event = self.record.event + offset;
                if event > last_event {
                    return Ok(0);
                }
                self.picks_score(entry, event).await
            }
        }
    }

    async fn picks_score(&self, entry: u64, event: u32) -> ApiResult<i32> {
        let url = Endpoint::EntryPicks { entry, event }.url(self.session.base_url());
        debug!("scoring entry {entry} from gameweek {event} picks");
        let body = self.session.fetch(&url, &[]).await?;
        let picks: PicksResponse = serde_json::from_value(body)
            .map_err(|e| ApiError::MalformedResponse { url, reason: e.to_string() })?;
        let history = picks.entry_history;
        Ok(history.points - history.event_transfers_cost)
    }
}
