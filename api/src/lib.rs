pub mod client;
pub mod fixture;
pub mod league;
pub mod paginate;
pub mod table;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

use crate::client::{ApiError, ApiResult};
use crate::wire::StandingsRecord;
use std::num::NonZeroU32;
use std::ops::RangeInclusive;

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the FPL wire format
// ---------------------------------------------------------------------------

pub const FIRST_GAMEWEEK: u32 = 1;
pub const LAST_GAMEWEEK: u32 = 38;
/// Gameweeks per phase. The last phase is not stretched to cover the season's tail.
pub const PHASE_LENGTH: u32 = 9;
pub const PHASE_COUNT: u8 = 4;

/// A block of gameweeks played as its own mini-competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phase(u8);

impl Phase {
    pub fn new(number: u8) -> ApiResult<Self> {
        if (1..=PHASE_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ApiError::InvalidPhase(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Inclusive gameweek window, e.g. phase 4 is 28..=36.
    pub fn window(self) -> RangeInclusive<u32> {
        let n = u32::from(self.0);
        (n - 1) * PHASE_LENGTH + 1..=n * PHASE_LENGTH
    }

    /// Window for an optional phase; no phase means the whole season.
    pub fn window_for(phase: Option<Phase>) -> RangeInclusive<u32> {
        phase.map(Phase::window).unwrap_or(FIRST_GAMEWEEK..=LAST_GAMEWEEK)
    }
}

/// A league participant, projected from a standings row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub id: u64,
    pub player_name: String,
    pub team_name: String,
}

impl From<&StandingsRecord> for Entry {
    fn from(record: &StandingsRecord) -> Self {
        Self {
            id: record.entry,
            player_name: record.player_name.clone(),
            team_name: record.entry_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Same,
}

impl Movement {
    pub fn symbol(&self) -> char {
        match self {
            Movement::Up => '+',
            Movement::Down => '-',
            Movement::Same => '=',
        }
    }
}

impl StandingsRecord {
    /// Rank change since the previous gameweek. A zero `last_rank` means the
    /// entry has no previous rank yet.
    pub fn movement(&self) -> Movement {
        if self.last_rank == 0 || self.rank == self.last_rank {
            Movement::Same
        } else if self.rank > self.last_rank {
            Movement::Down
        } else {
            Movement::Up
        }
    }
}

/// Where a fixture side's score comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringStrategy {
    /// The points the fixtures endpoint reports. The only source in normal use.
    #[default]
    RawPoints,
    /// For fixtures after `cutoff`, score each side by its own picks history
    /// for gameweek `event + offset` (net of transfer hits), or 0 once that
    /// gameweek is past `last_event`. Used for leagues whose late fixtures
    /// are settled on a later round, e.g. around double gameweeks.
    LaterGameweekPicks { cutoff: u32, offset: u32, last_event: u32 },
}

impl ScoringStrategy {
    pub fn later_gameweek() -> Self {
        ScoringStrategy::LaterGameweekPicks { cutoff: 29, offset: 9, last_event: 45 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueConfig {
    /// Safety net for listings that never stop reporting `has_next`.
    pub max_pages: Option<NonZeroU32>,
    pub scoring: ScoringStrategy,
    /// Entries whose fixtures are fetched at once while building a table.
    /// 1 keeps every request strictly sequential.
    pub concurrency: usize,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self { max_pages: None, scoring: ScoringStrategy::default(), concurrency: 1 }
    }
}
