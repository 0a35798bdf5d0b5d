use crate::client::{ApiResult, Fetcher};
use crate::fixture::{H2HFixture, Side};
use crate::league::{FixtureQuery, H2HLeague};
use crate::{Entry, Phase};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use log::{info, warn};
use std::cmp::Ordering;
use std::fmt;

/// One league-table line: an entry's record over a set of fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub name: String,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    /// Raw FPL points scored across the fixtures.
    pub fpl_points: i32,
    /// League points, 3 per win and 1 per draw.
    pub h2h_points: u32,
}

impl TableRow {
    pub const HEADERS: [&'static str; 6] = ["Name", "W", "D", "L", "FPL points", "H2H points"];

    pub fn for_entry(entry: &Entry) -> Self {
        Self { name: format!("{} ({})", entry.player_name, entry.team_name), ..Self::default() }
    }

    /// Fold one fixture into the row, from `side`'s point of view.
    pub async fn record<F: Fetcher>(&mut self, fixture: &H2HFixture<F>, side: Side) -> ApiResult<()> {
        self.wins += u32::from(fixture.win(side).await?);
        self.draws += u32::from(fixture.draw(side).await?);
        self.losses += u32::from(fixture.loss(side).await?);
        self.fpl_points += fixture.points(side).await?;
        self.h2h_points += fixture.total(side).await?;
        Ok(())
    }

    pub fn cells(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.wins.to_string(),
            self.draws.to_string(),
            self.losses.to_string(),
            self.fpl_points.to_string(),
            self.h2h_points.to_string(),
        ]
    }

    /// Table order: league points, then FPL points, both descending.
    pub fn standing_cmp(&self, other: &Self) -> Ordering {
        other
            .h2h_points
            .cmp(&self.h2h_points)
            .then_with(|| other.fpl_points.cmp(&self.fpl_points))
    }
}

impl fmt::Display for TableRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<40} {:>3} {:>3} {:>3} {:>10} {:>10}",
            self.name, self.wins, self.draws, self.losses, self.fpl_points, self.h2h_points
        )
    }
}

/// Stable, so rows that tie on both keys keep their incoming order.
pub fn sort_table(rows: &mut [TableRow]) {
    rows.sort_by(TableRow::standing_cmp);
}

impl<F: Fetcher> H2HLeague<F> {
    /// One entry's record over the league's fixtures, optionally limited to a phase.
    pub async fn table_entry(&self, entry: &Entry, phase: Option<Phase>) -> ApiResult<TableRow> {
        let mut row = TableRow::for_entry(entry);
        let fixtures = self.get_fixtures(FixtureQuery::new().entry(entry.id).phase(phase)).await?;
        for fixture in &fixtures {
            match fixture.side_of(entry.id) {
                Some(side) => row.record(fixture, side).await?,
                None => warn!(
                    "gameweek {} fixture listed for entry {} does not involve it",
                    fixture.event(),
                    entry.id
                ),
            }
        }
        Ok(row)
    }

    /// The league table, best first.
    pub async fn table(&self, phase: Option<Phase>) -> ApiResult<Vec<TableRow>> {
        let entries = self.entries().await?;
        let concurrency = self.config().concurrency.max(1);
        info!(
            "building table for {} ({} entries, phase {:?}, {concurrency} at a time)",
            self,
            entries.len(),
            phase.map(Phase::number)
        );

        let mut rows: Vec<TableRow> = stream::iter(entries)
            .map(|entry| self.table_entry(entry, phase))
            .buffered(concurrency)
            .try_collect()
            .await?;

        sort_table(&mut rows);
        Ok(rows)
    }
}
