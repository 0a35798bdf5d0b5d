/// Wire types for the FPL head-to-head endpoints.
/// Standings: https://fantasy.premierleague.com/api/leagues-h2h/{id}/standings/
/// Fixtures:  https://fantasy.premierleague.com/api/leagues-h2h-matches/league/{id}/
///
/// Only the keys we read are declared; serde drops everything else.
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of a paginated listing. Both keys are required: without
/// `has_next` there is no way to know when to stop.
#[derive(Deserialize, Debug, Clone)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub has_next: bool,
}

/// The `league` object that heads every standings page.
#[derive(Deserialize, Debug, Clone)]
pub struct LeagueEnvelope {
    pub league: LeagueInfo,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LeagueInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StandingsRecord {
    pub entry: u64,
    pub player_name: String,
    pub entry_name: String,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub last_rank: u32,
    #[serde(default)]
    pub matches_played: u32,
    #[serde(default)]
    pub matches_won: u32,
    #[serde(default)]
    pub matches_drawn: u32,
    #[serde(default)]
    pub matches_lost: u32,
    #[serde(default)]
    pub points_for: i32,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FixtureRecord {
    pub event: u32,
    /// `None` when the slot is a bye (odd-sized leagues).
    pub entry_1_entry: Option<u64>,
    pub entry_2_entry: Option<u64>,
    #[serde(default)]
    pub entry_1_points: i32,
    #[serde(default)]
    pub entry_2_points: i32,
    #[serde(default)]
    pub entry_1_player_name: Option<String>,
    #[serde(default)]
    pub entry_2_player_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PicksResponse {
    pub entry_history: EntryHistory,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EntryHistory {
    pub points: i32,
    #[serde(default)]
    pub event_transfers_cost: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixture_record_ignores_unknown_keys() {
        let raw = json!({
            "id": 991,
            "event": 12,
            "entry_1_entry": 4,
            "entry_1_name": "Gegenpressing",
            "entry_1_player_name": "Ann",
            "entry_1_points": 61,
            "entry_2_entry": 5,
            "entry_2_player_name": "Bo",
            "entry_2_points": 44,
            "is_knockout": false
        });
        let record: FixtureRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.event, 12);
        assert_eq!(record.entry_1_entry, Some(4));
        assert_eq!(record.entry_2_points, 44);
        assert_eq!(record.entry_1_player_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn bye_slot_decodes_as_none() {
        let raw = json!({ "event": 3, "entry_1_entry": 4, "entry_2_entry": null, "entry_1_points": 50 });
        let record: FixtureRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.entry_2_entry, None);
        assert_eq!(record.entry_2_points, 0);
    }

    #[test]
    fn page_without_has_next_is_rejected() {
        let raw = json!({ "results": [] });
        assert!(serde_json::from_value::<Page<FixtureRecord>>(raw).is_err());
    }

    #[test]
    fn league_created_timestamp_parses() {
        let raw = json!({ "league": { "id": 760869, "name": "Office H2H", "created": "2024-08-01T09:15:02.123456Z" } });
        let envelope: LeagueEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.league.id, 760869);
        assert!(envelope.league.created.is_some());
    }
}
