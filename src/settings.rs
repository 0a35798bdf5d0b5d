use anyhow::{Context, bail};
use fpl_api::{LeagueConfig, Phase, ScoringStrategy};
use std::num::NonZeroU32;
use std::time::Duration;

/// Runtime settings: credentials and tuning from the environment (and `.env`),
/// league selection from the command line.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    pub email: Option<String>,
    pub password: Option<String>,
    pub cookie: Option<String>,
    pub api_base: Option<String>,
    pub league_id: Option<u64>,
    pub max_pages: Option<NonZeroU32>,
    pub timeout: Option<Duration>,
    pub scoring: ScoringStrategy,
    pub concurrency: usize,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env is fine; the real environment still applies.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let scoring = match get("FPL_SCORING").as_deref() {
            None | Some("raw") => ScoringStrategy::RawPoints,
            Some("later-gameweek") => ScoringStrategy::later_gameweek(),
            Some(other) => bail!("FPL_SCORING must be `raw` or `later-gameweek`, got `{other}`"),
        };

        Ok(Self {
            email: get("FPL_EMAIL"),
            password: get("FPL_PASSWORD"),
            cookie: get("FPL_COOKIE"),
            api_base: get("FPL_API_BASE"),
            league_id: get("FPL_LEAGUE_ID")
                .map(|v| v.parse().context("FPL_LEAGUE_ID must be a number"))
                .transpose()?,
            max_pages: get("FPL_MAX_PAGES")
                .map(|v| v.parse().context("FPL_MAX_PAGES must be a positive number"))
                .transpose()?,
            timeout: get("FPL_TIMEOUT_SECS")
                .map(|v| v.parse().context("FPL_TIMEOUT_SECS must be a number of seconds"))
                .transpose()?
                .map(Duration::from_secs),
            scoring,
            concurrency: get("FPL_CONCURRENCY")
                .map(|v| v.parse().context("FPL_CONCURRENCY must be a number"))
                .transpose()?
                .unwrap_or(1),
        })
    }

    /// Email and password, when both are set. Only one of them is a mistake.
    pub fn credentials(&self) -> anyhow::Result<Option<(&str, &str)>> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Ok(Some((email.as_str(), password.as_str()))),
            (None, None) => Ok(None),
            (Some(_), None) => bail!("FPL_EMAIL is set but FPL_PASSWORD is not"),
            (None, Some(_)) => bail!("FPL_PASSWORD is set but FPL_EMAIL is not"),
        }
    }

    pub fn league_config(&self) -> LeagueConfig {
        LeagueConfig { max_pages: self.max_pages, scoring: self.scoring, concurrency: self.concurrency }
    }
}

/// What to show, parsed from the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub league_id: Option<u64>,
    pub phase: Option<Phase>,
    pub gameweek: Option<u32>,
    pub standings: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(CliArgs),
    Help,
    Version,
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Command> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "-p" | "--phase" => {
                let value = args.next().context("--phase needs a value")?;
                let number: u8 = value.parse().context("--phase must be 1-4")?;
                parsed.phase = Some(Phase::new(number)?);
            }
            "-g" | "--gameweek" => {
                let value = args.next().context("--gameweek needs a value")?;
                let gameweek: u32 = value.parse().context("--gameweek must be a number")?;
                if gameweek == 0 {
                    bail!("--gameweek starts at 1");
                }
                parsed.gameweek = Some(gameweek);
            }
            "-s" | "--standings" => parsed.standings = true,
            other if other.starts_with('-') => bail!("Unknown argument: {other}"),
            other => {
                parsed.league_id = Some(other.parse().context("league id must be a number")?);
            }
        }
    }

    Ok(Command::Run(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    fn args(list: &[&str]) -> anyhow::Result<Command> {
        parse_args(list.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.league_config(), LeagueConfig::default());
        assert!(s.email.is_none());
    }

    #[test]
    fn environment_overrides_tuning() {
        let s = settings(&[
            ("FPL_MAX_PAGES", "50"),
            ("FPL_SCORING", "later-gameweek"),
            ("FPL_CONCURRENCY", "4"),
            ("FPL_LEAGUE_ID", "760869"),
            ("FPL_EMAIL", "  "),
        ])
        .unwrap();
        assert_eq!(s.max_pages, NonZeroU32::new(50));
        assert_eq!(s.scoring, ScoringStrategy::later_gameweek());
        assert_eq!(s.concurrency, 4);
        assert_eq!(s.league_id, Some(760869));
        assert!(s.email.is_none(), "blank values count as unset");
    }

    #[test]
    fn zero_page_cap_is_rejected() {
        let err = settings(&[("FPL_MAX_PAGES", "0")]).unwrap_err();
        assert!(err.to_string().contains("FPL_MAX_PAGES"), "got {err:#}");
        assert_eq!(settings(&[("FPL_MAX_PAGES", "1")]).unwrap().max_pages, NonZeroU32::new(1));
    }

    #[test]
    fn timeout_is_read_in_seconds() {
        assert_eq!(settings(&[("FPL_TIMEOUT_SECS", "30")]).unwrap().timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings(&[]).unwrap().timeout, None);
    }

    #[test]
    fn credentials_need_both_halves() {
        let both = settings(&[("FPL_EMAIL", "ann@example.com"), ("FPL_PASSWORD", "hunter2")]).unwrap();
        assert_eq!(both.credentials().unwrap(), Some(("ann@example.com", "hunter2")));
        assert_eq!(settings(&[]).unwrap().credentials().unwrap(), None);
        assert!(settings(&[("FPL_EMAIL", "ann@example.com")]).unwrap().credentials().is_err());
        assert!(settings(&[("FPL_PASSWORD", "hunter2")]).unwrap().credentials().is_err());
    }

    #[test]
    fn unknown_scoring_is_rejected() {
        assert!(settings(&[("FPL_SCORING", "bonus")]).is_err());
    }

    #[test]
    fn parses_league_phase_and_gameweek() {
        let Command::Run(parsed) = args(&["760869", "--phase", "4", "-g", "30"]).unwrap() else {
            panic!("expected a run command");
        };
        assert_eq!(parsed.league_id, Some(760869));
        assert_eq!(parsed.phase, Some(Phase::new(4).unwrap()));
        assert_eq!(parsed.gameweek, Some(30));
        assert!(!parsed.standings);
    }

    #[test]
    fn standings_flag_switches_view() {
        let Command::Run(parsed) = args(&["--standings", "760869"]).unwrap() else {
            panic!("expected a run command");
        };
        assert!(parsed.standings);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(args(&["--help", "nonsense"]).unwrap(), Command::Help);
        assert_eq!(args(&["-V"]).unwrap(), Command::Version);
    }

    #[test]
    fn bad_arguments_are_errors() {
        assert!(args(&["--phase", "5"]).is_err());
        assert!(args(&["--phase"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["my-league"]).is_err());
        assert!(args(&["--gameweek", "0"]).is_err());
    }
}
