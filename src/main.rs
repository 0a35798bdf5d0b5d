mod settings;

use crate::settings::{CliArgs, Command, Settings, parse_args};
use anyhow::Context;
use fpl_api::client::FplApi;
use fpl_api::fixture::Side;
use fpl_api::league::{FixtureQuery, H2HLeague};
use fpl_api::table::TableRow;
use log::error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(Command::Version) => {
            println!("fpl-h2h {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::load()?;
    if let Err(e) = run(&settings, &args).await {
        error!("{e:#}");
        return Err(e);
    }
    Ok(())
}

async fn run(settings: &Settings, args: &CliArgs) -> anyhow::Result<()> {
    let league_id = args
        .league_id
        .or(settings.league_id)
        .context("no league id given (pass one or set FPL_LEAGUE_ID)")?;

    let mut api = FplApi::new();
    if let Some(base) = &settings.api_base {
        api = api.with_base_url(base.as_str());
    }
    if let Some(cookie) = &settings.cookie {
        api = api.with_session_cookie(cookie);
    }
    if let Some(timeout) = settings.timeout {
        api = api.with_timeout(timeout);
    }
    if let Some((email, password)) = settings.credentials()? {
        api.login(email, password).await.context("could not log in to FPL")?;
    }

    let league = H2HLeague::load(Arc::new(api), league_id, settings.league_config())
        .await
        .with_context(|| format!("could not load league {league_id}"))?;

    match league.created() {
        Some(created) => println!("{league} (created {})", created.format("%Y-%m-%d")),
        None => println!("{league}"),
    }

    if args.standings {
        print_standings(&league).await?;
    }

    if let Some(gameweek) = args.gameweek {
        print_fixtures(&league, gameweek).await?;
    }

    let table = league.table(args.phase).await.context("could not build league table")?;
    println!();
    match args.phase {
        Some(phase) => println!("Phase {} (gameweeks {:?})", phase.number(), phase.window()),
        None => println!("Season"),
    }
    print_table(&table);
    Ok(())
}

async fn print_fixtures(league: &H2HLeague<FplApi>, gameweek: u32) -> anyhow::Result<()> {
    println!("\nGameweek {gameweek}");
    let fixtures = league
        .get_fixtures(FixtureQuery::new().gameweek(gameweek))
        .await
        .with_context(|| format!("could not fetch gameweek {gameweek} fixtures"))?;
    for fixture in &fixtures {
        let one = fixture.points(Side::One).await?;
        let two = fixture.points(Side::Two).await?;
        println!(
            "{} {one} - {two} {}",
            fixture.player_name(Side::One),
            fixture.player_name(Side::Two)
        );
    }
    Ok(())
}

/// The league's own standings as FPL reports them, with rank movement.
async fn print_standings(league: &H2HLeague<FplApi>) -> anyhow::Result<()> {
    let standings = league.standings().await.context("could not fetch standings")?;
    println!("\nStandings");
    println!("{:>4}   {:<40} {:>3} {:>3} {:>3} {:>3} {:>6}", "#", "Manager", "P", "W", "D", "L", "Pts");
    for record in standings {
        println!(
            "{:>4} {} {:<40} {:>3} {:>3} {:>3} {:>3} {:>6}",
            record.rank,
            record.movement().symbol(),
            record.player_name,
            record.matches_played,
            record.matches_won,
            record.matches_drawn,
            record.matches_lost,
            record.points_for,
        );
    }
    Ok(())
}

fn print_table(rows: &[TableRow]) {
    print_row(&TableRow::HEADERS.map(str::to_owned));
    for row in rows {
        print_row(&row.cells());
    }
}

fn print_row([name, w, d, l, fpl, h2h]: &[String; 6]) {
    println!("{name:<40} {w:>3} {d:>3} {l:>3} {fpl:>10} {h2h:>10}");
}

fn usage_text() -> &'static str {
    "fpl-h2h - head-to-head league tables for Fantasy Premier League

Usage:
  fpl-h2h [LEAGUE_ID] [--phase 1-4] [--gameweek N] [--standings]
  fpl-h2h --help
  fpl-h2h --version

Environment (a .env file is read too):
  FPL_EMAIL, FPL_PASSWORD   Credentials used to log in
  FPL_COOKIE               Existing session cookie (pl_profile=...)
  FPL_LEAGUE_ID            League to show when none is given
  FPL_API_BASE             API root (default https://fantasy.premierleague.com/api/)
  FPL_MAX_PAGES            Give up on listings longer than this many pages (at least 1)
  FPL_TIMEOUT_SECS         Per-request timeout in seconds
  FPL_SCORING              raw (default) or later-gameweek
  FPL_CONCURRENCY          Entries fetched at once while building a table (default 1)
  RUST_LOG                 Log filter (default warn)"
}
