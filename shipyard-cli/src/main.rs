#![deny(missing_docs)]
//! Shipyard command-line interface.
//!
//! Lists, counts, creates, updates and deletes ships through the Shipyard
//! REST API.

mod client;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::ShipyardClient;
use serde::Serialize;
use shipyard_core::{Ship, ShipOrder, ShipPatch, ShipQuery, ShipType};
use std::fmt::Write;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "shipyard", version, about = "Shipyard CLI")]
struct Cli {
    /// Base URL of the Shipyard server.
    #[arg(
        long,
        global = true,
        env = "SHIPYARD_URL",
        default_value = "http://127.0.0.1:8080"
    )]
    server: String,
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Clone, Debug, Default)]
struct FilterArgs {
    /// Name substring.
    #[arg(long)]
    name: Option<String>,
    /// Planet substring.
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (TRANSPORT, MILITARY or MERCHANT).
    #[arg(long)]
    ship_type: Option<ShipType>,
    /// Produced on or after this day (YYYY-MM-DD).
    #[arg(long, value_parser = parse_day)]
    after: Option<NaiveDate>,
    /// Produced on or before this day (YYYY-MM-DD).
    #[arg(long, value_parser = parse_day)]
    before: Option<NaiveDate>,
    /// Usage flag.
    #[arg(long)]
    used: Option<bool>,
    /// Minimum speed.
    #[arg(long)]
    min_speed: Option<f64>,
    /// Maximum speed.
    #[arg(long)]
    max_speed: Option<f64>,
    /// Minimum crew size.
    #[arg(long)]
    min_crew: Option<i32>,
    /// Maximum crew size.
    #[arg(long)]
    max_crew: Option<i32>,
    /// Minimum rating.
    #[arg(long)]
    min_rating: Option<f64>,
    /// Maximum rating.
    #[arg(long)]
    max_rating: Option<f64>,
}

#[derive(Args, Clone, Debug, Default)]
struct PageArgs {
    /// Sort field, e.g. SPEED or CREW_SIZE.
    #[arg(long)]
    order: Option<ShipOrder>,
    /// Zero-based page number.
    #[arg(long)]
    page: Option<u32>,
    /// Ships per page.
    #[arg(long)]
    page_size: Option<u32>,
}

#[derive(Args, Clone, Debug, Default)]
struct ShipArgs {
    /// Ship name.
    #[arg(long)]
    name: Option<String>,
    /// Home planet.
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (TRANSPORT, MILITARY or MERCHANT).
    #[arg(long)]
    ship_type: Option<ShipType>,
    /// Production year; stored as January 1st, UTC.
    #[arg(long)]
    prod_year: Option<i32>,
    /// Usage flag.
    #[arg(long)]
    used: Option<bool>,
    /// Top speed.
    #[arg(long)]
    speed: Option<f64>,
    /// Crew size.
    #[arg(long)]
    crew_size: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of ships.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Count ships matching the filters.
    Count {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show a ship.
    Show {
        /// Ship identifier.
        id: i64,
    },
    /// Create a ship.
    Create(ShipArgs),
    /// Update the given fields of a ship.
    Update {
        /// Ship identifier.
        id: i64,
        #[command(flatten)]
        fields: ShipArgs,
    },
    /// Delete a ship.
    Delete {
        /// Ship identifier.
        id: i64,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = ShipyardClient::new(&cli.server)?;
    let output = run(&client, cli.command, cli.format).await?;
    print!("{output}");
    Ok(())
}

/// Execute a command and render its result.
async fn run(
    client: &ShipyardClient,
    command: Commands,
    format: OutputFormat,
) -> CliResult<String> {
    match command {
        Commands::List { filter, page } => {
            let ships = client.list(&build_query(&filter, &page)?).await?;
            render_ships(&ships, format)
        }
        Commands::Count { filter } => {
            let count = client
                .count(&build_query(&filter, &PageArgs::default())?)
                .await?;
            render_value(&count, format, |count| format!("{count}\n"))
        }
        Commands::Show { id } => render_ship(&client.get(id).await?, format),
        Commands::Create(fields) => {
            render_ship(&client.create(&build_patch(&fields)?).await?, format)
        }
        Commands::Update { id, fields } => {
            render_ship(&client.update(id, &build_patch(&fields)?).await?, format)
        }
        Commands::Delete { id } => {
            client.delete(id).await?;
            Ok(match format {
                OutputFormat::Text => format!("deleted ship {id}\n"),
                OutputFormat::Json => format!("{}\n", serde_json::json!({ "deleted": id })),
            })
        }
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got {raw:?}: {err}"))
}

fn start_of_day(day: NaiveDate) -> CliResult<i64> {
    let start = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid day {day}"))?;
    Ok(start.and_utc().timestamp_millis())
}

fn end_of_day(day: NaiveDate) -> CliResult<i64> {
    let end = day
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| format!("invalid day {day}"))?;
    Ok(end.and_utc().timestamp_millis())
}

fn start_of_year(year: i32) -> CliResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| format!("invalid production year {year}").into())
}

fn build_query(filter: &FilterArgs, page: &PageArgs) -> CliResult<ShipQuery> {
    Ok(ShipQuery {
        name: filter.name.clone(),
        planet: filter.planet.clone(),
        ship_type: filter.ship_type,
        after: filter.after.map(start_of_day).transpose()?,
        before: filter.before.map(end_of_day).transpose()?,
        is_used: filter.used,
        min_speed: filter.min_speed,
        max_speed: filter.max_speed,
        min_crew_size: filter.min_crew,
        max_crew_size: filter.max_crew,
        min_rating: filter.min_rating,
        max_rating: filter.max_rating,
        order: page.order,
        page_number: page.page,
        page_size: page.page_size,
    })
}

fn build_patch(fields: &ShipArgs) -> CliResult<ShipPatch> {
    Ok(ShipPatch {
        name: fields.name.clone(),
        planet: fields.planet.clone(),
        ship_type: fields.ship_type,
        prod_date: fields.prod_year.map(start_of_year).transpose()?,
        is_used: fields.used,
        speed: fields.speed,
        crew_size: fields.crew_size,
    })
}

fn ship_line(ship: &Ship) -> String {
    format!(
        "{:>5}  {:<20} {:<16} {:<9} {}  used={:<5} speed={:.2} crew={:<4} rating={:.2}",
        ship.id,
        ship.name,
        ship.planet,
        ship.ship_type.as_str(),
        ship.prod_date.year(),
        ship.is_used,
        ship.speed,
        ship.crew_size,
        ship.rating
    )
}

fn render_value<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
    }
}

fn render_ship(ship: &Ship, format: OutputFormat) -> CliResult<String> {
    render_value(ship, format, |ship| format!("{}\n", ship_line(ship)))
}

fn render_ships(ships: &[Ship], format: OutputFormat) -> CliResult<String> {
    render_value(&ships, format, |ships| {
        if ships.is_empty() {
            return "no ships found\n".to_string();
        }
        let mut out = String::new();
        for ship in ships.iter() {
            let _ = writeln!(out, "{}", ship_line(ship));
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{DELETE, GET};
    use httpmock::MockServer;

    const VEGA: &str = r#"{"id":7,"name":"Vega","planet":"Earth","shipType":"TRANSPORT","prodDate":32503680000000,"isUsed":false,"speed":0.5,"crewSize":100,"rating":2.0}"#;

    fn vega() -> Ship {
        serde_json::from_str(VEGA).expect("ship")
    }

    #[test]
    fn cli_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "shipyard",
            "--server",
            "http://ships:9000",
            "list",
            "--ship-type",
            "military",
            "--after",
            "2995-03-01",
            "--order",
            "crew_size",
            "--page-size",
            "5",
        ])
        .expect("parse");

        assert_eq!(cli.server, "http://ships:9000");
        assert_eq!(cli.format, OutputFormat::Text);
        match cli.command {
            Commands::List { filter, page } => {
                assert_eq!(filter.ship_type, Some(ShipType::Military));
                assert_eq!(filter.after, NaiveDate::from_ymd_opt(2995, 3, 1));
                assert_eq!(page.order, Some(ShipOrder::CrewSize));
                assert_eq!(page.page_size, Some(5));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn cli_rejects_bad_dates_and_types() {
        assert!(Cli::try_parse_from(["shipyard", "list", "--after", "3000/01/01"]).is_err());
        assert!(Cli::try_parse_from(["shipyard", "list", "--ship-type", "shuttle"]).is_err());
        assert!(Cli::try_parse_from(["shipyard", "show", "abc"]).is_err());
    }

    #[test]
    fn query_covers_whole_days() {
        let filter = FilterArgs {
            after: NaiveDate::from_ymd_opt(3000, 1, 1),
            before: NaiveDate::from_ymd_opt(3000, 1, 1),
            used: Some(false),
            min_crew: Some(3),
            ..FilterArgs::default()
        };
        let query = build_query(&filter, &PageArgs::default()).expect("query");

        assert_eq!(query.after, Some(32_503_680_000_000));
        assert_eq!(query.before, Some(32_503_680_000_000 + 86_400_000 - 1));
        assert_eq!(query.is_used, Some(false));
        assert_eq!(query.min_crew_size, Some(3));
        assert_eq!(query.page_size, None);
    }

    #[test]
    fn patch_uses_start_of_production_year() {
        let fields = ShipArgs {
            name: Some("Vega".to_string()),
            prod_year: Some(3000),
            ..ShipArgs::default()
        };
        let patch = build_patch(&fields).expect("patch");

        assert_eq!(patch.name.as_deref(), Some("Vega"));
        assert_eq!(
            patch.prod_date.map(|date| date.timestamp_millis()),
            Some(32_503_680_000_000)
        );
        assert_eq!(patch.speed, None);
    }

    #[test]
    fn renders_text_and_json() {
        let ship = vega();
        let text = render_ship(&ship, OutputFormat::Text).expect("text");
        assert!(text.contains("Vega"));
        assert!(text.contains("TRANSPORT"));
        assert!(text.contains("3000"));
        assert!(text.contains("rating=2.00"));

        let json = render_ships(&[ship], OutputFormat::Json).expect("json");
        assert!(json.contains("\"crewSize\": 100"));

        assert_eq!(
            render_ships(&[], OutputFormat::Text).expect("empty"),
            "no ships found\n"
        );
    }

    #[tokio::test]
    async fn run_show_and_delete_against_server() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/ships/7");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(VEGA);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/rest/ships/7");
                then.status(200);
            })
            .await;
        let client = ShipyardClient::new(&server.base_url()).expect("client");

        let shown = run(&client, Commands::Show { id: 7 }, OutputFormat::Text)
            .await
            .expect("show");
        assert!(shown.starts_with("    7  Vega"));

        let deleted = run(&client, Commands::Delete { id: 7 }, OutputFormat::Json)
            .await
            .expect("delete");
        assert_eq!(deleted, "{\"deleted\":7}\n");
    }

    #[tokio::test]
    async fn run_count_reports_server_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/ships/count")
                    .query_param("minSpeed", "0.5");
                then.status(400)
                    .header("content-type", "application/json")
                    .body(r#"{"message":"bad filter"}"#);
            })
            .await;
        let client = ShipyardClient::new(&server.base_url()).expect("client");

        let command = Commands::Count {
            filter: FilterArgs {
                min_speed: Some(0.5),
                ..FilterArgs::default()
            },
        };
        let error = run(&client, command, OutputFormat::Text)
            .await
            .expect_err("bad request");
        assert!(error.to_string().contains("bad filter"));
    }
}
