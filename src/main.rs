use std::path::PathBuf;
use std::process;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use railr::error::RailError;
use railr::fetch::{self, FetchOptions};
use railr::model::{FareTable, TrainType};
use railr::parse::RecordSkip;
use railr::query::{self, QueryParams};
use railr::stations::{self, StationCache, StationCacheConfig, StationDirectory};
use railr::table;

#[derive(Parser)]
#[command(
    name = "railr",
    about = "Search 12306 train tickets from the terminal",
    version,
    after_help = "\
Examples:
  railr query -f 北京 -t 上海 -d 2026-09-01
  railr query -f beijing -t shanghai --types G,D --no-prices
  railr query -f 北京 -t 上海 --json --pretty
  railr transfer -f 成都 -v 西安 -t 北京 -d 2026-09-01 --same-station --top 5"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search direct trains between two stations",
        long_about = "Search direct trains between two stations on a travel date.\n\
            Stations accept the Chinese name (北京), the full romanization (beijing), \
            or the short romanization (bj).",
        after_help = "\
Examples:
  Basic:        railr query -f 北京 -t 上海
  With date:    railr query -f 成都 -t 重庆 -d 2026-09-01
  High-speed:   railr query -f beijing -t shanghai --types G,C
  No fares:     railr query -f 北京 -t 上海 --no-prices
  JSON output:  railr query -f 北京 -t 上海 --json --pretty"
    )]
    Query(QueryArgs),
    #[command(
        about = "Search two-leg transfer itineraries through an intermediate station",
        long_about = "Search feasible transfer itineraries: an inbound train to the \
            intermediate station paired with an outbound train leaving it no earlier \
            than the inbound arrival, ranked by total travel time.",
        after_help = "\
Examples:
  Basic:         railr transfer -f 成都 -v 西安 -t 北京
  Same station:  railr transfer -f 成都 -v 西安 -t 北京 --same-station
  Best five:     railr transfer -f 广州 -v 长沙 -t 武汉 --top 5
  JSON output:   railr transfer -f 成都 -v 西安 -t 北京 --json"
    )]
    Transfer(TransferArgs),
}

#[derive(clap::Args)]
struct QueryArgs {
    #[arg(
        short, long,
        value_name = "STATION",
        help = "Departure station (Chinese name, pinyin, or short form)"
    )]
    from: String,

    #[arg(short, long, value_name = "STATION", help = "Arrival station")]
    to: String,

    #[arg(
        short, long,
        value_name = "YYYY-MM-DD",
        help = "Travel date [default: today]"
    )]
    date: Option<String>,

    #[arg(
        long,
        value_name = "G,D,...",
        help = "Filter train types [G, C, D, Z, T, K, L]"
    )]
    types: Option<String>,

    #[arg(long, help = "Skip the per-train fare lookups (much faster)")]
    no_prices: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(
        long,
        default_value = "5",
        value_name = "SECS",
        help = "Pause between consecutive 12306 requests"
    )]
    delay: u64,

    #[arg(long, default_value = "30", value_name = "SECS", help = "Request timeout")]
    timeout: u64,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Station directory cache file [default: stations_cache.json]"
    )]
    stations_cache: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TransferArgs {
    #[arg(
        short, long,
        value_name = "STATION",
        help = "Departure station (Chinese name, pinyin, or short form)"
    )]
    from: String,

    #[arg(short = 'v', long, value_name = "STATION", help = "Intermediate station")]
    via: String,

    #[arg(short, long, value_name = "STATION", help = "Arrival station")]
    to: String,

    #[arg(
        short, long,
        value_name = "YYYY-MM-DD",
        help = "Travel date [default: today]"
    )]
    date: Option<String>,

    #[arg(
        long,
        value_name = "G,D,...",
        help = "Filter train types [G, C, D, Z, T, K, L]"
    )]
    types: Option<String>,

    #[arg(
        long,
        help = "Only keep itineraries arriving and departing at the same station"
    )]
    same_station: bool,

    #[arg(long, value_name = "N", help = "Show only the N best itineraries")]
    top: Option<usize>,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(
        long,
        default_value = "5",
        value_name = "SECS",
        help = "Pause between consecutive 12306 requests"
    )]
    delay: u64,

    #[arg(long, default_value = "30", value_name = "SECS", help = "Request timeout")]
    timeout: u64,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Station directory cache file [default: stations_cache.json]"
    )]
    stations_cache: Option<PathBuf>,
}

fn error_code(err: &RailError) -> i32 {
    match err {
        RailError::InvalidDate(_)
        | RailError::Validation(_)
        | RailError::UnknownStation(_) => 2,
        RailError::Timeout
        | RailError::ConnectionFailed(_)
        | RailError::DnsResolution(_)
        | RailError::TlsError(_)
        | RailError::ProxyError(_) => 3,
        RailError::RateLimited
        | RailError::Blocked(_)
        | RailError::FareLookupFailed { .. } => 4,
        RailError::HttpStatus(_) => 5,
        RailError::BadPayload(_) | RailError::MalformedRecord(_) => 6,
        RailError::Cache(_) => 7,
    }
}

fn error_kind(err: &RailError) -> &'static str {
    match err {
        RailError::InvalidDate(_) => "invalid_date",
        RailError::Validation(_) => "validation_error",
        RailError::UnknownStation(_) => "unknown_station",
        RailError::Timeout => "timeout",
        RailError::ConnectionFailed(_) => "connection_failed",
        RailError::DnsResolution(_) => "dns_error",
        RailError::TlsError(_) => "tls_error",
        RailError::ProxyError(_) => "proxy_error",
        RailError::RateLimited => "rate_limited",
        RailError::Blocked(_) => "blocked",
        RailError::FareLookupFailed { .. } => "fare_lookup_failed",
        RailError::HttpStatus(_) => "http_error",
        RailError::BadPayload(_) => "parse_error",
        RailError::MalformedRecord(_) => "parse_error",
        RailError::Cache(_) => "cache_error",
    }
}

fn die(err: &RailError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": err.to_string(),
            }
        });
        println!("{}", serde_json::to_string(&json).unwrap());
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn travel_date(arg: Option<&str>) -> Result<NaiveDate, RailError> {
    let date = match arg {
        Some(s) => query::parse_travel_date(s)?,
        None => Local::now().date_naive(),
    };
    query::validate_travel_date(date)?;
    Ok(date)
}

fn type_filter(arg: Option<&str>) -> Result<Vec<TrainType>, RailError> {
    match arg {
        Some(s) => query::parse_type_filter(s),
        None => Ok(Vec::new()),
    }
}

fn station_cache(path: Option<PathBuf>) -> StationCache {
    let config = match path {
        Some(path) => StationCacheConfig::new(path),
        None => StationCacheConfig::default(),
    };
    StationCache::new(config)
}

fn resolve_code(
    directory: &StationDirectory,
    input: &str,
) -> Result<String, RailError> {
    directory
        .resolve(input)
        .map(|station| station.code.clone())
        .ok_or_else(|| RailError::UnknownStation(input.to_string()))
}

fn print_skips(label: &str, skipped: &[RecordSkip]) {
    for skip in skipped {
        eprintln!("warning: skipped {label} record {}: {}", skip.index, skip.reason);
    }
}

async fn run_query(args: QueryArgs) {
    let json_mode = args.json || args.pretty;

    let date = match travel_date(args.date.as_deref()) {
        Ok(d) => d,
        Err(e) => die(&e, json_mode),
    };
    let types = match type_filter(args.types.as_deref()) {
        Ok(t) => t,
        Err(e) => die(&e, json_mode),
    };

    let options = FetchOptions {
        proxy: args.proxy.clone(),
        timeout: args.timeout,
        delay: args.delay,
    };

    let client = match fetch::build_client(&options).await {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    let cache = station_cache(args.stations_cache.clone());
    let directory = match stations::load_directory(&client, &cache).await {
        Ok(d) => d,
        Err(e) => die(&e, json_mode),
    };

    let from_code = match resolve_code(&directory, &args.from) {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };
    let to_code = match resolve_code(&directory, &args.to) {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    let params = QueryParams::new(date, from_code, to_code);
    if let Err(e) = params.validate() {
        die(&e, json_mode);
    }

    let schedule = match railr::query_schedule(&client, &params).await {
        Ok(s) => s,
        Err(e) => die(&e, json_mode),
    };
    let legs = query::filter_by_type(schedule.legs, &types);

    let fares: Option<Vec<Option<FareTable>>> = if args.no_prices || legs.is_empty() {
        None
    } else {
        tokio::time::sleep(options.effective_delay()).await;
        let tables = fetch::fetch_fare_tables(&client, &legs, date, &options).await;
        Some(
            tables
                .into_iter()
                .zip(&legs)
                .map(|(result, leg)| match result {
                    Ok(table) => Some(table),
                    Err(e) => {
                        if !json_mode {
                            eprintln!("warning: {}: {e}", leg.train_number);
                        }
                        None
                    }
                })
                .collect(),
        )
    };

    if json_mode {
        let output = serde_json::json!({
            "date": date,
            "from": directory.name_of(&params.from_station),
            "to": directory.name_of(&params.to_station),
            "legs": legs,
            "fares": fares,
            "skipped": schedule.skipped,
        });
        let rendered = if args.pretty {
            serde_json::to_string_pretty(&output).unwrap()
        } else {
            serde_json::to_string(&output).unwrap()
        };
        println!("{rendered}");
        return;
    }

    print_skips("schedule", &schedule.skipped);
    if legs.is_empty() {
        println!("No trains found.");
        return;
    }
    println!(
        "\n查询到 {} 从 {} 到 {} 的列车一共 {} 趟\n",
        date.format("%Y-%m-%d"),
        directory.name_of(&params.from_station).unwrap_or(&args.from),
        directory.name_of(&params.to_station).unwrap_or(&args.to),
        legs.len()
    );
    println!("{}", table::render_schedule(&legs, fares.as_deref(), &directory));
}

async fn run_transfer(args: TransferArgs) {
    let json_mode = args.json || args.pretty;

    let date = match travel_date(args.date.as_deref()) {
        Ok(d) => d,
        Err(e) => die(&e, json_mode),
    };
    let types = match type_filter(args.types.as_deref()) {
        Ok(t) => t,
        Err(e) => die(&e, json_mode),
    };

    let options = FetchOptions {
        proxy: args.proxy.clone(),
        timeout: args.timeout,
        delay: args.delay,
    };

    let client = match fetch::build_client(&options).await {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    let cache = station_cache(args.stations_cache.clone());
    let directory = match stations::load_directory(&client, &cache).await {
        Ok(d) => d,
        Err(e) => die(&e, json_mode),
    };

    let from_code = match resolve_code(&directory, &args.from) {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };
    let via_code = match resolve_code(&directory, &args.via) {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };
    let to_code = match resolve_code(&directory, &args.to) {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    let inbound = QueryParams::new(date, from_code, via_code.clone());
    let outbound = QueryParams::new(date, via_code, to_code);
    for params in [&inbound, &outbound] {
        if let Err(e) = params.validate() {
            die(&e, json_mode);
        }
    }

    let mut result = match railr::search_transfers(
        &client,
        &inbound,
        &outbound,
        args.same_station,
        &types,
        &options,
    )
    .await
    {
        Ok(r) => r,
        Err(e) => die(&e, json_mode),
    };

    if let Some(n) = args.top {
        result.itineraries.truncate(n);
    }

    if json_mode {
        let output = serde_json::json!({
            "date": date,
            "from": directory.name_of(&inbound.from_station),
            "via": directory.name_of(&inbound.to_station),
            "to": directory.name_of(&outbound.to_station),
            "same_station": args.same_station,
            "itineraries": table::transfer_rows(&result.itineraries, &directory),
            "inbound_skipped": result.inbound_skipped,
            "outbound_skipped": result.outbound_skipped,
        });
        let rendered = if args.pretty {
            serde_json::to_string_pretty(&output).unwrap()
        } else {
            serde_json::to_string(&output).unwrap()
        };
        println!("{rendered}");
        return;
    }

    print_skips("inbound", &result.inbound_skipped);
    print_skips("outbound", &result.outbound_skipped);
    if result.itineraries.is_empty() {
        println!("No transfer itineraries found.");
        return;
    }
    println!(
        "\n查询到 {} 经 {} 中转的接续方案一共 {} 组（直达 {} 趟 × 接续 {} 趟）\n",
        date.format("%Y-%m-%d"),
        directory.name_of(&inbound.to_station).unwrap_or(&args.via),
        result.itineraries.len(),
        result.inbound_count,
        result.outbound_count
    );
    println!("{}", table::render_transfers(&result.itineraries, &directory));
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query(args) => run_query(args).await,
        Commands::Transfer(args) => run_transfer(args).await,
    }
}
