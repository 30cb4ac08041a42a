use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};
use wreq::Client;
use wreq::cookie::Jar;
use wreq_util::Emulation;

use crate::error::{self, RailError};
use crate::model::{FareTable, Leg};
use crate::parse;
use crate::query::QueryParams;

const INIT_URL: &str = "https://kyfw.12306.cn/otn/leftTicket/init?linktypeid=dc";
const QUERY_URL: &str = "https://kyfw.12306.cn/otn/leftTicket/query";
const PRICE_URL: &str = "https://kyfw.12306.cn/otn/leftTicket/queryTicketPrice";

pub const DEFAULT_DELAY_SECS: u64 = 5;
// Queries faster than about one per second come back as error pages.
pub const MIN_DELAY_SECS: u64 = 1;
pub const FARE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
    pub delay: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
            delay: DEFAULT_DELAY_SECS,
        }
    }
}

impl FetchOptions {
    pub fn effective_delay(&self) -> Duration {
        Duration::from_secs(self.delay.max(MIN_DELAY_SECS))
    }
}

pub(crate) fn check_status(status: u16) -> Result<(), RailError> {
    match status {
        200 => Ok(()),
        429 => Err(RailError::RateLimited),
        403 | 503 => Err(RailError::Blocked(status)),
        _ if status >= 400 => Err(RailError::HttpStatus(status)),
        _ => Ok(()),
    }
}

pub async fn build_client(options: &FetchOptions) -> Result<Client, RailError> {
    let jar = Arc::new(Jar::default());

    let mut builder = Client::builder()
        .emulation(Emulation::Chrome137)
        .cookie_provider(jar)
        .timeout(Duration::from_secs(options.timeout));

    if let Some(ref proxy) = options.proxy {
        builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
    }

    let client = builder.build().map_err(error::from_http_error)?;

    // The query endpoints reject requests without the session cookies
    // handed out by the leftTicket landing page.
    debug!("fetching session cookies");
    let response = client
        .get(INIT_URL)
        .send()
        .await
        .map_err(error::from_http_error)?;
    check_status(response.status().as_u16())?;

    Ok(client)
}

pub async fn fetch_schedule(
    client: &Client,
    params: &QueryParams,
) -> Result<Vec<String>, RailError> {
    debug!(
        date = %params.train_date,
        from = %params.from_station,
        to = %params.to_station,
        "querying schedule"
    );
    let response = client
        .get(QUERY_URL)
        .query(&params.to_url_params())
        .send()
        .await
        .map_err(error::from_http_error)?;
    check_status(response.status().as_u16())?;

    let body = response.text().await.map_err(error::from_http_error)?;
    let json: Value =
        serde_json::from_str(&body).map_err(|e| RailError::BadPayload(e.to_string()))?;

    let result = json
        .get("data")
        .and_then(|data| data.get("result"))
        .and_then(|result| result.as_array())
        .ok_or_else(|| RailError::BadPayload("missing data.result in response".to_string()))?;

    Ok(result
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect())
}

async fn try_fetch_fares(
    client: &Client,
    params: &[(String, String)],
) -> Result<FareTable, RailError> {
    let response = client
        .get(PRICE_URL)
        .query(&params)
        .send()
        .await
        .map_err(error::from_http_error)?;
    check_status(response.status().as_u16())?;

    let body = response.text().await.map_err(error::from_http_error)?;
    let json: Value =
        serde_json::from_str(&body).map_err(|e| RailError::BadPayload(e.to_string()))?;

    let data = json
        .get("data")
        .filter(|data| data.is_object())
        .ok_or_else(|| RailError::BadPayload("missing data in price response".to_string()))?;

    Ok(parse::parse_fares(data))
}

pub async fn fetch_fares(
    client: &Client,
    leg: &Leg,
    date: NaiveDate,
    options: &FetchOptions,
) -> Result<FareTable, RailError> {
    let params = vec![
        ("train_no".to_string(), leg.train_no.clone()),
        ("from_station_no".to_string(), leg.from_station_no.clone()),
        ("to_station_no".to_string(), leg.to_station_no.clone()),
        ("seat_types".to_string(), leg.seat_types.clone()),
        ("train_date".to_string(), date.format("%Y-%m-%d").to_string()),
    ];

    let mut backoff = options.effective_delay();
    let mut attempt = 1;
    loop {
        match try_fetch_fares(client, &params).await {
            Ok(fares) => return Ok(fares),
            Err(err) => {
                if attempt >= FARE_ATTEMPTS {
                    warn!(train = %leg.train_number, %err, "fare lookup exhausted retries");
                    return Err(RailError::FareLookupFailed {
                        train_no: leg.train_no.clone(),
                        attempts: FARE_ATTEMPTS,
                    });
                }
                debug!(train = %leg.train_number, attempt, %err, "fare lookup failed, backing off");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
        }
    }
}

pub async fn fetch_fare_tables(
    client: &Client,
    legs: &[Leg],
    date: NaiveDate,
    options: &FetchOptions,
) -> Vec<Result<FareTable, RailError>> {
    let mut tables = Vec::with_capacity(legs.len());

    for (i, leg) in legs.iter().enumerate() {
        tables.push(fetch_fares(client, leg, date, options).await);
        if i + 1 < legs.len() {
            tokio::time::sleep(options.effective_delay()).await;
        }
    }

    tables
}
