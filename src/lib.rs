pub mod error;
pub mod fetch;
pub mod model;
pub mod parse;
pub mod query;
pub mod stations;
pub mod table;
pub mod transfer;

use error::RailError;
use fetch::FetchOptions;
use model::{Itinerary, TrainType};
use parse::{ParsedSchedule, RecordSkip};
use query::QueryParams;

pub async fn query_schedule(
    client: &wreq::Client,
    params: &QueryParams,
) -> Result<ParsedSchedule, RailError> {
    let records = fetch::fetch_schedule(client, params).await?;
    Ok(parse::parse_schedule(&records, params.train_date))
}

#[derive(Debug)]
pub struct TransferSearch {
    pub itineraries: Vec<Itinerary>,
    pub inbound_count: usize,
    pub outbound_count: usize,
    pub inbound_skipped: Vec<RecordSkip>,
    pub outbound_skipped: Vec<RecordSkip>,
}

pub async fn search_transfers(
    client: &wreq::Client,
    inbound: &QueryParams,
    outbound: &QueryParams,
    same_station: bool,
    types: &[TrainType],
    options: &FetchOptions,
) -> Result<TransferSearch, RailError> {
    // Both fetches must succeed before anything is matched; there is no
    // partial-itinerary mode.
    let inbound_schedule = query_schedule(client, inbound).await?;
    tokio::time::sleep(options.effective_delay()).await;
    let outbound_schedule = query_schedule(client, outbound).await?;

    let inbound_legs = query::filter_by_type(inbound_schedule.legs, types);
    let outbound_legs = query::filter_by_type(outbound_schedule.legs, types);

    let candidates = transfer::match_itineraries(&inbound_legs, &outbound_legs, same_station);
    let itineraries = transfer::rank_itineraries(candidates);

    Ok(TransferSearch {
        itineraries,
        inbound_count: inbound_legs.len(),
        outbound_count: outbound_legs.len(),
        inbound_skipped: inbound_schedule.skipped,
        outbound_skipped: outbound_schedule.skipped,
    })
}
