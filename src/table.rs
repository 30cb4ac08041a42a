use chrono::{Duration, NaiveDateTime};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::model::{FareTable, Itinerary, Leg, SeatAvailability, SeatClass};
use crate::stations::StationDirectory;

pub fn fmt_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

pub fn fmt_time(time: NaiveDateTime) -> String {
    time.format("%m-%d %H:%M").to_string()
}

fn display_name<'a>(directory: &'a StationDirectory, code: &'a str) -> &'a str {
    directory.name_of(code).unwrap_or(code)
}

fn availability_cell(seat: SeatAvailability, fare: Option<&str>) -> Cell {
    let (text, color) = match seat {
        SeatAvailability::Unsupported => ("×".to_string(), Some(Color::Yellow)),
        SeatAvailability::Available => ("有".to_string(), Some(Color::Green)),
        SeatAvailability::Count(0) => ("无".to_string(), Some(Color::Red)),
        SeatAvailability::Count(n) => (n.to_string(), None),
    };

    let text = match fare {
        Some(fare) if !seat.is_unsupported() => format!("{text}\n{fare}"),
        _ => text,
    };

    match color {
        Some(color) => Cell::new(text).fg(color),
        None => Cell::new(text),
    }
}

pub fn render_schedule(
    legs: &[Leg],
    fares: Option<&[Option<FareTable>]>,
    directory: &StationDirectory,
) -> String {
    let mut table = Table::new();
    let mut header = vec!["车次", "车站", "出发", "到达", "历时"];
    header.extend(SeatClass::ALL.iter().map(|class| class.label()));
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (i, leg) in legs.iter().enumerate() {
        let fare_table = fares.and_then(|fares| fares.get(i)).and_then(Option::as_ref);

        let stations = format!(
            "{} → {}",
            display_name(directory, &leg.origin),
            display_name(directory, &leg.destination)
        );

        let mut row = vec![
            Cell::new(&leg.train_number),
            Cell::new(stations),
            Cell::new(fmt_time(leg.departure)).fg(Color::Green),
            Cell::new(fmt_time(leg.arrival)).fg(Color::Red),
            Cell::new(fmt_duration(leg.duration())),
        ];
        for class in SeatClass::ALL {
            let fare = fare_table.and_then(|table| table.get(class));
            row.push(availability_cell(leg.seats.get(class), fare));
        }
        table.add_row(row);
    }

    table.to_string()
}

pub fn render_transfers(itineraries: &[Itinerary], directory: &StationDirectory) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "第一程",
            "出发",
            "到达中转",
            "第二程",
            "接续出发",
            "终到",
            "换乘间隔",
            "总历时",
        ]);

    for itinerary in itineraries {
        let inbound = &itinerary.inbound;
        let outbound = &itinerary.outbound;

        let first = format!(
            "{} {}→{}",
            inbound.train_number,
            display_name(directory, &inbound.origin),
            display_name(directory, &inbound.destination)
        );
        let second = format!(
            "{} {}→{}",
            outbound.train_number,
            display_name(directory, &outbound.origin),
            display_name(directory, &outbound.destination)
        );

        table.add_row(vec![
            Cell::new(first),
            Cell::new(fmt_time(inbound.departure)).fg(Color::Green),
            Cell::new(fmt_time(inbound.arrival)),
            Cell::new(second),
            Cell::new(fmt_time(outbound.departure)),
            Cell::new(fmt_time(outbound.arrival)).fg(Color::Red),
            Cell::new(fmt_duration(itinerary.connection_gap())),
            Cell::new(fmt_duration(itinerary.total_duration())),
        ]);
    }

    table.to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRow {
    pub inbound_train: String,
    pub outbound_train: String,
    pub from: String,
    pub transfer_in: String,
    pub transfer_out: String,
    pub to: String,
    pub depart: NaiveDateTime,
    pub arrive_transfer: NaiveDateTime,
    pub depart_transfer: NaiveDateTime,
    pub arrive: NaiveDateTime,
    pub connection_gap_minutes: i64,
    pub total_minutes: i64,
}

pub fn transfer_rows(itineraries: &[Itinerary], directory: &StationDirectory) -> Vec<TransferRow> {
    itineraries
        .iter()
        .map(|itinerary| {
            let inbound = &itinerary.inbound;
            let outbound = &itinerary.outbound;
            TransferRow {
                inbound_train: inbound.train_number.clone(),
                outbound_train: outbound.train_number.clone(),
                from: display_name(directory, &inbound.origin).to_string(),
                transfer_in: display_name(directory, &inbound.destination).to_string(),
                transfer_out: display_name(directory, &outbound.origin).to_string(),
                to: display_name(directory, &outbound.destination).to_string(),
                depart: inbound.departure,
                arrive_transfer: inbound.arrival,
                depart_transfer: outbound.departure,
                arrive: outbound.arrival,
                connection_gap_minutes: itinerary.connection_gap().num_minutes(),
                total_minutes: itinerary.total_duration().num_minutes(),
            }
        })
        .collect()
}
