use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::RailError;
use crate::model::{FareTable, Leg, SeatAvailability, SeatMap};

// leftTicket records carry a fixed sentinel instead of a booking marker
// when a service has been withdrawn.
const SUSPENDED: &str = "列车停运";

// Highest raw index the parser reads is 35 (seat_types).
const MIN_FIELDS: usize = 36;

const IDX_MARKER: usize = 1;
const IDX_TRAIN_NO: usize = 2;
const IDX_TRAIN_NUMBER: usize = 3;
const IDX_ROUTE_ORIGIN: usize = 4;
const IDX_ROUTE_DESTINATION: usize = 5;
const IDX_ORIGIN: usize = 6;
const IDX_DESTINATION: usize = 7;
const IDX_DEPARTURE: usize = 8;
const IDX_ARRIVAL: usize = 9;
const IDX_DURATION: usize = 10;
const IDX_FROM_STATION_NO: usize = 16;
const IDX_TO_STATION_NO: usize = 17;
const IDX_SOFT_SLEEPER: usize = 23;
const IDX_STANDING: usize = 26;
const IDX_HARD_SLEEPER: usize = 28;
const IDX_HARD_SEAT: usize = 29;
const IDX_SECOND_CLASS: usize = 30;
const IDX_FIRST_CLASS: usize = 31;
const IDX_BUSINESS: usize = 32;
const IDX_SEAT_TYPES: usize = 35;

#[derive(Debug, Clone, Serialize)]
pub struct RecordSkip {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedSchedule {
    pub legs: Vec<Leg>,
    pub skipped: Vec<RecordSkip>,
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

fn valid_duration(s: &str) -> bool {
    let Some((hours, minutes)) = s.split_once(':') else {
        return false;
    };
    hours.parse::<u32>().is_ok() && minutes.parse::<u32>().is_ok_and(|m| m < 60)
}

pub fn parse_record(raw: &str, date: NaiveDate) -> Result<Option<Leg>, RailError> {
    let fields: Vec<&str> = raw.split('|').collect();
    if fields.len() < MIN_FIELDS {
        return Err(RailError::MalformedRecord(format!(
            "expected at least {MIN_FIELDS} fields, got {}",
            fields.len()
        )));
    }

    if fields[IDX_MARKER] == SUSPENDED {
        return Ok(None);
    }

    let train_number = fields[IDX_TRAIN_NUMBER];

    let dep_clock = parse_clock(fields[IDX_DEPARTURE]).ok_or_else(|| {
        RailError::MalformedRecord(format!(
            "train {train_number}: bad departure time \"{}\"",
            fields[IDX_DEPARTURE]
        ))
    })?;
    let arr_clock = parse_clock(fields[IDX_ARRIVAL]).ok_or_else(|| {
        RailError::MalformedRecord(format!(
            "train {train_number}: bad arrival time \"{}\"",
            fields[IDX_ARRIVAL]
        ))
    })?;
    if !valid_duration(fields[IDX_DURATION]) {
        return Err(RailError::MalformedRecord(format!(
            "train {train_number}: bad duration \"{}\"",
            fields[IDX_DURATION]
        )));
    }

    let departure = date.and_time(dep_clock);
    let mut arrival = date.and_time(arr_clock);
    // Arrival clock earlier than departure means the service runs past
    // midnight; the record itself carries no arrival date.
    if arrival < departure {
        arrival += Duration::days(1);
    }

    let seats = SeatMap {
        business: SeatAvailability::from_raw(fields[IDX_BUSINESS]),
        first_class: SeatAvailability::from_raw(fields[IDX_FIRST_CLASS]),
        second_class: SeatAvailability::from_raw(fields[IDX_SECOND_CLASS]),
        soft_sleeper: SeatAvailability::from_raw(fields[IDX_SOFT_SLEEPER]),
        hard_sleeper: SeatAvailability::from_raw(fields[IDX_HARD_SLEEPER]),
        hard_seat: SeatAvailability::from_raw(fields[IDX_HARD_SEAT]),
        standing: SeatAvailability::from_raw(fields[IDX_STANDING]),
    };

    Ok(Some(Leg {
        train_no: fields[IDX_TRAIN_NO].to_string(),
        train_number: train_number.to_string(),
        route_origin: fields[IDX_ROUTE_ORIGIN].to_string(),
        route_destination: fields[IDX_ROUTE_DESTINATION].to_string(),
        origin: fields[IDX_ORIGIN].to_string(),
        destination: fields[IDX_DESTINATION].to_string(),
        departure,
        arrival,
        from_station_no: fields[IDX_FROM_STATION_NO].to_string(),
        to_station_no: fields[IDX_TO_STATION_NO].to_string(),
        seat_types: fields[IDX_SEAT_TYPES].to_string(),
        seats,
    }))
}

pub fn parse_schedule(records: &[String], date: NaiveDate) -> ParsedSchedule {
    let mut schedule = ParsedSchedule::default();

    for (index, raw) in records.iter().enumerate() {
        match parse_record(raw, date) {
            Ok(Some(leg)) => schedule.legs.push(leg),
            Ok(None) => {}
            Err(err) => schedule.skipped.push(RecordSkip {
                index,
                reason: err.to_string(),
            }),
        }
    }

    schedule
}

fn fare_field(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub fn parse_fares(data: &Value) -> FareTable {
    FareTable {
        business: fare_field(data, "A9"),
        first_class: fare_field(data, "M"),
        second_class: fare_field(data, "O"),
        soft_sleeper: fare_field(data, "A4"),
        hard_sleeper: fare_field(data, "A3"),
        hard_seat: fare_field(data, "A1"),
        // Standing fares match the hard-seat fare on conventional trains;
        // high-speed services report a dedicated WZ field instead.
        standing: fare_field(data, "A1").or_else(|| fare_field(data, "WZ")),
    }
}
