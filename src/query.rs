use chrono::{Local, NaiveDate};

use crate::error::RailError;
use crate::model::{Leg, TrainType};

pub const PURPOSE_ADULT: &str = "ADULT";

#[derive(Debug, Clone)]
pub struct QueryParams {
    pub train_date: NaiveDate,
    pub from_station: String,
    pub to_station: String,
    pub purpose_codes: String,
}

fn validate_telecode(code: &str) -> Result<(), RailError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(RailError::Validation(format!(
            "\"{code}\" is not a station telecode (expected 3 uppercase letters, e.g. BJP)"
        )));
    }
    Ok(())
}

pub fn parse_travel_date(s: &str) -> Result<NaiveDate, RailError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| RailError::InvalidDate(s.to_string()))
}

pub fn validate_travel_date(date: NaiveDate) -> Result<(), RailError> {
    if date < Local::now().date_naive() {
        return Err(RailError::InvalidDate(date.format("%Y-%m-%d").to_string()));
    }
    Ok(())
}

impl QueryParams {
    pub fn new(
        train_date: NaiveDate,
        from_station: impl Into<String>,
        to_station: impl Into<String>,
    ) -> Self {
        Self {
            train_date,
            from_station: from_station.into(),
            to_station: to_station.into(),
            purpose_codes: PURPOSE_ADULT.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), RailError> {
        validate_telecode(&self.from_station)?;
        validate_telecode(&self.to_station)?;
        validate_travel_date(self.train_date)?;
        Ok(())
    }

    pub fn to_url_params(&self) -> Vec<(String, String)> {
        vec![
            (
                "leftTicketDTO.train_date".to_string(),
                self.train_date.format("%Y-%m-%d").to_string(),
            ),
            (
                "leftTicketDTO.from_station".to_string(),
                self.from_station.clone(),
            ),
            (
                "leftTicketDTO.to_station".to_string(),
                self.to_station.clone(),
            ),
            ("purpose_codes".to_string(), self.purpose_codes.clone()),
        ]
    }
}

pub fn parse_type_filter(s: &str) -> Result<Vec<TrainType>, RailError> {
    let mut types = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        let mut chars = part.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(RailError::Validation(format!(
                    "unknown train type \"{part}\" — expected one of G, C, D, Z, T, K, L"
                )))
            }
        };
        let train_type = TrainType::from_code(code).ok_or_else(|| {
            RailError::Validation(format!(
                "unknown train type \"{part}\" — expected one of G, C, D, Z, T, K, L"
            ))
        })?;
        types.push(train_type);
    }
    Ok(types)
}

pub fn filter_by_type(legs: Vec<Leg>, types: &[TrainType]) -> Vec<Leg> {
    if types.is_empty() {
        return legs;
    }
    legs.into_iter()
        .filter(|leg| types.contains(&leg.train_type()))
        .collect()
}
