use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatClass {
    Business,
    FirstClass,
    SecondClass,
    SoftSleeper,
    HardSleeper,
    HardSeat,
    Standing,
}

impl SeatClass {
    pub const ALL: [SeatClass; 7] = [
        SeatClass::Business,
        SeatClass::FirstClass,
        SeatClass::SecondClass,
        SeatClass::SoftSleeper,
        SeatClass::HardSleeper,
        SeatClass::HardSeat,
        SeatClass::Standing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Business => "商务座/特等座",
            Self::FirstClass => "一等座",
            Self::SecondClass => "二等座",
            Self::SoftSleeper => "软卧",
            Self::HardSleeper => "硬卧",
            Self::HardSeat => "硬座",
            Self::Standing => "站票",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatAvailability {
    Count(u32),
    Available,
    Unsupported,
}

impl SeatAvailability {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "" => Self::Unsupported,
            "有" => Self::Available,
            "无" => Self::Count(0),
            _ => raw.parse().map(Self::Count).unwrap_or(Self::Unsupported),
        }
    }

    pub fn is_unsupported(self) -> bool {
        matches!(self, Self::Unsupported)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeatMap {
    pub business: SeatAvailability,
    pub first_class: SeatAvailability,
    pub second_class: SeatAvailability,
    pub soft_sleeper: SeatAvailability,
    pub hard_sleeper: SeatAvailability,
    pub hard_seat: SeatAvailability,
    pub standing: SeatAvailability,
}

impl SeatMap {
    pub fn get(&self, class: SeatClass) -> SeatAvailability {
        match class {
            SeatClass::Business => self.business,
            SeatClass::FirstClass => self.first_class,
            SeatClass::SecondClass => self.second_class,
            SeatClass::SoftSleeper => self.soft_sleeper,
            SeatClass::HardSleeper => self.hard_sleeper,
            SeatClass::HardSeat => self.hard_seat,
            SeatClass::Standing => self.standing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainType {
    HighSpeed,
    Intercity,
    Emu,
    Direct,
    Express,
    Fast,
    Temporary,
    Other,
}

impl TrainType {
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'G' => Some(Self::HighSpeed),
            'C' => Some(Self::Intercity),
            'D' => Some(Self::Emu),
            'Z' => Some(Self::Direct),
            'T' => Some(Self::Express),
            'K' => Some(Self::Fast),
            'L' => Some(Self::Temporary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Leg {
    pub train_no: String,
    pub train_number: String,
    pub route_origin: String,
    pub route_destination: String,
    pub origin: String,
    pub destination: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub from_station_no: String,
    pub to_station_no: String,
    pub seat_types: String,
    pub seats: SeatMap,
}

impl Leg {
    pub fn duration(&self) -> Duration {
        self.arrival.signed_duration_since(self.departure)
    }

    pub fn train_type(&self) -> TrainType {
        self.train_number
            .chars()
            .next()
            .and_then(TrainType::from_code)
            .unwrap_or(TrainType::Other)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub inbound: Leg,
    pub outbound: Leg,
}

impl Itinerary {
    pub fn connection_gap(&self) -> Duration {
        self.outbound
            .departure
            .signed_duration_since(self.inbound.arrival)
    }

    pub fn total_duration(&self) -> Duration {
        self.outbound
            .arrival
            .signed_duration_since(self.inbound.departure)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FareTable {
    pub business: Option<String>,
    pub first_class: Option<String>,
    pub second_class: Option<String>,
    pub soft_sleeper: Option<String>,
    pub hard_sleeper: Option<String>,
    pub hard_seat: Option<String>,
    pub standing: Option<String>,
}

impl FareTable {
    pub fn get(&self, class: SeatClass) -> Option<&str> {
        match class {
            SeatClass::Business => self.business.as_deref(),
            SeatClass::FirstClass => self.first_class.as_deref(),
            SeatClass::SecondClass => self.second_class.as_deref(),
            SeatClass::SoftSleeper => self.soft_sleeper.as_deref(),
            SeatClass::HardSleeper => self.hard_sleeper.as_deref(),
            SeatClass::HardSeat => self.hard_seat.as_deref(),
            SeatClass::Standing => self.standing.as_deref(),
        }
    }
}
