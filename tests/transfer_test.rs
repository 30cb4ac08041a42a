use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use railr::model::{Leg, SeatAvailability, SeatMap};
use railr::transfer::{match_itineraries, rank_itineraries};

fn dt(day: u32, clock: &str) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 9, day)
        .unwrap()
        .and_time(NaiveTime::parse_from_str(clock, "%H:%M").unwrap())
}

fn seats() -> SeatMap {
    SeatMap {
        business: SeatAvailability::Unsupported,
        first_class: SeatAvailability::Unsupported,
        second_class: SeatAvailability::Available,
        soft_sleeper: SeatAvailability::Unsupported,
        hard_sleeper: SeatAvailability::Unsupported,
        hard_seat: SeatAvailability::Unsupported,
        standing: SeatAvailability::Unsupported,
    }
}

fn leg(
    train_number: &str,
    origin: &str,
    destination: &str,
    departure: NaiveDateTime,
    arrival: NaiveDateTime,
) -> Leg {
    Leg {
        train_no: format!("76000{train_number}"),
        train_number: train_number.to_string(),
        route_origin: origin.to_string(),
        route_destination: destination.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure,
        arrival,
        from_station_no: "01".to_string(),
        to_station_no: "05".to_string(),
        seat_types: "O0M0".to_string(),
        seats: seats(),
    }
}

#[test]
fn rejects_departure_before_arrival() {
    // Inbound arrives 10:05; outbound candidates depart 09:50, 10:05, 10:30.
    let inbound = vec![leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:05"))];
    let outbound = vec![
        leg("G201", "JNK", "AOH", dt(1, "09:50"), dt(1, "11:50")),
        leg("G203", "JNK", "AOH", dt(1, "10:05"), dt(1, "12:05")),
        leg("G205", "JNK", "AOH", dt(1, "10:30"), dt(1, "12:30")),
    ];

    let matched = match_itineraries(&inbound, &outbound, true);

    assert_eq!(matched.len(), 2);
    let ranked = rank_itineraries(matched);

    assert_eq!(ranked[0].outbound.train_number, "G203");
    assert_eq!(ranked[0].connection_gap(), Duration::minutes(0));
    assert_eq!(ranked[1].outbound.train_number, "G205");
    assert_eq!(ranked[1].connection_gap(), Duration::minutes(25));
}

#[test]
fn zero_gap_connection_is_valid() {
    let inbound = vec![leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:05"))];
    let outbound = vec![leg("G203", "JNK", "AOH", dt(1, "10:05"), dt(1, "12:05"))];

    let matched = match_itineraries(&inbound, &outbound, true);

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].connection_gap(), Duration::zero());
    assert_eq!(matched[0].total_duration(), Duration::minutes(245));
}

#[test]
fn same_station_mode_filters_mismatched_codes() {
    let inbound = vec![leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00"))];
    let outbound = vec![
        leg("G203", "JNK", "AOH", dt(1, "11:00"), dt(1, "13:00")),
        leg("G205", "JGK", "AOH", dt(1, "11:00"), dt(1, "13:00")),
    ];

    let strict = match_itineraries(&inbound, &outbound, true);
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].outbound.train_number, "G203");

    let loose = match_itineraries(&inbound, &outbound, false);
    assert_eq!(loose.len(), 2);
}

#[test]
fn empty_inputs_yield_empty_output() {
    let legs = vec![leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00"))];

    assert!(match_itineraries(&[], &legs, false).is_empty());
    assert!(match_itineraries(&legs, &[], false).is_empty());
    assert!(match_itineraries(&[], &[], true).is_empty());
}

#[test]
fn matching_is_idempotent() {
    let inbound = vec![
        leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00")),
        leg("K511", "VNP", "JNK", dt(1, "06:00"), dt(1, "11:30")),
    ];
    let outbound = vec![
        leg("G203", "JNK", "AOH", dt(1, "10:30"), dt(1, "12:30")),
        leg("G205", "JNK", "AOH", dt(1, "12:00"), dt(1, "14:00")),
    ];

    let keys = |itineraries: &[railr::model::Itinerary]| {
        let mut pairs: Vec<(String, String)> = itineraries
            .iter()
            .map(|i| (i.inbound.train_number.clone(), i.outbound.train_number.clone()))
            .collect();
        pairs.sort();
        pairs
    };

    let first = match_itineraries(&inbound, &outbound, true);
    let second = match_itineraries(&inbound, &outbound, true);
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn matched_itineraries_satisfy_ordering_invariant() {
    let inbound: Vec<Leg> = (0..5)
        .map(|i| {
            leg(
                &format!("G1{i:02}"),
                "VNP",
                "JNK",
                dt(1, "06:00") + Duration::minutes(i * 47),
                dt(1, "08:00") + Duration::minutes(i * 47),
            )
        })
        .collect();
    let outbound: Vec<Leg> = (0..5)
        .map(|i| {
            leg(
                &format!("G2{i:02}"),
                "JNK",
                "AOH",
                dt(1, "07:30") + Duration::minutes(i * 63),
                dt(1, "09:30") + Duration::minutes(i * 63),
            )
        })
        .collect();

    for itinerary in match_itineraries(&inbound, &outbound, true) {
        assert!(itinerary.inbound.arrival <= itinerary.outbound.departure);
        assert!(itinerary.connection_gap() >= Duration::zero());
        assert_eq!(
            itinerary.total_duration(),
            itinerary.connection_gap()
                + itinerary.inbound.duration()
                + itinerary.outbound.duration()
        );
    }
}

#[test]
fn overnight_arrival_compares_by_timestamp_not_clock() {
    // Inbound arrives past midnight; an outbound leaving "later" on the
    // query date's clock is still before it.
    let inbound = vec![leg("K511", "VNP", "JNK", dt(1, "23:00"), dt(2, "00:40"))];
    let outbound = vec![
        leg("G203", "JNK", "AOH", dt(1, "23:30"), dt(2, "01:30")),
        leg("G205", "JNK", "AOH", dt(2, "06:00"), dt(2, "08:00")),
    ];

    let matched = match_itineraries(&inbound, &outbound, true);

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].outbound.train_number, "G205");
}

#[test]
fn ranking_is_ascending_by_total_duration() {
    let inbound = vec![
        leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00")),
        leg("G103", "VNP", "JNK", dt(1, "09:00"), dt(1, "11:00")),
    ];
    let outbound = vec![
        leg("G203", "JNK", "AOH", dt(1, "11:00"), dt(1, "13:00")),
        leg("G205", "JNK", "AOH", dt(1, "13:00"), dt(1, "15:00")),
        leg("G207", "JNK", "AOH", dt(1, "16:00"), dt(1, "18:00")),
    ];

    let ranked = rank_itineraries(match_itineraries(&inbound, &outbound, true));

    assert!(!ranked.is_empty());
    for window in ranked.windows(2) {
        assert!(window[0].total_duration() <= window[1].total_duration());
    }
}

#[test]
fn ties_break_by_connection_gap_then_inbound_departure() {
    // Both itineraries span 08:00 -> 14:00. The one with the tighter
    // connection must come first.
    let tight = railr::model::Itinerary {
        inbound: leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "11:00")),
        outbound: leg("G203", "JNK", "AOH", dt(1, "11:30"), dt(1, "14:00")),
    };
    let loose = railr::model::Itinerary {
        inbound: leg("G103", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00")),
        outbound: leg("G205", "JNK", "AOH", dt(1, "11:45"), dt(1, "14:00")),
    };

    let ranked = rank_itineraries(vec![loose.clone(), tight.clone()]);
    assert_eq!(ranked[0].inbound.train_number, "G101");
    assert_eq!(ranked[1].inbound.train_number, "G103");

    // Equal totals and gaps: earlier inbound departure wins.
    let early = railr::model::Itinerary {
        inbound: leg("G105", "VNP", "JNK", dt(1, "07:00"), dt(1, "09:00")),
        outbound: leg("G207", "JNK", "AOH", dt(1, "10:00"), dt(1, "13:00")),
    };
    let late = railr::model::Itinerary {
        inbound: leg("G107", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00")),
        outbound: leg("G209", "JNK", "AOH", dt(1, "11:00"), dt(1, "14:00")),
    };

    let ranked = rank_itineraries(vec![late.clone(), early.clone()]);
    assert_eq!(ranked[0].inbound.train_number, "G105");
}

#[test]
fn ranking_is_stable_for_identical_keys() {
    let a = railr::model::Itinerary {
        inbound: leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00")),
        outbound: leg("G203", "JNK", "AOH", dt(1, "11:00"), dt(1, "14:00")),
    };
    let b = railr::model::Itinerary {
        inbound: leg("G999", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00")),
        outbound: leg("G888", "JNK", "AOH", dt(1, "11:00"), dt(1, "14:00")),
    };

    let ranked = rank_itineraries(vec![a.clone(), b.clone()]);
    assert_eq!(ranked[0].inbound.train_number, "G101");
    assert_eq!(ranked[1].inbound.train_number, "G999");

    let ranked = rank_itineraries(vec![b, a]);
    assert_eq!(ranked[0].inbound.train_number, "G999");
    assert_eq!(ranked[1].inbound.train_number, "G101");
}

#[test]
fn ranker_preserves_all_candidates() {
    let inbound = vec![
        leg("G101", "VNP", "JNK", dt(1, "08:00"), dt(1, "10:00")),
        leg("G103", "VNP", "JNK", dt(1, "09:00"), dt(1, "11:00")),
    ];
    let outbound = vec![
        leg("G203", "JNK", "AOH", dt(1, "11:00"), dt(1, "13:00")),
        leg("G205", "JNK", "AOH", dt(1, "13:00"), dt(1, "15:00")),
    ];

    let matched = match_itineraries(&inbound, &outbound, true);
    let count = matched.len();
    assert_eq!(rank_itineraries(matched).len(), count);
}
