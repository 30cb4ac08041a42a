use std::cmp::Ordering;

use crate::model::{Itinerary, Leg};

pub fn match_itineraries(
    inbound_legs: &[Leg],
    outbound_legs: &[Leg],
    same_station: bool,
) -> Vec<Itinerary> {
    let mut candidates = Vec::new();

    // Leg lists are tens of entries, not thousands; no pre-indexing.
    for inbound in inbound_legs {
        for outbound in outbound_legs {
            if outbound.departure < inbound.arrival {
                continue;
            }
            if same_station && inbound.destination != outbound.origin {
                continue;
            }
            candidates.push(Itinerary {
                inbound: inbound.clone(),
                outbound: outbound.clone(),
            });
        }
    }

    candidates
}

pub fn rank_itineraries(mut itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    itineraries.sort_by(|a, b| {
        let total = a.total_duration().cmp(&b.total_duration());
        if total != Ordering::Equal {
            return total;
        }

        let gap = a.connection_gap().cmp(&b.connection_gap());
        if gap != Ordering::Equal {
            return gap;
        }

        a.inbound.departure.cmp(&b.inbound.departure)
    });

    itineraries
}
