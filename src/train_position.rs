use chrono::DateTime;
use chrono_tz::Tz;
use geo::Coord;

use crate::departure::Departure;
use crate::geo::lerp;
use crate::station_tree::StationTree;

/// Where a departure's train should be drawn right now, between the last
/// stop it left and the next one it reaches, by scheduled times.
pub fn train_position(departure: &Departure, tree: &StationTree, now: DateTime<Tz>) -> Option<Coord> {
    let stops = &departure.timetable;
    let next_index = stops
        .iter()
        .position(|s| s.aimed_departure.is_some_and(|d| d > now))?;
    if next_index == 0 {
        // not yet left its origin
        return None;
    }

    let previous = &stops[next_index - 1];
    let next = &stops[next_index];
    let (Some(left_at), Some(arrives_at)) = (previous.aimed_departure, next.aimed_arrival) else {
        return None;
    };

    let from = tree.find(&previous.station_code)?;
    let to = tree.find(&next.station_code)?;

    let total = (arrives_at - left_at).num_milliseconds();
    let ratio = if total > 0 {
        (now - left_at).num_milliseconds() as f64 / total as f64
    } else {
        1.0
    };

    Some(lerp(from.position, to.position, ratio))
}

pub fn train_positions(departures: &[Departure], tree: &StationTree, now: DateTime<Tz>) -> Vec<Coord> {
    departures
        .iter()
        .filter_map(|departure| {
            let position = train_position(departure, tree, now);
            if position.is_none() {
                log::debug!(
                    "No position for {} {}",
                    departure.destination_name,
                    departure.service_id
                );
            }
            position
        })
        .collect()
}
