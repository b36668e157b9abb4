use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::transport::entities::{RawDeparture, RawStop};
use crate::transport::utils::{DateResult, StopDateTimeParser};

pub const DEFAULT_PLATFORM: &str = "-";
pub const DEFAULT_DESTINATION: &str = "----";
const UNKNOWN_TIME: &str = "--:--";

/// One calling point of a service, as scheduled
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub station_code: String,
    pub tiploc_code: String,
    pub aimed_arrival: Option<DateTime<Tz>>,
    pub aimed_departure: Option<DateTime<Tz>>,
}

impl Stop {
    pub fn from_raw(raw: &RawStop, parser: &StopDateTimeParser, today: NaiveDate) -> DateResult<Stop> {
        Ok(Stop {
            station_code: raw.station_code.clone(),
            tiploc_code: raw.tiploc_code.clone(),
            aimed_arrival: parser.parse_aimed(
                raw.aimed_arrival_date.as_deref(),
                raw.aimed_arrival_time.as_deref(),
                today,
            )?,
            aimed_departure: parser.parse_aimed(
                raw.aimed_departure_date.as_deref(),
                raw.aimed_departure_time.as_deref(),
                today,
            )?,
        })
    }

    /// Query string understood by the places lookup
    pub fn place_query(&self) -> String {
        format!("{},{}", self.station_code, self.tiploc_code)
    }
}

#[derive(Debug, Clone)]
pub struct Departure {
    pub mode: String,
    pub service_id: String,
    pub platform: String,
    pub destination_name: String,
    pub status: String,
    /// Calling points up to and including the home station
    pub timetable: Vec<Stop>,
    /// Calling points after the home station, furthest first
    pub timetable_after_arrival: Vec<Stop>,
    pub aimed_arrival: Option<DateTime<Tz>>,
    pub aimed_departure: Option<DateTime<Tz>>,
}

impl Departure {
    pub fn new(raw: RawDeparture, abbreviations: &[(String, String)]) -> Self {
        let destination = raw
            .destination_name
            .unwrap_or_else(|| DEFAULT_DESTINATION.to_string());

        Departure {
            mode: title_case(&raw.mode),
            service_id: raw.service,
            platform: raw.platform.unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            destination_name: abbreviate(abbreviations, &destination),
            status: raw.status.unwrap_or_default(),
            timetable: vec![],
            timetable_after_arrival: vec![],
            aimed_arrival: None,
            aimed_departure: None,
        }
    }

    /// Unknown timing or already gone
    pub fn can_delete(&self, now: DateTime<Tz>) -> bool {
        match self.aimed_departure {
            None => true,
            Some(departure) => now > departure,
        }
    }

    /// Splits `stops` at the first call at `home_station_code`.
    ///
    /// An empty input keeps whatever was there before.
    pub fn fill_timetable(&mut self, stops: Vec<Stop>, home_station_code: &str) {
        if stops.is_empty() {
            return;
        }

        let split = stops
            .iter()
            .position(|s| s.station_code == home_station_code)
            .map(|i| i + 1)
            .unwrap_or(stops.len());

        let mut stops = stops;
        let mut after_arrival = stops.split_off(split);
        after_arrival.reverse();

        self.timetable = stops;
        self.timetable_after_arrival = after_arrival;

        let home = self.timetable.last();
        self.aimed_arrival = home.and_then(|s| s.aimed_arrival);
        self.aimed_departure = home.and_then(|s| s.aimed_departure);
    }

    /// Three-line summary shown on the board
    pub fn information(&self) -> String {
        format!(
            "{} : {}\n    Plat. : {}    {}\n    Arr.: {}      Dep.: {}",
            self.mode,
            self.destination_name,
            self.platform,
            self.status,
            format_time(self.aimed_arrival),
            format_time(self.aimed_departure),
        )
    }
}

/// Drops gone or untimed departures, then keeps the first `max_departures` in feed order
pub fn prune_departures(departures: &mut Vec<Departure>, max_departures: usize, now: DateTime<Tz>) {
    let before = departures.len();
    departures.retain(|d| !d.can_delete(now));
    log::debug!("Pruned {} departures", before - departures.len());

    departures.truncate(max_departures);
}

pub fn abbreviate(abbreviations: &[(String, String)], value: &str) -> String {
    abbreviations
        .iter()
        .fold(value.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

fn format_time(time: Option<DateTime<Tz>>) -> String {
    time.map(|t| t.format("%-H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}
