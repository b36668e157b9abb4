use std::cell::RefCell;
use std::collections::HashMap;

use crate::transport::entities::{LiveBoard, Place, RawDeparture, RawStop};
use crate::transport::error::{TransportError, TransportResult};
use crate::transport::TransportApi;

pub fn init() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// In-memory stand-in for the departures API
#[derive(Default)]
pub struct FakeTransport {
    station_code: String,
    station_name: String,
    departures: Option<Vec<RawDeparture>>,
    timetables: HashMap<String, Vec<RawStop>>,
    places: HashMap<String, Place>,
    places_offline: bool,
    place_queries: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new(station_code: &str) -> Self {
        Self {
            station_code: station_code.to_string(),
            station_name: format!("{} station", station_code),
            departures: Some(vec![]),
            ..Default::default()
        }
    }

    pub fn with_place(mut self, code: &str, lat: f64, lon: f64) -> Self {
        self.places.insert(
            code.to_string(),
            Place {
                latitude: Some(lat),
                longitude: Some(lon),
            },
        );
        self
    }

    pub fn with_place_without_coordinates(mut self, code: &str) -> Self {
        self.places.insert(code.to_string(), Place::default());
        self
    }

    pub fn with_departure(mut self, service: &str, destination: &str, stops: Vec<RawStop>) -> Self {
        self.departures.get_or_insert_with(Vec::new).push(RawDeparture {
            mode: "train".to_string(),
            service: service.to_string(),
            platform: Some("1".to_string()),
            destination_name: Some(destination.to_string()),
            status: Some("ON TIME".to_string()),
        });
        self.timetables.insert(service.to_string(), stops);
        self
    }

    /// Live departures fail with a transport error
    pub fn offline(mut self) -> Self {
        self.departures = None;
        self
    }

    /// Place lookups fail with a transport error
    pub fn with_places_offline(mut self) -> Self {
        self.places_offline = true;
        self
    }

    pub fn place_queries(&self) -> Vec<String> {
        self.place_queries.borrow().clone()
    }
}

pub fn raw_stop(code: &str, arrival: Option<&str>, departure: Option<&str>) -> RawStop {
    RawStop {
        station_code: code.to_string(),
        tiploc_code: format!("{}TIP", code),
        aimed_arrival_date: arrival.map(|_| "2024-03-01".to_string()),
        aimed_arrival_time: arrival.map(str::to_string),
        aimed_departure_date: departure.map(|_| "2024-03-01".to_string()),
        aimed_departure_time: departure.map(str::to_string),
    }
}

impl TransportApi for FakeTransport {
    fn station_code(&self) -> &str {
        &self.station_code
    }

    async fn live_departures(&self) -> TransportResult<LiveBoard> {
        match &self.departures {
            Some(departures) => Ok(LiveBoard {
                station_name: self.station_name.clone(),
                departures: departures.clone(),
            }),
            None => Err(TransportError::Status(503, "offline".to_string())),
        }
    }

    async fn service_timetable(&self, service_id: &str) -> TransportResult<Vec<RawStop>> {
        Ok(self.timetables.get(service_id).cloned().unwrap_or_default())
    }

    async fn places(&self, query: &str, _place_type: &str) -> TransportResult<Vec<Place>> {
        self.place_queries.borrow_mut().push(query.to_string());
        if self.places_offline {
            return Err(TransportError::Status(503, "offline".to_string()));
        }
        let code = query.split(',').next().unwrap_or_default();
        Ok(self.places.get(code).cloned().into_iter().collect())
    }
}
