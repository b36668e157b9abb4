use serde::Deserialize;

use crate::serde_helpers::deserialize_string_or_number;

#[derive(Deserialize, Debug)]
pub struct LiveResponse {
    #[serde(default)]
    pub station_name: String,
    pub departures: LiveDepartures,
}

#[derive(Deserialize, Debug)]
pub struct LiveDepartures {
    #[serde(default)]
    pub all: Vec<RawDeparture>,
}

/// What the rest of the board sees of a live response
#[derive(Debug, Clone, Default)]
pub struct LiveBoard {
    pub station_name: String,
    pub departures: Vec<RawDeparture>,
}

impl From<LiveResponse> for LiveBoard {
    fn from(response: LiveResponse) -> Self {
        LiveBoard {
            station_name: response.station_name,
            departures: response.departures.all,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawDeparture {
    pub mode: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub service: String,
    pub platform: Option<String>,
    pub destination_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct TimetableResponse {
    #[serde(default)]
    pub stops: Vec<RawStop>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawStop {
    pub station_code: String,
    #[serde(default)]
    pub tiploc_code: String,
    pub aimed_arrival_date: Option<String>,
    pub aimed_arrival_time: Option<String>,
    pub aimed_departure_date: Option<String>,
    pub aimed_departure_time: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PlacesResponse {
    #[serde(default)]
    pub member: Vec<Place>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Place {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Place {
    /// `(lon, lat)` as a geo point, when the record carries both
    pub fn point(&self) -> Option<geo::Point> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Some(geo::Point::new(lon, lat)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_live_response() {
        let json = r#"{
            "station_name": "Finsbury Park",
            "departures": { "all": [
                { "mode": "train", "service": 24745000, "platform": null,
                  "destination_name": "Cambridge", "status": "ON TIME" },
                { "mode": "train", "service": "21234001", "platform": "7",
                  "destination_name": null, "status": null }
            ]}
        }"#;

        let board: LiveBoard = serde_json::from_str::<LiveResponse>(json).unwrap().into();
        assert_eq!(board.station_name, "Finsbury Park");
        assert_eq!(board.departures.len(), 2);
        assert_eq!(board.departures[0].service, "24745000");
        assert_eq!(board.departures[1].platform.as_deref(), Some("7"));
    }

    #[test]
    fn test_place_point() {
        let json = r#"{ "member": [
            { "name": "Finsbury Park", "station_code": "FPK", "type": "train_station",
              "latitude": 51.56426, "longitude": -0.10629 },
            { "name": "Nowhere", "station_code": "NWH", "type": "train_station" }
        ]}"#;

        let places: PlacesResponse = serde_json::from_str(json).unwrap();
        let point = places.member[0].point().unwrap();
        assert_eq!((point.x(), point.y()), (-0.10629, 51.56426));
        assert!(places.member[1].point().is_none());
    }
}
