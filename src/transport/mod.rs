pub mod client;
pub mod entities;
pub mod error;
pub mod utils;

use entities::{LiveBoard, Place, RawStop};
use error::TransportResult;

pub const TRAIN_STATION: &str = "train_station";

/// The three calls the board makes against the departures API
#[allow(async_fn_in_trait)]
pub trait TransportApi {
    /// Code of the station the board watches
    fn station_code(&self) -> &str;

    async fn live_departures(&self) -> TransportResult<LiveBoard>;

    async fn service_timetable(&self, service_id: &str) -> TransportResult<Vec<RawStop>>;

    async fn places(&self, query: &str, place_type: &str) -> TransportResult<Vec<Place>>;
}
