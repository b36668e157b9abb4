use crate::config::TransportConfig;

use super::entities::{LiveBoard, LiveResponse, Place, PlacesResponse, RawStop, TimetableResponse};
use super::error::{TransportError, TransportResult};
use super::TransportApi;
use url::Url;

#[derive(Clone)]
pub struct TransportClient {
    client: reqwest::Client,
    base_url: Url,
    app_id: String,
    app_key: String,
    station_code: String,
    calling_at: Option<String>,
}

impl TransportClient {
    pub fn new(config: &TransportConfig) -> TransportResult<TransportClient> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::Init(format!("Invalid base url: {}", e)))?;

        let client = TransportClient {
            client: reqwest::Client::builder().build()?,
            base_url,
            app_id: config.app_id.clone(),
            app_key: config.app_key.clone(),
            station_code: config.station_code.clone(),
            calling_at: config.calling_at.clone(),
        };

        Ok(client)
    }

    fn url(&self, path: &str) -> TransportResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Init(format!("Invalid path {}: {}", path, e)))
    }

    async fn request<T>(&self, url: Url, params: &[(&str, &str)]) -> TransportResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        log::debug!("Requesting {}", url);
        let response = self
            .client
            .get(url)
            .query(&[("app_id", self.app_id.as_str()), ("app_key", self.app_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let data_str = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16(), data_str));
        }

        log::trace!("Response: {}", data_str);
        let data = serde_json::from_str(&data_str)?;

        Ok(data)
    }
}

impl TransportApi for TransportClient {
    fn station_code(&self) -> &str {
        &self.station_code
    }

    async fn live_departures(&self) -> TransportResult<LiveBoard> {
        let url = self.url(&format!("train/station/{}/live.json", self.station_code))?;
        let mut params = vec![("darwin", "true")];
        if let Some(calling_at) = &self.calling_at {
            params.push(("calling_at", calling_at.as_str()));
        }

        let response: LiveResponse = self.request(url, &params).await?;
        Ok(response.into())
    }

    async fn service_timetable(&self, service_id: &str) -> TransportResult<Vec<RawStop>> {
        // date and time segments left empty for the current run
        let url = self.url(&format!("train/service/{}///timetable.json", service_id))?;
        let params = [("station_code", self.station_code.as_str())];

        let TimetableResponse { stops } = self.request(url, &params).await?;
        Ok(stops)
    }

    async fn places(&self, query: &str, place_type: &str) -> TransportResult<Vec<Place>> {
        let url = self.url("places.json")?;
        let params = [("query", query), ("type", place_type)];

        let PlacesResponse { member } = self.request(url, &params).await?;
        Ok(member)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> TransportConfig {
        TransportConfig {
            app_id: "id".to_string(),
            app_key: "key".to_string(),
            station_code: "FPK".to_string(),
            calling_at: Some("KGX".to_string()),
            base_url: "https://transportapi.com/v3/uk/".to_string(),
        }
    }

    #[test]
    fn test_service_url_keeps_empty_segments() {
        let client = TransportClient::new(&config()).unwrap();
        let url = client.url("train/service/24745000///timetable.json").unwrap();

        assert_eq!(
            url.as_str(),
            "https://transportapi.com/v3/uk/train/service/24745000///timetable.json"
        );
    }

    #[test]
    fn test_bad_base_url() {
        let mut config = config();
        config.base_url = "not a url".to_string();
        assert!(matches!(
            TransportClient::new(&config),
            Err(TransportError::Init(_))
        ));
    }
}
