use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::serde_helpers::deserialize_ordered_pairs;
use crate::transport::utils::StopDateTimeParser;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_BASE_URL: &str = "https://transportapi.com/v3/uk/";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Shape of `config.json`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    max_departures: usize,
    distance_draw_map: f64,
    #[serde(default = "default_time_format")]
    time_code_format: String,
    #[serde(default = "default_timezone")]
    timezone: String,
    agenda: Vec<RawAgendaEntry>,
    #[serde(default, deserialize_with = "deserialize_ordered_pairs")]
    abbreviation: Vec<(String, String)>,
    transport_request: RawTransportConfig,
    #[serde(default)]
    render: RenderConfig,
    #[serde(default)]
    display: DisplayConfig,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawAgendaEntry {
    start_condition: String,
    refresh_departures: u64,
    refresh_display: u64,
}

#[derive(Deserialize, Debug)]
struct RawTransportConfig {
    #[serde(rename = "appID")]
    app_id: Option<String>,
    key: Option<String>,
    station_code: String,
    calling_at: Option<String>,
    #[serde(rename = "baseUrl", default = "default_base_url")]
    base_url: String,
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Time-of-day switch of the polling and redraw cadence
#[derive(Debug, Clone, PartialEq)]
pub struct AgendaEntry {
    pub start: NaiveTime,
    pub poll_interval: Duration,
    pub redraw_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub app_id: String,
    pub app_key: String,
    pub station_code: String,
    pub calling_at: Option<String>,
    pub base_url: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub template: PathBuf,
    pub font_dir: Option<PathBuf>,
    pub departure_image: PathBuf,
    pub station_map_image: PathBuf,
    pub map_size: (u32, u32),
    pub map_offset: (i64, i64),
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("asset/template.svg"),
            font_dir: None,
            departure_image: PathBuf::from("departures.png"),
            station_map_image: PathBuf::from("station_map.png"),
            map_size: (400, 480),
            map_offset: (250, 0),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayConfig {
    pub spi_device: PathBuf,
    pub command: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            spi_device: PathBuf::from("/dev/spidev0.0"),
            command: vec![],
        }
    }
}

/// Immutable settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub max_departures: usize,
    pub distance_draw_map: f64,
    pub time_code_format: String,
    pub timezone: Tz,
    pub agenda: Vec<AgendaEntry>,
    pub abbreviations: Vec<(String, String)>,
    pub transport: TransportConfig,
    pub render: RenderConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Reads the file named by `CONFIG_PATH`, or `config.json`
    pub fn load() -> ConfigResult<Config> {
        let path = env::var("CONFIG_PATH").unwrap_or(DEFAULT_CONFIG_PATH.to_string());
        Config::from_file(path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let path = path.as_ref();
        log::info!("Loading config from {}", path.display());
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Config::from_json(&contents)
    }

    pub fn from_json(json: &str) -> ConfigResult<Config> {
        let raw: RawConfig = serde_json::from_str(json)?;

        if raw.max_departures == 0 {
            return Err(ConfigError::Invalid("maxDepartures must be at least 1".into()));
        }
        if !(raw.distance_draw_map.is_finite() && raw.distance_draw_map > 0.0) {
            return Err(ConfigError::Invalid("distanceDrawMap must be positive".into()));
        }
        if raw.render.map_size.0 == 0 || raw.render.map_size.1 == 0 {
            return Err(ConfigError::Invalid("render.mapSize must be non-zero".into()));
        }

        if StrftimeItems::new(&raw.time_code_format).any(|i| matches!(i, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "Invalid timeCodeFormat {:?}",
                raw.time_code_format
            )));
        }

        let timezone: Tz = raw
            .timezone
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid timezone: {}", e)))?;

        let agenda = parse_agenda(&raw.agenda, timezone)?;
        let transport = resolve_transport(raw.transport_request)?;

        Ok(Config {
            max_departures: raw.max_departures,
            distance_draw_map: raw.distance_draw_map,
            time_code_format: raw.time_code_format,
            timezone,
            agenda,
            abbreviations: raw.abbreviation,
            transport,
            render: raw.render,
            display: raw.display,
        })
    }
}

fn parse_agenda(raw: &[RawAgendaEntry], timezone: Tz) -> ConfigResult<Vec<AgendaEntry>> {
    if raw.is_empty() {
        return Err(ConfigError::Invalid("agenda must not be empty".into()));
    }

    let parser = StopDateTimeParser::new(timezone);
    let agenda = raw
        .iter()
        .map(|entry| {
            let start = parser.parse_time(&entry.start_condition).map_err(|e| {
                ConfigError::Invalid(format!("agenda startCondition: {}", e))
            })?;
            Ok(AgendaEntry {
                start,
                poll_interval: Duration::from_secs(entry.refresh_departures),
                redraw_interval: Duration::from_secs(entry.refresh_display),
            })
        })
        .collect::<ConfigResult<Vec<_>>>()?;

    if agenda.windows(2).any(|w| w[0].start >= w[1].start) {
        return Err(ConfigError::Invalid(
            "agenda must be in ascending startCondition order".into(),
        ));
    }

    Ok(agenda)
}

fn resolve_transport(raw: RawTransportConfig) -> ConfigResult<TransportConfig> {
    let app_id = env::var("TRANSPORT_API_APP_ID").ok().or(raw.app_id);
    let app_key = env::var("TRANSPORT_API_KEY").ok().or(raw.key);

    let (Some(app_id), Some(app_key)) = (app_id, app_key) else {
        return Err(ConfigError::Invalid(
            "transportRequest needs appID and key (or TRANSPORT_API_APP_ID / TRANSPORT_API_KEY)"
                .into(),
        ));
    };
    if raw.station_code.trim().is_empty() {
        return Err(ConfigError::Invalid("transportRequest.station_code is empty".into()));
    }

    Ok(TransportConfig {
        app_id,
        app_key,
        station_code: raw.station_code,
        calling_at: raw.calling_at.filter(|c| !c.is_empty()),
        base_url: raw.base_url,
    })
}

#[cfg(test)]
pub(crate) const SAMPLE_CONFIG: &str = r#"{
    "maxDepartures": 3,
    "distanceDrawMap": 20.0,
    "timeCodeFormat": "%H:%M",
    "agenda": [
        { "startCondition": "06:00", "refreshDepartures": 300, "refreshDisplay": 60 },
        { "startCondition": "22:00", "refreshDepartures": 3600, "refreshDisplay": 600 }
    ],
    "abbreviation": { "London": "Ldn", "International": "Intl" },
    "transportRequest": {
        "appID": "app", "key": "secret", "station_code": "FPK", "calling_at": "KGX"
    }
}"#;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sample_config() {
        let config = Config::from_json(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.max_departures, 3);
        assert_eq!(config.timezone, chrono_tz::Europe::London);
        assert_eq!(config.agenda.len(), 2);
        assert_eq!(config.agenda[1].start, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(config.agenda[1].poll_interval, Duration::from_secs(3600));
        assert_eq!(config.abbreviations[0], ("London".to_string(), "Ldn".to_string()));
        assert_eq!(config.transport.station_code, "FPK");
        assert_eq!(config.transport.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.render.map_size, (400, 480));
        assert!(config.display.command.is_empty());
    }

    fn sample_with(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_CONFIG).unwrap();
        edit(&mut value);
        value.to_string()
    }

    #[test]
    fn test_empty_agenda_is_fatal() {
        let json = sample_with(|v| v["agenda"] = serde_json::json!([]));
        assert!(matches!(
            Config::from_json(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unordered_agenda_is_fatal() {
        let json = SAMPLE_CONFIG.replace("\"06:00\"", "\"23:00\"");
        assert!(matches!(
            Config::from_json(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_start_condition_is_fatal() {
        let json = SAMPLE_CONFIG.replace("\"06:00\"", "\"6am\"");
        assert!(Config::from_json(&json).is_err());
    }

    #[test]
    fn test_bad_time_format_is_fatal() {
        let json = sample_with(|v| v["timeCodeFormat"] = serde_json::json!("%H:%Q"));
        assert!(matches!(
            Config::from_json(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_departures_is_fatal() {
        let json = SAMPLE_CONFIG.replace("\"maxDepartures\": 3", "\"maxDepartures\": 0");
        assert!(Config::from_json(&json).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(dir.path().join("config.json"));
        assert!(matches!(result, Err(ConfigError::Io(_, _))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.distance_draw_map, 20.0);
    }
}
