use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

#[derive(thiserror::Error, Debug)]
pub struct DateError(String);

impl Display for DateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DateError: {}", self.0)
    }
}

pub type DateResult<T> = Result<T, DateError>;

/// Parses the `aimed_*_date` / `aimed_*_time` pairs of the timetable feed
/// as wall-clock times in the board's time zone
pub struct StopDateTimeParser {
    re_time: Regex,
    tz: Tz,
}

impl StopDateTimeParser {
    pub fn new(tz: Tz) -> Self {
        let re_time = Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").unwrap();
        Self { re_time, tz }
    }

    pub fn parse_date(&self, date: &str) -> DateResult<NaiveDate> {
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| DateError(e.to_string()))
    }

    /// `HH:MM`, also used for agenda start conditions
    pub fn parse_time(&self, time: &str) -> DateResult<NaiveTime> {
        let captures = self
            .re_time
            .captures(time)
            .ok_or_else(|| DateError(format!("Invalid time: {:?}", time)))?;
        let hour = captures[1]
            .parse::<u32>()
            .map_err(|e| DateError(e.to_string()))?;
        let minute = captures[2]
            .parse::<u32>()
            .map_err(|e| DateError(e.to_string()))?;

        NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| DateError(format!("Invalid time: {:?}", time)))
    }

    /// `None` when the feed has no time. A blank date falls back to `today`.
    pub fn parse_aimed(
        &self,
        date: Option<&str>,
        time: Option<&str>,
        today: NaiveDate,
    ) -> DateResult<Option<DateTime<Tz>>> {
        let Some(time) = time.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };

        let date = match date.filter(|d| !d.trim().is_empty()) {
            Some(date) => self.parse_date(date)?,
            None => today,
        };
        let time = self.parse_time(time)?;

        self.localize(NaiveDateTime::new(date, time)).map(Some)
    }

    pub fn localize(&self, local: NaiveDateTime) -> DateResult<DateTime<Tz>> {
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .ok_or_else(|| DateError(format!("Nonexistent local time: {}", local)))
    }
}

#[cfg(test)]
mod test {
    use chrono::Timelike;

    use super::*;

    fn parser() -> StopDateTimeParser {
        StopDateTimeParser::new(chrono_tz::Europe::London)
    }

    #[test]
    fn test_parse_aimed() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dt = parser()
            .parse_aimed(Some("2024-03-02"), Some("07:45"), today)
            .unwrap()
            .unwrap();

        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!((dt.hour(), dt.minute()), (7, 45));
    }

    #[test]
    fn test_missing_time_is_unknown() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(parser()
            .parse_aimed(Some("2024-03-02"), None, today)
            .unwrap()
            .is_none());
        assert!(parser()
            .parse_aimed(None, Some(" "), today)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_date_uses_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dt = parser().parse_aimed(None, Some("9:05"), today).unwrap().unwrap();
        assert_eq!(dt.date_naive(), today);
        assert_eq!((dt.hour(), dt.minute()), (9, 5));
    }

    #[test]
    fn test_bad_time() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(parser().parse_aimed(None, Some("25:00"), today).is_err());
        assert!(parser().parse_time("noon").is_err());
    }
}
