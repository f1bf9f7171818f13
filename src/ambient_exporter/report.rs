// ambient_exporter - Prometheus metrics exporter for Ambient Weather stations
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::units::fahrenheit_to_celsius;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_LEN: usize = 19;

#[derive(Debug)]
pub enum ReportError {
    /// `source` is `None` when the value isn't laid out as `YYYY-MM-DD HH:MM:SS`
    /// at all, `Some` when it is but isn't a valid date or time.
    MalformedTimestamp {
        value: String,
        source: Option<chrono::ParseError>,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTimestamp { value, source: Some(e) } => {
                write!(f, "failed to parse date {:?}: {}", value, e)
            }
            Self::MalformedTimestamp { value, source: None } => {
                write!(f, "failed to parse date {:?}: expected layout YYYY-MM-DD HH:MM:SS", value)
            }
        }
    }
}

impl error::Error for ReportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::MalformedTimestamp { source, .. } => source.as_ref().map(|e| e as &(dyn error::Error + 'static)),
        }
    }
}

/// Parameters exactly as sent by a station, before any parsing.
///
/// If a parameter is repeated, the first value wins.
#[derive(Debug, Default, Clone)]
pub struct RawReading {
    params: HashMap<String, String>,
}

impl RawReading {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn float(&self, key: &str) -> f64 {
        self.number(key)
    }

    /// Integers that overflow saturate at the `i64` bounds, anything else that
    /// doesn't parse is zero.
    fn int(&self, key: &str) -> i64 {
        match self.get(key).filter(|v| !v.is_empty()).map(str::parse::<i64>) {
            Some(Ok(v)) => v,
            Some(Err(e)) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => 0,
            },
            None => 0,
        }
    }

    /// Fahrenheit temperature converted to celsius. A value of exactly zero
    /// (or missing) stays zero instead of becoming -17.8°C.
    fn temperature(&self, key: &str) -> f64 {
        let f = self.float(key);
        if f == 0.0 {
            0.0
        } else {
            fahrenheit_to_celsius(f)
        }
    }

    // Missing and unparseable values are both zero, same as a value sent as zero.
    fn number<T: FromStr + Default>(&self, key: &str) -> T {
        self.get(key)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    fn timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, ReportError> {
        match self.get(key) {
            None | Some("") => Ok(None),
            Some(raw) => {
                // Some firmware sends spaces as literal '+'
                let value = raw.replace('+', " ");
                if !has_timestamp_layout(&value) {
                    return Err(ReportError::MalformedTimestamp { value, source: None });
                }

                NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT)
                    .map(|t| Some(Utc.from_utc_datetime(&t)))
                    .map_err(|e| ReportError::MalformedTimestamp { value, source: Some(e) })
            }
        }
    }
}

/// Exactly `YYYY-MM-DD HH:MM:SS` with zero padded fields. chrono alone also
/// accepts single digit fields and any amount of whitespace between date and
/// time.
fn has_timestamp_layout(value: &str) -> bool {
    value.len() == TIMESTAMP_LEN
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            10 => b == b' ',
            13 | 16 => b == b':',
            _ => b.is_ascii_digit(),
        })
}

impl<K, V> FromIterator<(K, V)> for RawReading
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = HashMap::new();
        for (k, v) in iter {
            params.entry(k.into()).or_insert_with(|| v.into());
        }

        RawReading { params }
    }
}

/// A single normalized report from a station.
///
/// Temperatures are celsius, everything else is in the units the station
/// reports. Any numeric field that was missing or couldn't be parsed is zero.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WeatherReport {
    pub passkey: String,
    pub station_type: String,
    pub date_utc: Option<DateTime<Utc>>,

    pub temp_c: f64,
    pub humidity: i64,
    pub wind_speed_mph: f64,
    pub wind_gust_mph: f64,
    pub max_daily_gust_mph: f64,
    pub wind_dir: i64,
    pub uv: i64,
    pub solar_radiation: f64,
    pub batt_out: i64,

    pub hourly_rain_in: f64,
    pub event_rain_in: f64,
    pub daily_rain_in: f64,
    pub weekly_rain_in: f64,
    pub monthly_rain_in: f64,
    pub yearly_rain_in: f64,
    pub total_rain_in: f64,

    pub temp_in_c: f64,
    pub humidity_in: i64,

    pub barom_rel_in: f64,
    pub barom_abs_in: f64,
}

impl WeatherReport {
    /// Normalize raw station parameters.
    ///
    /// Only a timestamp that is present but can't be parsed causes an error.
    pub fn from_raw(raw: &RawReading) -> Result<Self, ReportError> {
        Ok(WeatherReport {
            passkey: raw.get("PASSKEY").unwrap_or_default().to_owned(),
            station_type: raw.get("stationtype").unwrap_or_default().to_owned(),
            date_utc: raw.timestamp("dateutc")?,

            temp_c: raw.temperature("tempf"),
            humidity: raw.int("humidity"),
            wind_speed_mph: raw.float("windspeedmph"),
            wind_gust_mph: raw.float("windgustmph"),
            max_daily_gust_mph: raw.float("maxdailygust"),
            wind_dir: raw.int("winddir"),
            uv: raw.int("uv"),
            solar_radiation: raw.float("solarradiation"),
            batt_out: raw.int("battout"),

            hourly_rain_in: raw.float("hourlyrainin"),
            event_rain_in: raw.float("eventrainin"),
            daily_rain_in: raw.float("dailyrainin"),
            weekly_rain_in: raw.float("weeklyrainin"),
            monthly_rain_in: raw.float("monthlyrainin"),
            yearly_rain_in: raw.float("yearlyrainin"),
            total_rain_in: raw.float("totalrainin"),

            temp_in_c: raw.temperature("tempinf"),
            humidity_in: raw.int("humidityin"),

            barom_rel_in: raw.float("baromrelin"),
            barom_abs_in: raw.float("baromabsin"),
        })
    }
}
