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

//! Prometheus metrics exporter for Ambient Weather personal weather stations
//!
//! ## Features
//!
//! `ambient_exporter` accepts reports pushed by an Ambient Weather (or compatible) station using
//! the "custom server" feature of the station firmware, computes a number of derived measurements
//! from each report, and emits the raw and derived values as Prometheus metrics. No history is
//! kept: each metric is the value from the most recent report.
//!
//! Raw values from the station:
//!
//! * `ambient_weather_station_info{station_type=$TYPE}` - Station firmware type.
//! * `ambient_weather_outdoor_temperature_celsius`, `ambient_weather_indoor_temperature_celsius`
//! * `ambient_weather_outdoor_humidity_percent`, `ambient_weather_indoor_humidity_percent`
//! * `ambient_weather_wind_speed_mph`, `ambient_weather_wind_gust_mph`, `ambient_weather_max_daily_gust_mph`
//! * `ambient_weather_wind_direction_degrees`, `ambient_weather_uv_index`, `ambient_weather_solar_radiation_wm2`
//! * `ambient_weather_outdoor_battery_ok`
//! * `ambient_weather_rain_{hourly,event,daily,weekly,monthly,yearly,total}_inches`
//! * `ambient_weather_barometric_pressure_{relative,absolute}_inhg`
//!
//! Values derived from the report and the station elevation:
//!
//! * `ambient_weather_atmospheric_pressure_hpa` - Standard atmosphere pressure at the station elevation.
//! * `ambient_weather_dew_point_celsius`
//! * `ambient_weather_heat_index_celsius` - Only meaningful above 80°F and 40% humidity.
//! * `ambient_weather_wind_chill_celsius`
//! * `ambient_weather_absolute_humidity_gm3`
//! * `ambient_weather_vapor_pressure_hpa`, `ambient_weather_vapor_pressure_deficit_hpa`
//! * `ambient_weather_wind_run_miles` - Current wind speed extrapolated over 24 hours.
//! * `ambient_weather_evapotranspiration_mm_day`
//!
//! Numeric values missing from a report, or that can't be parsed, are reported as zero.
//!
//! ## Build
//!
//! `ambient_exporter` is a Rust program and must be built from source using a
//! [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! The elevation of the station, in feet, is required.
//!
//! ```text
//! ./ambient_exporter --elevation 5280
//! ```
//!
//! In the station's "customized" server settings, set the server to the host running
//! `ambient_exporter`, the port to `9600`, and the path to `/data/report/`. The station
//! will then make requests like `GET /data/report/?PASSKEY=...&tempf=68.2&humidity=50...`.
//! Some firmware versions start the parameters with `&` instead of `?`; these are accepted too.
//!
//! ### Prometheus
//!
//! Prometheus metrics are exposed on port `9600` at `/metrics`.
//!
//! ```yaml
//! scrape_configs:
//! - job_name: ambient_exporter
//!   static_configs:
//!   - targets: ['example:9600']
//! ```
//!

pub mod atmosphere;
pub mod derived;
pub mod evapotranspiration;
pub mod http;
pub mod metrics;
pub mod psychrometrics;
pub mod report;
pub mod units;
pub mod wind;
