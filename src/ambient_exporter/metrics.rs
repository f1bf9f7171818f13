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

use crate::derived::DerivedMeasures;
use crate::report::WeatherReport;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;

pub const STATION_INFO: &str = "station_info";
pub const LABEL_STATION_TYPE: &str = "station_type";

pub const OUTDOOR_TEMPERATURE: &str = "outdoor_temperature_celsius";
pub const OUTDOOR_HUMIDITY: &str = "outdoor_humidity_percent";
pub const WIND_SPEED: &str = "wind_speed_mph";
pub const WIND_GUST: &str = "wind_gust_mph";
pub const MAX_DAILY_GUST: &str = "max_daily_gust_mph";
pub const WIND_DIRECTION: &str = "wind_direction_degrees";
pub const UV_INDEX: &str = "uv_index";
pub const SOLAR_RADIATION: &str = "solar_radiation_wm2";
pub const BATTERY_OUT: &str = "outdoor_battery_ok";
pub const RAIN_HOURLY: &str = "rain_hourly_inches";
pub const RAIN_EVENT: &str = "rain_event_inches";
pub const RAIN_DAILY: &str = "rain_daily_inches";
pub const RAIN_WEEKLY: &str = "rain_weekly_inches";
pub const RAIN_MONTHLY: &str = "rain_monthly_inches";
pub const RAIN_YEARLY: &str = "rain_yearly_inches";
pub const RAIN_TOTAL: &str = "rain_total_inches";
pub const INDOOR_TEMPERATURE: &str = "indoor_temperature_celsius";
pub const INDOOR_HUMIDITY: &str = "indoor_humidity_percent";
pub const BAROMETRIC_RELATIVE: &str = "barometric_pressure_relative_inhg";
pub const BAROMETRIC_ABSOLUTE: &str = "barometric_pressure_absolute_inhg";

pub const ATMOSPHERIC_PRESSURE: &str = "atmospheric_pressure_hpa";
pub const DEW_POINT: &str = "dew_point_celsius";
pub const HEAT_INDEX: &str = "heat_index_celsius";
pub const WIND_CHILL: &str = "wind_chill_celsius";
pub const ABSOLUTE_HUMIDITY: &str = "absolute_humidity_gm3";
pub const VAPOR_PRESSURE: &str = "vapor_pressure_hpa";
pub const VAPOR_PRESSURE_DEFICIT: &str = "vapor_pressure_deficit_hpa";
pub const WIND_RUN: &str = "wind_run_miles";
pub const EVAPOTRANSPIRATION: &str = "evapotranspiration_mm_day";

/// Name and help text of every single-value gauge.
pub const GAUGES: &[(&str, &str)] = &[
    (OUTDOOR_TEMPERATURE, "Outdoor temperature in Celsius"),
    (OUTDOOR_HUMIDITY, "Outdoor relative humidity percentage"),
    (WIND_SPEED, "Average wind speed in mph"),
    (WIND_GUST, "Current wind gust in mph"),
    (MAX_DAILY_GUST, "Maximum wind gust today in mph"),
    (WIND_DIRECTION, "Wind direction in degrees (0-360)"),
    (UV_INDEX, "UV index"),
    (SOLAR_RADIATION, "Solar radiation in W/m²"),
    (BATTERY_OUT, "Outdoor sensor battery status (1 = OK)"),
    (RAIN_HOURLY, "Rain in last hour in inches"),
    (RAIN_EVENT, "Rain since last reset in inches"),
    (RAIN_DAILY, "Rain today in inches"),
    (RAIN_WEEKLY, "Rain this week in inches"),
    (RAIN_MONTHLY, "Rain this month in inches"),
    (RAIN_YEARLY, "Rain this year in inches"),
    (RAIN_TOTAL, "Lifetime rain total in inches"),
    (INDOOR_TEMPERATURE, "Indoor temperature in Celsius"),
    (INDOOR_HUMIDITY, "Indoor relative humidity percentage"),
    (BAROMETRIC_RELATIVE, "Sea-level (relative) barometric pressure in inHg"),
    (BAROMETRIC_ABSOLUTE, "Absolute station barometric pressure in inHg"),
    (ATMOSPHERIC_PRESSURE, "Atmospheric pressure at station elevation in hPa"),
    (DEW_POINT, "Dew point in Celsius"),
    (HEAT_INDEX, "Heat index in Celsius"),
    (WIND_CHILL, "Wind chill in Celsius"),
    (ABSOLUTE_HUMIDITY, "Absolute humidity in g/m³"),
    (VAPOR_PRESSURE, "Vapor pressure in hPa"),
    (VAPOR_PRESSURE_DEFICIT, "Vapor pressure deficit in hPa"),
    (WIND_RUN, "Wind run in miles (24-hour period)"),
    (EVAPOTRANSPIRATION, "Evapotranspiration in mm/day"),
];

/// Somewhere to put the current value of each published measurement.
///
/// Implementations must be safe to call from concurrent requests. When two
/// reports race, whichever writes last wins.
pub trait MetricsSink: Send + Sync {
    /// Set the value of a gauge with no labels.
    fn set_named_value(&self, name: &str, value: f64);

    /// Set the value of a gauge for a particular set of label values.
    fn set_labeled_value(&self, name: &str, labels: &[(&str, &str)], value: f64);
}

type LabelSet = Vec<(String, String)>;

/// `MetricsSink` backed by gauges registered with a Prometheus `Registry`.
///
/// All metrics are created and registered upon call to `PrometheusSink::new()`.
/// The registry is expected to add the "ambient_weather_" prefix.
#[derive(Debug)]
pub struct PrometheusSink {
    station_info: Family<LabelSet, Gauge<f64, AtomicU64>>,
    gauges: HashMap<&'static str, Gauge<f64, AtomicU64>>,
}

impl PrometheusSink {
    pub fn new(reg: &mut Registry) -> Self {
        let station_info = Family::<LabelSet, Gauge<f64, AtomicU64>>::default();
        reg.register(STATION_INFO, "Ambient Weather station information", station_info.clone());

        let mut gauges = HashMap::with_capacity(GAUGES.len());
        for &(name, help) in GAUGES {
            let gauge = Gauge::<f64, AtomicU64>::default();
            reg.register(name, help, gauge.clone());
            gauges.insert(name, gauge);
        }

        Self { station_info, gauges }
    }
}

impl MetricsSink for PrometheusSink {
    fn set_named_value(&self, name: &str, value: f64) {
        match self.gauges.get(name) {
            Some(gauge) => {
                gauge.set(value);
            }
            None => {
                tracing::warn!(message = "ignoring value for unknown metric", metric = name);
            }
        }
    }

    fn set_labeled_value(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        if name != STATION_INFO {
            tracing::warn!(message = "ignoring labeled value for unknown metric", metric = name);
            return;
        }

        let labels: LabelSet = labels.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect();
        self.station_info.get_or_create(&labels).set(value);
    }
}

/// Set every raw and derived measurement from a report on the sink.
pub fn publish(sink: &dyn MetricsSink, report: &WeatherReport, derived: &DerivedMeasures) {
    sink.set_labeled_value(STATION_INFO, &[(LABEL_STATION_TYPE, &report.station_type)], 1.0);

    sink.set_named_value(OUTDOOR_TEMPERATURE, report.temp_c);
    sink.set_named_value(OUTDOOR_HUMIDITY, report.humidity as f64);
    sink.set_named_value(WIND_SPEED, report.wind_speed_mph);
    sink.set_named_value(WIND_GUST, report.wind_gust_mph);
    sink.set_named_value(MAX_DAILY_GUST, report.max_daily_gust_mph);
    sink.set_named_value(WIND_DIRECTION, report.wind_dir as f64);
    sink.set_named_value(UV_INDEX, report.uv as f64);
    sink.set_named_value(SOLAR_RADIATION, report.solar_radiation);
    sink.set_named_value(BATTERY_OUT, report.batt_out as f64);
    sink.set_named_value(RAIN_HOURLY, report.hourly_rain_in);
    sink.set_named_value(RAIN_EVENT, report.event_rain_in);
    sink.set_named_value(RAIN_DAILY, report.daily_rain_in);
    sink.set_named_value(RAIN_WEEKLY, report.weekly_rain_in);
    sink.set_named_value(RAIN_MONTHLY, report.monthly_rain_in);
    sink.set_named_value(RAIN_YEARLY, report.yearly_rain_in);
    sink.set_named_value(RAIN_TOTAL, report.total_rain_in);
    sink.set_named_value(INDOOR_TEMPERATURE, report.temp_in_c);
    sink.set_named_value(INDOOR_HUMIDITY, report.humidity_in as f64);
    sink.set_named_value(BAROMETRIC_RELATIVE, report.barom_rel_in);
    sink.set_named_value(BAROMETRIC_ABSOLUTE, report.barom_abs_in);

    sink.set_named_value(ATMOSPHERIC_PRESSURE, derived.atmospheric_pressure_hpa);
    sink.set_named_value(DEW_POINT, derived.dew_point_c);
    sink.set_named_value(HEAT_INDEX, derived.heat_index_c);
    sink.set_named_value(WIND_CHILL, derived.wind_chill_c);
    sink.set_named_value(ABSOLUTE_HUMIDITY, derived.absolute_humidity_gm3);
    sink.set_named_value(VAPOR_PRESSURE, derived.vapor_pressure_hpa);
    sink.set_named_value(VAPOR_PRESSURE_DEFICIT, derived.vapor_pressure_deficit_hpa);
    sink.set_named_value(WIND_RUN, derived.wind_run_miles);
    sink.set_named_value(EVAPOTRANSPIRATION, derived.evapotranspiration_mm_day);
}
