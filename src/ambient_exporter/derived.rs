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

use crate::atmosphere::{pressure_at_elevation, Elevation};
use crate::evapotranspiration::evapotranspiration_at_pressure;
use crate::psychrometrics::{
    absolute_humidity_at_pressure, actual_vapor_pressure, dew_point, heat_index, vapor_pressure_deficit,
    wind_chill,
};
use crate::report::WeatherReport;
use crate::wind::wind_run;

/// Values computed from a `WeatherReport` and the station elevation.
///
/// Every field is a pure function of the report and elevation. Nothing is
/// validated so domain edge cases (zero humidity, negative wind speed) come
/// out as `NaN` or infinities rather than errors.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DerivedMeasures {
    pub atmospheric_pressure_hpa: f64,
    pub dew_point_c: f64,
    pub heat_index_c: f64,
    pub wind_chill_c: f64,
    pub absolute_humidity_gm3: f64,
    pub vapor_pressure_hpa: f64,
    pub vapor_pressure_deficit_hpa: f64,
    pub wind_run_miles: f64,
    pub evapotranspiration_mm_day: f64,
}

impl DerivedMeasures {
    /// Compute all derived values for a report.
    ///
    /// Station pressure is computed once and reused for absolute humidity and
    /// evapotranspiration so both see the same value.
    pub fn compute(report: &WeatherReport, elevation: Elevation) -> Self {
        let temp = report.temp_c;
        let humidity = report.humidity as f64;
        let wind = report.wind_speed_mph;

        let atmospheric_pressure_hpa = pressure_at_elevation(elevation);
        let dew_point_c = dew_point(temp, humidity);
        let heat_index_c = heat_index(temp, humidity);
        let wind_chill_c = wind_chill(temp, wind);
        let absolute_humidity_gm3 = absolute_humidity_at_pressure(temp, humidity, atmospheric_pressure_hpa);
        let vapor_pressure_hpa = actual_vapor_pressure(temp, humidity);
        let vapor_pressure_deficit_hpa = vapor_pressure_deficit(temp, humidity);
        let wind_run_miles = wind_run(wind);
        let evapotranspiration_mm_day = evapotranspiration_at_pressure(
            temp,
            humidity,
            wind,
            report.solar_radiation,
            elevation,
            atmospheric_pressure_hpa,
        );

        DerivedMeasures {
            atmospheric_pressure_hpa,
            dew_point_c,
            heat_index_c,
            wind_chill_c,
            absolute_humidity_gm3,
            vapor_pressure_hpa,
            vapor_pressure_deficit_hpa,
            wind_run_miles,
            evapotranspiration_mm_day,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::evapotranspiration::evapotranspiration;
    use crate::psychrometrics::{absolute_humidity, saturation_vapor_pressure};
    use crate::report::RawReading;
    use crate::units::test_tools::approx_equal;

    fn report(pairs: &[(&str, &str)]) -> WeatherReport {
        let raw: RawReading = pairs.iter().copied().collect();
        WeatherReport::from_raw(&raw).unwrap()
    }

    #[test]
    fn test_compute_mild_day_at_sea_level() {
        let r = report(&[("tempf", "68"), ("humidity", "50"), ("windspeedmph", "5")]);
        let d = DerivedMeasures::compute(&r, Elevation::from_feet(0.0));

        assert!(approx_equal(20.0, r.temp_c, 1.0e-10));
        assert!(approx_equal(1013.25, d.atmospheric_pressure_hpa, 1.0e-10));
        assert_eq!(120.0, d.wind_run_miles);
        assert!(approx_equal(9.3, d.dew_point_c, 0.1));
        assert!(approx_equal(8.64, d.absolute_humidity_gm3, 0.05));
        assert!(approx_equal(
            d.vapor_pressure_hpa + d.vapor_pressure_deficit_hpa,
            saturation_vapor_pressure(20.0),
            1.0e-10
        ));
        // No solar radiation and no wind adjustment at sea level
        assert_eq!(0.0, d.evapotranspiration_mm_day);
    }

    #[test]
    fn test_compute_missing_humidity() {
        let r = report(&[("tempf", "77"), ("windspeedmph", "3")]);
        let d = DerivedMeasures::compute(&r, Elevation::from_feet(850.0));

        assert_eq!(0, r.humidity);
        assert_eq!(0.0, d.vapor_pressure_hpa);
        assert_eq!(saturation_vapor_pressure(r.temp_c), d.vapor_pressure_deficit_hpa);
        assert_eq!(0.0, d.absolute_humidity_gm3);
        assert!(d.dew_point_c.is_nan());
    }

    #[test]
    fn test_compute_matches_individual_formulas() {
        let r = report(&[
            ("tempf", "91.4"),
            ("humidity", "63"),
            ("windspeedmph", "7.2"),
            ("solarradiation", "689.1"),
        ]);
        let elevation = Elevation::from_feet(1250.0);
        let d = DerivedMeasures::compute(&r, elevation);

        let humidity = r.humidity as f64;
        assert_eq!(pressure_at_elevation(elevation), d.atmospheric_pressure_hpa);
        assert_eq!(dew_point(r.temp_c, humidity), d.dew_point_c);
        assert_eq!(heat_index(r.temp_c, humidity), d.heat_index_c);
        assert_eq!(wind_chill(r.temp_c, r.wind_speed_mph), d.wind_chill_c);
        assert_eq!(absolute_humidity(r.temp_c, humidity, elevation), d.absolute_humidity_gm3);
        assert_eq!(
            evapotranspiration(r.temp_c, humidity, r.wind_speed_mph, r.solar_radiation, elevation),
            d.evapotranspiration_mm_day
        );
        assert!(d.evapotranspiration_mm_day > 0.0);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let r = report(&[("tempf", "45"), ("humidity", "88"), ("windspeedmph", "12")]);
        let elevation = Elevation::from_meters(2100.0);
        assert_eq!(DerivedMeasures::compute(&r, elevation), DerivedMeasures::compute(&r, elevation));
    }
}
