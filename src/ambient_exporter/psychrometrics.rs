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

//! Moisture and apparent temperature calculations.
//!
//! Vapor pressures use the Magnus form `6.112 * exp(17.67 * T / (T + 243.5))`
//! in hPa. Evapotranspiration uses a different saturation curve, see
//! `crate::evapotranspiration`, and the two must not be mixed.

use crate::atmosphere::{pressure_at_elevation, Elevation, SEA_LEVEL_PRESSURE_HPA};
use crate::units::{celsius_to_fahrenheit, fahrenheit_to_celsius};

const MAGNUS_COEFFICIENT_HPA: f64 = 6.112;
const MAGNUS_A: f64 = 17.67;
const MAGNUS_B: f64 = 243.5;

const DEW_POINT_A: f64 = 17.27;
const DEW_POINT_B: f64 = 237.7;

const WATER_VAPOR_FACTOR: f64 = 216.7;
const KELVIN_OFFSET: f64 = 273.15;

/// Saturation vapor pressure over water in hPa.
pub fn saturation_vapor_pressure(temp_c: f64) -> f64 {
    MAGNUS_COEFFICIENT_HPA * (MAGNUS_A * temp_c / (temp_c + MAGNUS_B)).exp()
}

/// Actual vapor pressure in hPa given relative humidity in percent.
pub fn actual_vapor_pressure(temp_c: f64, humidity_pct: f64) -> f64 {
    saturation_vapor_pressure(temp_c) * (humidity_pct / 100.0)
}

/// Difference between saturation and actual vapor pressure in hPa.
///
/// Zero at 100% humidity and equal to the saturation vapor pressure at 0%.
pub fn vapor_pressure_deficit(temp_c: f64, humidity_pct: f64) -> f64 {
    let svp = saturation_vapor_pressure(temp_c);
    svp - svp * (humidity_pct / 100.0)
}

/// Dew point in degrees celsius.
///
/// Humidity of zero yields `NaN`. The formula has a singularity
/// for supersaturated inputs where the intermediate term reaches `17.27` and
/// is not guarded against.
pub fn dew_point(temp_c: f64, humidity_pct: f64) -> f64 {
    let alpha = DEW_POINT_A * temp_c / (DEW_POINT_B + temp_c) + (humidity_pct / 100.0).ln();
    DEW_POINT_B * alpha / (DEW_POINT_A - alpha)
}

/// Absolute humidity in g/m³, corrected for the lower air density at the
/// given elevation.
pub fn absolute_humidity(temp_c: f64, humidity_pct: f64, elevation: Elevation) -> f64 {
    absolute_humidity_at_pressure(temp_c, humidity_pct, pressure_at_elevation(elevation))
}

/// Absolute humidity in g/m³ using an already computed station pressure in hPa.
pub fn absolute_humidity_at_pressure(temp_c: f64, humidity_pct: f64, pressure_hpa: f64) -> f64 {
    let avp = actual_vapor_pressure(temp_c, humidity_pct);
    let density_ratio = pressure_hpa / SEA_LEVEL_PRESSURE_HPA;
    WATER_VAPOR_FACTOR * avp / (temp_c + KELVIN_OFFSET) * density_ratio
}

/// Heat index in degrees celsius using the NWS Rothfusz regression.
///
/// The regression is only valid for temperatures of at least 80°F and humidity
/// of at least 40%. Results outside that range are returned as-is.
pub fn heat_index(temp_c: f64, humidity_pct: f64) -> f64 {
    let t = celsius_to_fahrenheit(temp_c);
    let rh = humidity_pct;

    let hi = -42.379 + 2.04901523 * t + 10.14333127 * rh
        - 0.22475541 * t * rh
        - 6.83783e-3 * t * t
        - 5.481717e-2 * rh * rh
        + 1.22874e-3 * t * t * rh
        + 8.5282e-4 * t * rh * rh
        - 1.99e-6 * t * t * rh * rh;

    fahrenheit_to_celsius(hi)
}

/// Wind chill in degrees celsius using the NWS formula. Wind speed must not
/// be negative.
pub fn wind_chill(temp_c: f64, wind_speed_mph: f64) -> f64 {
    let t = celsius_to_fahrenheit(temp_c);
    let v = wind_speed_mph.powf(0.16);

    fahrenheit_to_celsius(35.74 + 0.6215 * t - 35.75 * v + 0.4275 * t * v)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::units::test_tools::approx_equal;

    #[test]
    fn test_saturation_vapor_pressure() {
        assert!(approx_equal(6.112, saturation_vapor_pressure(0.0), 1.0e-10));
        assert!(approx_equal(23.37, saturation_vapor_pressure(20.0), 0.01));
    }

    #[test]
    fn test_actual_vapor_pressure() {
        let svp = saturation_vapor_pressure(25.0);
        assert!(approx_equal(svp / 2.0, actual_vapor_pressure(25.0, 50.0), 1.0e-10));
        assert_eq!(0.0, actual_vapor_pressure(25.0, 0.0));
    }

    #[test]
    fn test_vapor_pressure_deficit_non_negative() {
        let mut t = -20.0;
        while t <= 40.0 {
            for h in 0..=100 {
                let vpd = vapor_pressure_deficit(t, f64::from(h));
                assert!(vpd >= 0.0, "negative deficit {} at t={} h={}", vpd, t, h);
            }

            assert_eq!(0.0, vapor_pressure_deficit(t, 100.0));
            t += 2.5;
        }
    }

    #[test]
    fn test_vapor_pressure_deficit_dry_air() {
        assert_eq!(saturation_vapor_pressure(18.3), vapor_pressure_deficit(18.3, 0.0));
    }

    #[test]
    fn test_dew_point_saturated() {
        let mut t = -20.0;
        while t <= 40.0 {
            assert!(approx_equal(t, dew_point(t, 100.0), 1.0e-9));
            t += 0.5;
        }
    }

    #[test]
    fn test_dew_point_known_value() {
        assert!(approx_equal(9.25, dew_point(20.0, 50.0), 0.05));
        assert!(dew_point(20.0, 30.0) < dew_point(20.0, 60.0));
    }

    #[test]
    fn test_dew_point_dry_air() {
        assert!(dew_point(20.0, 0.0).is_nan());
    }

    #[test]
    fn test_absolute_humidity_sea_level() {
        let ah = absolute_humidity(20.0, 50.0, Elevation::from_feet(0.0));
        assert!(approx_equal(8.64, ah, 0.05));
    }

    #[test]
    fn test_absolute_humidity_decreases_with_elevation() {
        let mut previous = absolute_humidity(15.0, 65.0, Elevation::from_feet(0.0));
        for ft in (100..=20_000).step_by(100) {
            let current = absolute_humidity(15.0, 65.0, Elevation::from_feet(f64::from(ft)));
            assert!(current < previous, "absolute humidity at {}ft not below {}", ft, previous);
            previous = current;
        }
    }

    #[test]
    fn test_absolute_humidity_at_pressure_matches() {
        let elevation = Elevation::from_feet(4500.0);
        let pressure = pressure_at_elevation(elevation);
        assert_eq!(
            absolute_humidity(12.0, 40.0, elevation),
            absolute_humidity_at_pressure(12.0, 40.0, pressure)
        );
    }

    #[test]
    fn test_heat_index() {
        // NWS heat index table: 90°F at 70% is ~106°F
        let hi = heat_index(fahrenheit_to_celsius(90.0), 70.0);
        assert!(approx_equal(fahrenheit_to_celsius(105.92), hi, 0.05));
    }

    #[test]
    fn test_heat_index_outside_valid_range() {
        // Not physically meaningful but still returned
        assert!(heat_index(0.0, 10.0).is_finite());
    }

    #[test]
    fn test_wind_chill() {
        // NWS wind chill table: 0°F at 15mph is -19°F
        let wc = wind_chill(fahrenheit_to_celsius(0.0), 15.0);
        assert!(approx_equal(fahrenheit_to_celsius(-19.4), wc, 0.1));
    }

    #[test]
    fn test_wind_chill_negative_wind() {
        assert!(wind_chill(0.0, -5.0).is_nan());
    }
}
