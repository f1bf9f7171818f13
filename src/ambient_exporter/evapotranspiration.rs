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

//! Reference evapotranspiration using a simplified FAO Penman-Monteith equation
//! adjusted for station elevation.

use crate::atmosphere::{pressure_at_elevation, Elevation};
use crate::units::mph_to_ms;

// FAO-56 saturation curve, kPa. Intentionally not the Magnus constants used
// for the reported vapor pressures.
const FAO_COEFFICIENT_KPA: f64 = 0.6108;
const FAO_A: f64 = 17.27;
const FAO_B: f64 = 237.3;

const PSYCHROMETRIC_FACTOR: f64 = 0.665e-3;
const WIND_REFERENCE_HEIGHT_M: f64 = 10.0;
const WIND_HEIGHT_EXPONENT: f64 = 0.2;

fn fao_saturation_vapor_pressure(temp_c: f64) -> f64 {
    FAO_COEFFICIENT_KPA * (FAO_A * temp_c / (temp_c + FAO_B)).exp()
}

/// Slope of the saturation vapor pressure curve at the given temperature.
fn saturation_slope(temp_c: f64) -> f64 {
    4098.0 * fao_saturation_vapor_pressure(temp_c) / (temp_c + FAO_B).powi(2)
}

/// Estimated evapotranspiration in mm/day.
///
/// Solar radiation is used exactly as the station reports it (W/m²).
pub fn evapotranspiration(
    temp_c: f64,
    humidity_pct: f64,
    wind_speed_mph: f64,
    solar_radiation: f64,
    elevation: Elevation,
) -> f64 {
    evapotranspiration_at_pressure(
        temp_c,
        humidity_pct,
        wind_speed_mph,
        solar_radiation,
        elevation,
        pressure_at_elevation(elevation),
    )
}

/// Estimated evapotranspiration in mm/day using an already computed station
/// pressure in hPa.
///
/// Wind speed is scaled by `(elevation / 10m)^0.2`, so the wind term vanishes
/// at sea level and the result is `NaN` for stations below sea level.
pub fn evapotranspiration_at_pressure(
    temp_c: f64,
    humidity_pct: f64,
    wind_speed_mph: f64,
    solar_radiation: f64,
    elevation: Elevation,
    pressure_hpa: f64,
) -> f64 {
    let wind_ms =
        mph_to_ms(wind_speed_mph) * (elevation.meters() / WIND_REFERENCE_HEIGHT_M).powf(WIND_HEIGHT_EXPONENT);
    let gamma = PSYCHROMETRIC_FACTOR * pressure_hpa;
    let delta = saturation_slope(temp_c);
    let es = fao_saturation_vapor_pressure(temp_c);
    let ea = es * humidity_pct / 100.0;

    let numerator = 0.408 * delta * solar_radiation + gamma * (900.0 / (temp_c + 273.0)) * wind_ms * (es - ea);
    let denominator = delta + gamma * (1.0 + 0.34 * wind_ms);
    numerator / denominator
}
