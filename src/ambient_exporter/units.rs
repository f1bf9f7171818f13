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

//! Conversions between the imperial units reported by stations and the metric
//! units used by the derived measurement formulas.

const METERS_PER_FOOT: f64 = 0.3048;
const MS_PER_MPH: f64 = 0.44704;

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn feet_to_meters(ft: f64) -> f64 {
    ft * METERS_PER_FOOT
}

pub fn meters_to_feet(m: f64) -> f64 {
    m / METERS_PER_FOOT
}

/// Convert miles per hour to meters per second.
pub fn mph_to_ms(mph: f64) -> f64 {
    mph * MS_PER_MPH
}

#[cfg(test)]
pub(crate) mod test_tools {
    pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
        assert!(eps > 0.0);

        (val1 - val2).abs() < eps
    }
}
