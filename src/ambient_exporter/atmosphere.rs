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

use crate::units::{feet_to_meters, meters_to_feet};
use std::fmt;

/// Standard atmospheric pressure at sea level, in hPa.
pub const SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;

const TEMPERATURE_LAPSE_RATE: f64 = 0.0065;
const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;
const BAROMETRIC_EXPONENT: f64 = 5.255;

/// Fixed height of a station above sea level.
///
/// Supplied once at startup and shared read-only by every formula that
/// depends on air pressure or density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elevation {
    feet: f64,
}

impl Elevation {
    pub fn from_feet(feet: f64) -> Self {
        Elevation { feet }
    }

    pub fn from_meters(meters: f64) -> Self {
        Elevation {
            feet: meters_to_feet(meters),
        }
    }

    pub fn feet(&self) -> f64 {
        self.feet
    }

    pub fn meters(&self) -> f64 {
        feet_to_meters(self.feet)
    }
}

impl fmt::Display for Elevation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ft", self.feet)
    }
}

/// Air pressure at the given elevation, in hPa, using the international
/// barometric formula for a standard atmosphere.
///
/// Only meaningful for real-world elevations. Above roughly 44km the base of
/// the exponent goes negative and the result is `NaN`.
pub fn pressure_at_elevation(elevation: Elevation) -> f64 {
    let base = 1.0 - TEMPERATURE_LAPSE_RATE * elevation.meters() / SEA_LEVEL_TEMPERATURE_K;
    SEA_LEVEL_PRESSURE_HPA * base.powf(BAROMETRIC_EXPONENT)
}
