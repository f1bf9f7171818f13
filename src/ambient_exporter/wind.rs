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

/// Period the instantaneous wind speed is assumed to hold for, in hours.
pub const WIND_RUN_HOURS: f64 = 24.0;

/// Distance in miles the wind would travel at the given speed over a fixed
/// 24 hour window.
///
/// This treats a single reading as constant for the whole window rather than
/// integrating speed over time. It's an approximation.
pub fn wind_run(wind_speed_mph: f64) -> f64 {
    wind_speed_mph * WIND_RUN_HOURS
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wind_run_calm() {
        assert_eq!(0.0, wind_run(0.0));
    }

    #[test]
    fn test_wind_run_linear() {
        for mph in 0..200 {
            let v = f64::from(mph) * 0.25;
            assert_eq!(2.0 * wind_run(v), wind_run(2.0 * v));
        }
    }

    #[test]
    fn test_wind_run_five_mph() {
        assert_eq!(120.0, wind_run(5.0));
    }
}
