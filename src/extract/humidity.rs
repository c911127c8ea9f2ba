/*!
 * Relative humidity from hourly temperature and dewpoint.
 *
 * Saturation vapor pressure uses a 6th order polynomial fit between -50 °C and 50 °C and the
 * Clausius-Clapeyron relation outside that range.
 */

use super::Context;
use crate::{
    climate_time::{celsius_to_fahrenheit, nint},
    query::Element,
    value::{Derived, Provenance},
};
use chrono::NaiveDateTime;
use log::warn;

/// Plausible temperatures in °F.
const TEMP_RANGE: (f64, f64) = (-80.0, 130.0);
/// Plausible dewpoints in °F.
const DEWPOINT_RANGE: (f64, f64) = (-80.0, 90.0);

/// At most one day of hourly reports is used.
const MAX_HOURS: usize = 24;

const FREEZING_K: f64 = 273.16;

/// Relative humidity extremes and mean in whole percent. Times are UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Humidity {
    pub max: Derived<i32>,
    pub min: Derived<i32>,
    pub mean: Derived<i32>,
}

/**
 * Derive relative humidity for a window from hourly reports.
 *
 * The mean is the average of the unrounded maximum and minimum.
 */
pub fn extract_humidity(ctx: &Context) -> Humidity {
    let mut max: Option<(f64, NaiveDateTime)> = None;
    let mut min: Option<(f64, NaiveDateTime)> = None;

    for nominal in ctx.window.hours().take(MAX_HOURS) {
        let rh = match hourly_rh(ctx, nominal) {
            Some(rh) => rh,
            None => continue,
        };

        if max.map(|(m, _)| rh > m).unwrap_or(true) {
            max = Some((rh, nominal));
        }
        if min.map(|(m, _)| rh < m).unwrap_or(true) {
            min = Some((rh, nominal));
        }
    }

    match (max, min) {
        (Some((hi, hi_at)), Some((lo, lo_at))) => Humidity {
            max: Derived::new(nint(hi), Provenance::Calculated).at(Some(hi_at.time())),
            min: Derived::new(nint(lo), Provenance::Calculated).at(Some(lo_at.time())),
            mean: Derived::new(nint((hi + lo) / 2.0), Provenance::Calculated),
        },
        _ => Humidity {
            max: Derived::missing(),
            min: Derived::missing(),
            mean: Derived::missing(),
        },
    }
}

/// Relative humidity in percent from temperature and dewpoint in °F.
pub fn relative_humidity(temp_f: f64, dewpoint_f: f64) -> f64 {
    vapor_pressure(dewpoint_f) / vapor_pressure(temp_f) * 100.0
}

/**
 * Saturation vapor pressure over water in hPa.
 *
 * #Arguments
 * * temp_f - temperature in °F.
 */
pub fn vapor_pressure(temp_f: f64) -> f64 {
    const COEFFS: [f64; 7] = [
        6984.505294,
        -188.9039310,
        2.133357675,
        -1.288580973E-2,
        4.393587233E-5,
        -8.023923082E-8,
        6.136820929E-11,
    ];

    let temp_k = (temp_f - 32.0) * 5.0 / 9.0 + FREEZING_K;
    let temp_c = temp_k - FREEZING_K;

    if temp_c > -50.0 && temp_c < 50.0 {
        COEFFS.iter().rev().fold(0.0, |acc, coeff| acc * temp_k + coeff)
    } else {
        let latent_heat = 2.5e6 - 22.74 * temp_c;
        6.11 * ((latent_heat / 461.5) * (1.0 / FREEZING_K - 1.0 / temp_k)).exp()
    }
}

fn hourly_rh(ctx: &Context, nominal: NaiveDateTime) -> Option<f64> {
    let temp = hourly_value(ctx, nominal, Element::TempTenths, Element::TempWhole)?;
    let dewpoint = hourly_value(ctx, nominal, Element::DewpointTenths, Element::DewpointWhole)?;

    let temp = celsius_to_fahrenheit(temp);
    let dewpoint = celsius_to_fahrenheit(dewpoint);

    if !in_range(temp, TEMP_RANGE) {
        warn!("Temperature {:.1}F at {} out of bounds", temp, nominal);
        return None;
    }
    if !in_range(dewpoint, DEWPOINT_RANGE) {
        warn!("Dewpoint {:.1}F at {} out of bounds", dewpoint, nominal);
        return None;
    }

    Some(relative_humidity(temp, dewpoint))
}

/// The tenths precision value, or the whole degree value when that is absent.
fn hourly_value(
    ctx: &Context,
    nominal: NaiveDateTime,
    tenths: Element,
    whole: Element,
) -> Option<f64> {
    let id = ctx.station_id();
    ctx.query
        .report_value(id, tenths, nominal)
        .or_warn("hourly temperature")
        .or_else(|| {
            ctx.query
                .report_value(id, whole, nominal)
                .or_warn("hourly whole degree temperature")
        })
}

fn in_range(val: f64, (lo, hi): (f64, f64)) -> bool {
    val >= lo && val <= hi
}
