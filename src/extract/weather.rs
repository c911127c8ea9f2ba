/*!
 * Weather types observed during the day.
 *
 * Present weather codes from the daily summary and from routine and special reports are sorted
 * into a fixed list of categories. A code matches the first category, in list order, that has not
 * already been flagged. Two or more kinds of precipitation in the same report flag mixed
 * precipitation.
 */

use super::Context;
use crate::{
    query::{Lookup, WeatherGroup},
    value::{Derived, Provenance},
};
use log::warn;
use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Visibility, in sixteenths of a mile, at or below which fog is dense fog.
const DENSE_FOG_16THS: i32 = 4;

/// Weather categories in the order codes are matched against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum WeatherType {
    Thunder,
    MixedPrecip,
    HeavyRain,
    Rain,
    LightRain,
    FreezingRain,
    LightFreezingRain,
    Hail,
    HeavySnow,
    Snow,
    LightSnow,
    IcePellets,
    Fog,
    /// Fog with visibility of a quarter mile or less.
    FogQuarterMile,
    Haze,
    BlowingSnow,
    SandDustStorm,
    FunnelCloud,
}

impl WeatherType {
    /// Does a present weather code belong to this category?
    pub fn matches(self, code: i32) -> bool {
        use WeatherType::*;

        match self {
            Thunder => matches!(code, 101..=112),
            // Only ever set from the mix of kinds in a report.
            MixedPrecip => false,
            HeavyRain => matches!(code, 22 | 23 | 107),
            Rain => matches!(code, 12 | 13 | 104),
            LightRain => matches!(code, 1..=3 | 11 | 21 | 101),
            FreezingRain => matches!(code, 19 | 20 | 30),
            LightFreezingRain => matches!(code, 9 | 10 | 29),
            Hail => matches!(code, 33..=36 | 111 | 112),
            HeavySnow => matches!(code, 24 | 25 | 27 | 108),
            Snow => matches!(code, 14 | 15 | 17 | 105),
            LightSnow => matches!(code, 4 | 5 | 7 | 102),
            IcePellets => matches!(code, 6 | 8 | 16 | 18 | 26 | 28 | 103 | 106 | 109),
            Fog => is_fog(code),
            FogQuarterMile => false,
            Haze => code == 207,
            BlowingSnow => code == 217,
            SandDustStorm => matches!(code, 213 | 215 | 304 | 305 | 307 | 308),
            FunnelCloud => code == 306,
        }
    }

    /// Precipitation kinds counted when looking for mixed precipitation.
    fn precip_kind(code: i32) -> Option<WeatherType> {
        use WeatherType::*;

        [
            HeavyRain,
            Rain,
            LightRain,
            FreezingRain,
            LightFreezingRain,
            HeavySnow,
            Snow,
            LightSnow,
            IcePellets,
        ]
        .iter()
        .copied()
        .find(|kind| kind.matches(code))
    }
}

fn is_fog(code: i32) -> bool {
    matches!(code, 201 | 202 | 208..=211)
}

/// Which weather categories occurred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeatherFlags {
    flags: [bool; WeatherType::COUNT],
}

impl WeatherFlags {
    pub fn is_set(&self, wx: WeatherType) -> bool {
        self.flags[wx as usize]
    }

    pub fn set(&mut self, wx: WeatherType) {
        self.flags[wx as usize] = true;
    }

    /// Number of categories that occurred.
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }

    /// The categories that occurred, in category order.
    pub fn types(&self) -> impl Iterator<Item = WeatherType> + '_ {
        WeatherType::iter().filter(move |wx| self.is_set(*wx))
    }

    /// Union with another set of flags.
    pub fn merge(&mut self, other: &WeatherFlags) {
        for (mine, theirs) in self.flags.iter_mut().zip(other.flags.iter()) {
            *mine |= *theirs;
        }
    }

    /// Classify every group of a single report.
    fn add_report(&mut self, groups: &[WeatherGroup]) {
        let mut kinds: Vec<WeatherType> = groups
            .iter()
            .filter_map(|g| WeatherType::precip_kind(g.code))
            .collect();
        kinds.sort_by_key(|k| *k as usize);
        kinds.dedup();
        let mixed = kinds.len() > 1;

        for group in groups {
            self.classify(group, mixed);
        }
    }

    fn classify(&mut self, group: &WeatherGroup, mixed: bool) {
        let dense = is_fog(group.code)
            && matches!(group.visibility_16ths, Some(vis) if vis <= DENSE_FOG_16THS);
        if dense {
            self.set(WeatherType::FogQuarterMile);
            return;
        }

        for wx in WeatherType::iter() {
            if self.is_set(wx) {
                continue;
            }

            if wx == WeatherType::MixedPrecip {
                if mixed {
                    self.set(wx);
                }
                continue;
            }

            if wx.matches(group.code) {
                self.set(wx);
                return;
            }
        }
    }
}

/**
 * Derive the weather categories for a window.
 *
 * #Returns
 * Flags from the daily summary merged with those from every report in the window. When nothing
 * was flagged but reports were available the result is an empty set of flags rather than
 * missing.
 */
pub fn extract_weather(ctx: &Context) -> Derived<WeatherFlags> {
    let summary_codes = ctx.summary.and_then(|dsm| dsm.weather.as_ref());

    let mut from_summary = WeatherFlags::default();
    if let Some(codes) = summary_codes {
        let groups: Vec<WeatherGroup> = codes
            .iter()
            .map(|&code| WeatherGroup {
                code,
                visibility_16ths: None,
            })
            .collect();
        from_summary.add_report(&groups);
    }

    let mut observed = WeatherFlags::default();
    let mut any_report = false;
    for nominal in ctx.window.hours() {
        match ctx.query.weather(ctx.station_id(), nominal) {
            Lookup::Found(groups) => {
                any_report = true;
                observed.add_report(&groups);
            }
            Lookup::NotFound => {}
            Lookup::Failed(err) => warn!("present weather at {}: {}", nominal, err),
        }
    }

    let provenance = match (from_summary.count() > 0, observed.count() > 0) {
        (true, true) => Provenance::WeatherCombined,
        (true, false) => Provenance::DailySummary,
        (false, true) => Provenance::WeatherObserved,
        (false, false) if summary_codes.is_some() || any_report => {
            Provenance::WeatherNoneReported
        }
        (false, false) => Provenance::Missing,
    };

    let mut flags = from_summary;
    flags.merge(&observed);
    Derived::new(flags, provenance)
}
