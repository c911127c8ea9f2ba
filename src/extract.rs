/*!
 * Fallback chains that derive one quantity for one station and window.
 *
 * Each quantity is an ordered list of strategies. A strategy either produces a derived value or
 * declines, and the first one to produce a value wins. Strategies never fail, a failed lookup
 * is logged and treated as "nothing here" so the next strategy gets its turn.
 */

use crate::{
    climate_time::{celsius_to_fahrenheit, nint},
    query::{DailySummary, ObservationQuery},
    station::Station,
    value::Derived,
    window::ObservationWindow,
};

pub use humidity::{extract_humidity, vapor_pressure, Humidity};
pub use precip::extract_precip;
pub use sky::extract_sky_cover;
pub use snow::{extract_snow, Snow};
pub use sunshine::{extract_sunshine, Sunshine};
pub use temperature::{extract_temperature, Temperatures};
pub use weather::{extract_weather, WeatherFlags, WeatherType};
pub use wind::{extract_wind, resultant_wind, Winds};

/// Everything a strategy may consult.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub query: &'a dyn ObservationQuery,
    pub station: &'a Station,
    pub window: &'a ObservationWindow,
    /// The station's daily summary message for the window, if one was found.
    pub summary: Option<&'a DailySummary>,
}

impl<'a> Context<'a> {
    pub fn new(
        query: &'a dyn ObservationQuery,
        station: &'a Station,
        window: &'a ObservationWindow,
        summary: Option<&'a DailySummary>,
    ) -> Self {
        Context {
            query,
            station,
            window,
            summary,
        }
    }

    pub(crate) fn station_id(&self) -> i32 {
        self.station.id
    }
}

/// One tier of a fallback chain.
pub type Strategy<T> = fn(&Context) -> Option<Derived<T>>;

/// Run strategies in order until one produces a value.
pub fn first_success<T>(ctx: &Context, strategies: &[Strategy<T>]) -> Option<Derived<T>> {
    strategies.iter().find_map(|strategy| strategy(ctx))
}

/// Run strategies in order, a missing result if none produce a value.
pub fn derive<T>(ctx: &Context, strategies: &[Strategy<T>]) -> Derived<T> {
    first_success(ctx, strategies).unwrap_or_else(Derived::missing)
}

/// Whole degrees Fahrenheit from Celsius, the single point where temperatures change units.
pub(crate) fn whole_fahrenheit(celsius: f64) -> i32 {
    nint(celsius_to_fahrenheit(celsius))
}

/*-------------------------------------------------------------------------------------------------
 *                                        Quantities
 *-----------------------------------------------------------------------------------------------*/
mod humidity;
mod precip;
mod sky;
mod snow;
mod sunshine;
mod temperature;
mod weather;
mod wind;

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        mock::{station, MockSources},
        period::PeriodType,
        value::Provenance,
        window::resolve_window,
    };
    use chrono::NaiveDate;

    fn declines(_: &Context) -> Option<Derived<i32>> {
        None
    }

    fn five(_: &Context) -> Option<Derived<i32>> {
        Some(Derived::new(5, Provenance::Calculated))
    }

    fn six(_: &Context) -> Option<Derived<i32>> {
        Some(Derived::new(6, Provenance::DailySummary))
    }

    #[test]
    fn test_first_success_stops_at_first_value() {
        let mock = MockSources::default();
        let stn = station(-5);
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let window = resolve_window(PeriodType::MorningNwws, date, -5, None).unwrap();
        let ctx = Context::new(&mock, &stn, &window, None);

        assert_eq!(derive(&ctx, &[declines, five, six]).get(), Some(5));
        assert_eq!(derive(&ctx, &[six, five]).get(), Some(6));
        assert!(derive(&ctx, &[declines]).is_missing());
        assert!(derive::<i32>(&ctx, &[]).is_missing());
    }

    #[test]
    fn test_whole_fahrenheit() {
        assert_eq!(whole_fahrenheit(0.0), 32);
        assert_eq!(whole_fahrenheit(-40.0), -40);
        assert_eq!(whole_fahrenheit(21.7), 71);
        assert_eq!(whole_fahrenheit(37.0), 99);
    }
}
