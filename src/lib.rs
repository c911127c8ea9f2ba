pub use config::{ClimateGlobal, Thresholds};
pub use daily::{build_daily_record, degree_days, DailyClimateRecord, DailyOptions, DEGREE_DAY_BASE};
pub use database::{ClimateDatabase, ReportRow, WindKind};
pub use error::{ClimoResult, ConfigError, QueryError};
pub use extract::{
    extract_humidity, extract_precip, extract_sky_cover, extract_snow, extract_sunshine,
    extract_temperature, extract_weather, extract_wind, resultant_wind, vapor_pressure, Context,
    Humidity, Snow, Sunshine, Temperatures, WeatherFlags, WeatherType, Winds,
};
pub use history::{
    accumulate_normals, accumulate_observed, last_year_date, last_year_end_day, last_year_range,
    prior_year_and_normals, update_accumulation, Accumulations, DailyIncrements,
    PriorYearAndNormals, Totals,
};
pub use period::{Cadence, Distribution, PeriodType};
pub use period_climate::{
    build_period_record, FreezeDates, PeriodClimateRecord, PeriodNormals, PeriodSummary,
};
pub use query::{
    ClimateArchive, ClimateSources, DailyElement, DailyNormals, DailySummary, Element, Extreme,
    FreezeNormals, Lookup, NormalsQuery, ObservationQuery, ReportSource, StationDirectory,
    StoredDay, SunCalculator, TempReading, WeatherGroup, Wind, WindReport,
};
pub use run::{ClimateReport, Orchestrator, RunMode};
pub use season::{Boundary, SeasonYearBoundaries};
pub use station::Station;
pub use sun::SolarCalculator;
pub use value::{Amount, Derived, PrecipSources, Provenance, MISSING_CODE};
pub use window::{
    automatic_period_dates, calendar_period, infer_valid_date, requested_or_inferred,
    resolve_window, ObservationWindow, SixHourAlignment,
};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod climate_time;
mod config;
mod daily;
mod database;
mod error;
mod extract;
mod history;
mod period;
mod period_climate;
mod query;
mod run;
mod season;
mod station;
mod sun;
mod value;
mod window;

#[cfg(test)]
mod mock;
