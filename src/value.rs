/*!
 * Derived values and the provenance codes that say how they were derived.
 *
 * Archived climate data used magic numbers for missing and trace amounts. Here the distinction
 * lives in the type so a missing value can never be mistaken for a negative measurement.
 */

use chrono::NaiveTime;

/// Numeric code stored for a missing provenance.
pub const MISSING_CODE: i32 = -9999;

/// A precipitation, snowfall, or snow depth amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Missing,
    /// Too small to measure, distinct from zero.
    Trace,
    /// A measured amount in inches.
    Value(f64),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Missing
    }
}

impl Amount {
    /// Interpret a raw report value, where negative amounts encode a trace.
    pub fn from_report(val: f64) -> Self {
        if val < 0.0 {
            Amount::Trace
        } else {
            Amount::Value(val)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Amount::Missing)
    }

    pub fn is_trace(&self) -> bool {
        matches!(self, Amount::Trace)
    }

    /// A real amount strictly greater than zero.
    pub fn is_measurable(&self) -> bool {
        matches!(self, Amount::Value(v) if *v > 0.0)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Amount::Value(v) if *v == 0.0)
    }

    /// The measured amount, `None` for trace or missing.
    pub fn value(&self) -> Option<f64> {
        match self {
            Amount::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// The amount to use in sums and comparisons, a trace counts as zero.
    pub fn inches(&self) -> Option<f64> {
        match self {
            Amount::Value(v) => Some(*v),
            Amount::Trace => Some(0.0),
            Amount::Missing => None,
        }
    }

    /**
     * Add an observed increment to an accumulated amount.
     *
     * | accumulated | increment | result |
     * |---|---|---|
     * | missing | missing | 0 |
     * | any | missing | accumulated |
     * | missing | any | increment |
     * | trace or zero | trace | trace |
     * | trace or zero | real | increment |
     * | real > 0 | trace | accumulated |
     * | real | real | sum |
     *
     * The same rule applies whichever report granularity supplied the increment.
     */
    pub fn tally(self, increment: Amount) -> Amount {
        use Amount::*;

        match (self, increment) {
            (Missing, Missing) => Value(0.0),
            (acc, Missing) => acc,
            (Missing, inc) => inc,
            (Trace, Trace) => Trace,
            (Trace, Value(v)) => Value(v),
            (Value(a), Trace) if a == 0.0 => Trace,
            (Value(a), Trace) => Value(a),
            (Value(a), Value(v)) => Value(a + v),
        }
    }

    /// The larger of two amounts, a trace beats zero and anything beats missing.
    pub fn max(self, other: Amount) -> Amount {
        use Amount::*;

        match (self, other) {
            (Missing, x) | (x, Missing) => x,
            (Trace, Trace) => Trace,
            (Value(a), Trace) | (Trace, Value(a)) if a == 0.0 => Trace,
            (Value(a), Trace) | (Trace, Value(a)) => Value(a),
            (Value(a), Value(b)) => Value(a.max(b)),
        }
    }
}

/// Which precipitation report granularities contributed to a daily total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PrecipSources {
    pub six_hour: bool,
    pub three_hour: bool,
    pub one_hour: bool,
}

impl PrecipSources {
    pub fn any(&self) -> bool {
        self.six_hour || self.three_hour || self.one_hour
    }
}

/// How a derived value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Nothing could be derived.
    Missing,
    /// Entered or corrected by a person.
    ManualEntry,
    /// Taken from the station's daily summary message.
    DailySummary,

    /// 24 hour max/min temperature group.
    Temp24Hour,
    /// 6 hour max/min temperature group.
    Temp6Hour,
    /// Hourly or special reports with temperatures in tenths of a degree.
    TempHourlyTenths,
    /// Hourly or special reports with whole degree temperatures.
    TempHourlyWhole,

    /// Combination of 6, 3, and 1 hour precipitation groups.
    Precip(PrecipSources),

    /// Supplemental climatological data snowfall reports.
    SnowScd,
    /// Assumed zero from the day's other weather.
    Assumed,

    /// Snow depth group at a synoptic hour.
    DepthAtHour(u32),

    /// Special (non-routine) reports.
    WindSpeci,
    /// Hourly reports.
    WindHourly,
    /// Peak wind remarks.
    PeakWind,
    /// Hourly gust groups.
    Gust,
    /// Computed from several hourly values.
    Calculated,

    /// Sunshine duration group in a routine report.
    SunMetar,

    /// Present weather groups in hourly and special reports.
    WeatherObserved,
    /// Reports were available but no weather was reported.
    WeatherNoneReported,
    /// Daily summary weather supplemented by hourly and special reports.
    WeatherCombined,
}

impl Provenance {
    /// The numeric quality control code stored with archived records.
    pub fn qc_code(&self) -> i32 {
        use Provenance::*;

        match self {
            Missing => MISSING_CODE,
            ManualEntry => 0,
            DailySummary => 1,
            Temp24Hour => 2,
            Temp6Hour => 3,
            TempHourlyTenths => 4,
            TempHourlyWhole => 5,
            Precip(src) => match (src.six_hour, src.three_hour, src.one_hour) {
                (true, true, true) => 2,
                (true, true, false) => 3,
                (true, false, true) => 4,
                (false, true, true) => 5,
                (true, false, false) => 6,
                (false, true, false) => 7,
                (false, false, true) => 9,
                (false, false, false) => MISSING_CODE,
            },
            SnowScd => 2,
            Assumed => 3,
            DepthAtHour(0) => -1,
            DepthAtHour(hour) => *hour as i32,
            WindSpeci => 2,
            WindHourly => 3,
            PeakWind => 4,
            Gust => 5,
            Calculated => 2,
            SunMetar => 2,
            WeatherObserved => 2,
            WeatherNoneReported => 3,
            WeatherCombined => 4,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Provenance::Missing)
    }

    /// Pre-aggregated sources whose value should not be displaced by an equal hourly value.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Provenance::DailySummary | Provenance::Temp6Hour | Provenance::Temp24Hour
        )
    }
}

/// A derived quantity with its provenance and, for extremes, the time it occurred.
///
/// A value is present exactly when the provenance is not `Missing`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived<T> {
    value: Option<T>,
    time: Option<NaiveTime>,
    provenance: Provenance,
}

impl<T> Default for Derived<T> {
    fn default() -> Self {
        Derived::missing()
    }
}

impl<T> Derived<T> {
    pub fn missing() -> Self {
        Derived {
            value: None,
            time: None,
            provenance: Provenance::Missing,
        }
    }

    /// A derived value. Asking for provenance `Missing` yields a missing result.
    pub fn new(value: T, provenance: Provenance) -> Self {
        if provenance.is_missing() {
            return Derived::missing();
        }

        Derived {
            value: Some(value),
            time: None,
            provenance,
        }
    }

    /// Attach a time of occurrence.
    pub fn at(mut self, time: Option<NaiveTime>) -> Self {
        if self.value.is_some() {
            self.time = time;
        }
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Derived<U> {
        Derived {
            value: self.value.map(f),
            time: self.time,
            provenance: self.provenance,
        }
    }
}

impl<T: Copy> Derived<T> {
    pub fn get(&self) -> Option<T> {
        self.value
    }
}

impl Derived<Amount> {
    /// Wrap an amount, a missing amount always gets a missing provenance.
    pub fn amount(amount: Amount, provenance: Provenance) -> Self {
        if amount.is_missing() {
            Derived::missing()
        } else {
            Derived::new(amount, provenance)
        }
    }

    /// The amount itself, `Amount::Missing` when nothing was derived.
    pub fn amount_or_missing(&self) -> Amount {
        self.value.unwrap_or(Amount::Missing)
    }
}
