/*!
 * Time windows observations are gathered over.
 *
 * Daily windows are computed in UTC from the station's standard time offset. Period windows
 * cover whole calendar days and are not shifted.
 */

use crate::{
    climate_time::{days_in_month, shift_days, ymd},
    error::ConfigError,
    period::{Cadence, PeriodType},
    ClimoResult,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::warn;

/// The span of time, in UTC, a report is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationWindow {
    pub period_type: PeriodType,
    /// Station offset from UTC in hours the window was computed with.
    pub utc_offset: i32,
    /// First instant of the window.
    pub begin: NaiveDateTime,
    /// Last instant of the window.
    pub end: NaiveDateTime,
}

impl ObservationWindow {
    /// The local calendar date the window reports on.
    pub fn valid_date(&self) -> NaiveDate {
        (self.begin + Duration::hours(i64::from(self.utc_offset))).date()
    }

    /// Number of whole hours spanned by the window, counting both end hours.
    pub fn hour_count(&self) -> i64 {
        let begin = floor_hour(self.begin);
        let end = floor_hour(self.end);
        (end - begin).num_hours() + 1
    }

    /// The top of every hour in the window, oldest first.
    pub fn hours(&self) -> impl Iterator<Item = NaiveDateTime> {
        let first = floor_hour(self.begin);
        (0..self.hour_count()).map(move |i| first + Duration::hours(i))
    }

    /// Is this a morning report window covering the whole local day?
    pub fn is_morning(&self) -> bool {
        self.period_type.cadence() == Cadence::Morning
    }

    /// Split the window into whole 6 hour synoptic buckets and leading/trailing partial spans.
    ///
    /// A begin time within 15 minutes of the next hour is moved to that hour. When
    /// `advance_end` is set the end time gets the same treatment.
    pub fn six_hour_alignment(&self, advance_end: bool) -> SixHourAlignment {
        let begin = round_up_late_minutes(self.begin);
        let end = if advance_end {
            round_up_late_minutes(self.end)
        } else {
            floor_hour(self.end)
        };

        let begin_offset = match begin.hour() % 6 {
            0 => 0,
            rem => i64::from(6 - rem),
        };
        let end_offset = i64::from(end.hour() % 6);

        let aligned_begin = begin + Duration::hours(begin_offset);
        let aligned_end = end - Duration::hours(end_offset);

        if aligned_begin > aligned_end {
            // The whole window sits inside a single synoptic bucket.
            return SixHourAlignment {
                aligned_begin: end,
                aligned_end: end,
                begin_offset: (end - begin).num_hours(),
                end_offset: 0,
            };
        }

        SixHourAlignment {
            aligned_begin,
            aligned_end,
            begin_offset,
            end_offset,
        }
    }
}

/// A window split on 6 hour synoptic boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SixHourAlignment {
    /// First synoptic hour at or after the window begin.
    pub aligned_begin: NaiveDateTime,
    /// Last synoptic hour at or before the window end.
    pub aligned_end: NaiveDateTime,
    /// Hours between the window begin and `aligned_begin`.
    pub begin_offset: i64,
    /// Hours between `aligned_end` and the window end.
    pub end_offset: i64,
}

impl SixHourAlignment {
    pub fn bucket_count(&self) -> i64 {
        ((self.aligned_end - self.aligned_begin).num_hours() / 6).max(0)
    }

    /// End times of the whole 6 hour buckets, oldest first.
    pub fn bucket_ends(&self) -> impl Iterator<Item = NaiveDateTime> {
        let first = self.aligned_begin;
        (1..=self.bucket_count()).map(move |i| first + Duration::hours(6 * i))
    }

    /// The leading partial span as (begin, end), if there is one.
    pub fn leading_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if self.begin_offset > 0 {
            Some((
                self.aligned_begin - Duration::hours(self.begin_offset),
                self.aligned_begin,
            ))
        } else {
            None
        }
    }

    /// The trailing partial span as (begin, end), if there is one.
    pub fn trailing_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if self.end_offset > 0 {
            Some((
                self.aligned_end,
                self.aligned_end + Duration::hours(self.end_offset),
            ))
        } else {
            None
        }
    }
}

/**
 * Compute the observation window for a period type and date.
 *
 * #Arguments
 * * period_type - the report being built.
 * * date - the local date the report is valid for. For period reports any date inside the
 *   period.
 * * utc_offset - station standard time offset from UTC in hours.
 * * valid_hour - the local hour evening and intermediate reports are valid at.
 *
 * #Returns
 * Morning windows run from local midnight to 23:59 local. Evening and intermediate windows run
 * from local midnight to the valid hour. Period windows cover the calendar month, season, or
 * year containing `date`.
 */
pub fn resolve_window(
    period_type: PeriodType,
    date: NaiveDate,
    utc_offset: i32,
    valid_hour: Option<u32>,
) -> ClimoResult<ObservationWindow> {
    let (begin, end) = match period_type.cadence() {
        Cadence::Morning => {
            let begin = local_midnight_in_utc(date, utc_offset);
            (begin, begin + Duration::hours(23) + Duration::minutes(59))
        }
        Cadence::Evening | Cadence::Intermediate => {
            let hour = valid_hour.ok_or(ConfigError {
                msg: "evening and intermediate reports need a valid hour",
            })?;
            if hour > 24 {
                return Err(Box::new(ConfigError {
                    msg: "valid hour out of range",
                }));
            }
            let begin = local_midnight_in_utc(date, utc_offset);
            (begin, begin + Duration::hours(i64::from(hour)))
        }
        Cadence::Monthly | Cadence::Seasonal | Cadence::Annual => {
            let (first, last) = calendar_period(period_type.cadence(), date)?;
            (
                first.and_time(NaiveTime::MIN),
                last.and_time(NaiveTime::MIN) + Duration::hours(23) + Duration::minutes(59),
            )
        }
        Cadence::Other => {
            return Err(Box::new(ConfigError {
                msg: "no observation window for the \"other\" period type",
            }))
        }
    };

    Ok(ObservationWindow {
        period_type,
        utc_offset,
        begin,
        end,
    })
}

/// The first and last day of the calendar month, season, or year containing `date`.
pub fn calendar_period(cadence: Cadence, date: NaiveDate) -> ClimoResult<(NaiveDate, NaiveDate)> {
    let year = date.year();

    let range = match cadence {
        Cadence::Monthly => {
            let last = days_in_month(year, date.month());
            (ymd(year, date.month(), 1), ymd(year, date.month(), last))
        }
        Cadence::Seasonal => {
            let start_month = season_start_month(date.month());
            let start_year = if date.month() >= start_month {
                year
            } else {
                year - 1
            };
            let (end_year, end_month) = add_months(start_year, start_month, 2);
            (
                ymd(start_year, start_month, 1),
                ymd(end_year, end_month, days_in_month(end_year, end_month)),
            )
        }
        Cadence::Annual => (ymd(year, 1, 1), ymd(year, 12, 31)),
        _ => {
            return Err(Box::new(ConfigError {
                msg: "not a calendar period cadence",
            }))
        }
    };

    match range {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err("invalid calendar period".into()),
    }
}

/// First month of the meteorological season containing `month`.
///
/// Winter starts in December and crosses the year boundary.
pub fn season_start_month(month: u32) -> u32 {
    match month {
        12 | 1 | 2 => 12,
        3..=5 => 3,
        6..=8 => 6,
        _ => 9,
    }
}

/**
 * The period an unattended period run reports on.
 *
 * Monthly runs report on the prior calendar month, seasonal runs on the season that contained
 * the date three months ago, and annual runs on the prior calendar year.
 */
pub fn automatic_period_dates(
    period_type: PeriodType,
    today: NaiveDate,
) -> ClimoResult<(NaiveDate, NaiveDate)> {
    let cadence = period_type.cadence();
    let (year, month) = match cadence {
        Cadence::Monthly => add_months(today.year(), today.month(), -1),
        Cadence::Seasonal => add_months(today.year(), today.month(), -3),
        Cadence::Annual => (today.year() - 1, 1),
        _ => {
            return Err(Box::new(ConfigError {
                msg: "automatic dates are only defined for monthly, seasonal, and annual reports",
            }))
        }
    };

    let anchor = ymd(year, month, 1).ok_or("invalid anchor date")?;
    calendar_period(cadence, anchor)
}

/**
 * The valid date of an unattended daily run.
 *
 * The station with the smallest UTC offset is the last to reach local midnight. Its local date
 * at execution time is "today" for every station. Morning reports describe the day that just
 * ended, so they step back one day via the Julian day number.
 *
 * #Arguments
 * * cadence - daily cadence of the run.
 * * now_utc - execution time.
 * * offsets - UTC offsets of all stations in the run.
 */
pub fn infer_valid_date(
    cadence: Cadence,
    now_utc: NaiveDateTime,
    offsets: &[i32],
) -> ClimoResult<NaiveDate> {
    let min_offset = offsets.iter().copied().min().unwrap_or(0);
    let local_today = (now_utc + Duration::hours(i64::from(min_offset))).date();

    match cadence {
        Cadence::Morning => Ok(shift_days(local_today, -1).ok_or("date out of range")?),
        Cadence::Evening | Cadence::Intermediate => Ok(local_today),
        _ => Err(Box::new(ConfigError {
            msg: "only daily reports infer a valid date",
        })),
    }
}

/**
 * Use a requested date if it is a real calendar date, otherwise infer one.
 *
 * Day or month fields out of range mean the date was not specified.
 */
pub fn requested_or_inferred(
    requested: Option<(i32, u32, u32)>,
    cadence: Cadence,
    now_utc: NaiveDateTime,
    offsets: &[i32],
) -> ClimoResult<NaiveDate> {
    if let Some((year, month, day)) = requested {
        match ymd(year, month, day) {
            Some(date) => return Ok(date),
            None => warn!(
                "Requested date {:04}-{:02}-{:02} is not valid, inferring the date.",
                year, month, day
            ),
        }
    }

    infer_valid_date(cadence, now_utc, offsets)
}

fn local_midnight_in_utc(date: NaiveDate, utc_offset: i32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) - Duration::hours(i64::from(utc_offset))
}

pub(crate) fn floor_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(time.hour()))
}

pub(crate) fn round_up_late_minutes(time: NaiveDateTime) -> NaiveDateTime {
    let floored = floor_hour(time);
    if time.minute() > 44 {
        floored + Duration::hours(1)
    } else {
        floored
    }
}

fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_morning_window_negative_offset() {
        let w = resolve_window(PeriodType::MorningNwws, date(2023, 12, 31), -5, None).unwrap();
        assert_eq!(w.begin, at(2023, 12, 31, 5, 0));
        assert_eq!(w.end, at(2024, 1, 1, 4, 59));
        assert_eq!(w.valid_date(), date(2023, 12, 31));
        assert_eq!(w.hour_count(), 24);
    }

    #[test]
    fn test_morning_window_positive_offset() {
        let w = resolve_window(PeriodType::MorningRadio, date(2024, 3, 1), 10, None).unwrap();
        assert_eq!(w.begin, at(2024, 2, 29, 14, 0));
        assert_eq!(w.end, at(2024, 3, 1, 13, 59));
    }

    #[test]
    fn test_morning_window_zero_offset() {
        let w = resolve_window(PeriodType::MorningRadio, date(2024, 3, 1), 0, None).unwrap();
        assert_eq!(w.begin, at(2024, 3, 1, 0, 0));
        assert_eq!(w.end, at(2024, 3, 1, 23, 59));
    }

    #[test]
    fn test_evening_window_crosses_midnight() {
        let w = resolve_window(PeriodType::EveningNwws, date(2024, 1, 31), -8, Some(17)).unwrap();
        assert_eq!(w.begin, at(2024, 1, 31, 8, 0));
        assert_eq!(w.end, at(2024, 2, 1, 1, 0));

        let w = resolve_window(PeriodType::IntermediateRadio, date(2024, 1, 1), 9, Some(9))
            .unwrap();
        assert_eq!(w.begin, at(2023, 12, 31, 15, 0));
        assert_eq!(w.end, at(2024, 1, 1, 0, 0));

        assert!(resolve_window(PeriodType::EveningNwws, date(2024, 1, 1), -8, None).is_err());
    }

    #[test]
    fn test_window_resolution_is_idempotent_and_in_range() {
        use strum::IntoEnumIterator;

        for pt in PeriodType::iter().filter(|pt| *pt != PeriodType::Other) {
            for offset in -12..=14 {
                let d = date(2024, 12, 31);
                let a = resolve_window(pt, d, offset, Some(17)).unwrap();
                let b = resolve_window(pt, d, offset, Some(17)).unwrap();
                assert_eq!(a, b);
                assert!(a.begin.hour() < 24 && a.end.hour() < 24);
                assert!(a.begin < a.end);
            }
        }

        assert!(resolve_window(PeriodType::Other, date(2024, 1, 1), 0, None).is_err());
    }

    #[test]
    fn test_period_windows() {
        let w = resolve_window(PeriodType::MonthlyNwws, date(2024, 2, 10), -5, None).unwrap();
        assert_eq!(w.begin, at(2024, 2, 1, 0, 0));
        assert_eq!(w.end, at(2024, 2, 29, 23, 59));

        let w = resolve_window(PeriodType::SeasonalRadio, date(2024, 1, 10), -5, None).unwrap();
        assert_eq!(w.begin, at(2023, 12, 1, 0, 0));
        assert_eq!(w.end, at(2024, 2, 29, 23, 59));

        let w = resolve_window(PeriodType::AnnualNwws, date(2023, 6, 10), -5, None).unwrap();
        assert_eq!(w.begin, at(2023, 1, 1, 0, 0));
        assert_eq!(w.end, at(2023, 12, 31, 23, 59));
    }

    #[test]
    fn test_hour_rounding() {
        let odd = date(2024, 1, 10).and_hms_opt(10, 37, 15).unwrap();
        assert_eq!(floor_hour(odd), at(2024, 1, 10, 10, 0));
        assert_eq!(round_up_late_minutes(odd), at(2024, 1, 10, 10, 0));
        assert_eq!(round_up_late_minutes(at(2024, 1, 10, 23, 45)), at(2024, 1, 11, 0, 0));
        assert_eq!(local_midnight_in_utc(date(2024, 1, 10), -5), at(2024, 1, 10, 5, 0));
    }

    #[test]
    fn test_automatic_period_dates() {
        assert_eq!(
            automatic_period_dates(PeriodType::MonthlyRadio, date(2024, 1, 1)).unwrap(),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
        assert_eq!(
            automatic_period_dates(PeriodType::MonthlyRadio, date(2024, 3, 15)).unwrap(),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            automatic_period_dates(PeriodType::SeasonalNwws, date(2024, 3, 5)).unwrap(),
            (date(2023, 12, 1), date(2024, 2, 29))
        );
        assert_eq!(
            automatic_period_dates(PeriodType::SeasonalNwws, date(2024, 9, 1)).unwrap(),
            (date(2024, 6, 1), date(2024, 8, 31))
        );
        assert_eq!(
            automatic_period_dates(PeriodType::AnnualRadio, date(2024, 1, 2)).unwrap(),
            (date(2023, 1, 1), date(2023, 12, 31))
        );
        assert!(automatic_period_dates(PeriodType::Other, date(2024, 1, 2)).is_err());
        assert!(automatic_period_dates(PeriodType::MorningNwws, date(2024, 1, 2)).is_err());
    }

    #[test]
    fn test_infer_valid_date() {
        // 09:00 local at a UTC-5 station
        let now = at(2024, 3, 1, 14, 0);
        assert_eq!(
            infer_valid_date(Cadence::Morning, now, &[-5]).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            infer_valid_date(Cadence::Evening, now, &[-5]).unwrap(),
            date(2024, 3, 1)
        );

        // Just after midnight Eastern but still the previous day in the Pacific.
        let now = at(2024, 1, 1, 5, 30);
        assert_eq!(
            infer_valid_date(Cadence::Morning, now, &[-5, -8]).unwrap(),
            date(2023, 12, 30)
        );
        assert!(infer_valid_date(Cadence::Monthly, now, &[-5]).is_err());
    }

    #[test]
    fn test_invalid_requested_date_falls_back() {
        let now = at(2024, 3, 1, 14, 0);
        assert_eq!(
            requested_or_inferred(Some((2023, 2, 30)), Cadence::Morning, now, &[-5]).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            requested_or_inferred(Some((2023, 13, 1)), Cadence::Morning, now, &[-5]).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            requested_or_inferred(Some((2023, 7, 4)), Cadence::Morning, now, &[-5]).unwrap(),
            date(2023, 7, 4)
        );
    }

    #[test]
    fn test_six_hour_alignment_morning() {
        let w = resolve_window(PeriodType::MorningNwws, date(2024, 1, 10), -5, None).unwrap();

        let temp = w.six_hour_alignment(false);
        assert_eq!(temp.begin_offset, 1);
        assert_eq!(temp.end_offset, 4);
        assert_eq!(temp.aligned_begin, at(2024, 1, 10, 6, 0));
        assert_eq!(temp.aligned_end, at(2024, 1, 11, 0, 0));
        assert_eq!(temp.bucket_count(), 3);
        let ends: Vec<_> = temp.bucket_ends().collect();
        assert_eq!(
            ends,
            vec![
                at(2024, 1, 10, 12, 0),
                at(2024, 1, 10, 18, 0),
                at(2024, 1, 11, 0, 0)
            ]
        );
        assert_eq!(
            temp.leading_span(),
            Some((at(2024, 1, 10, 5, 0), at(2024, 1, 10, 6, 0)))
        );
        assert_eq!(
            temp.trailing_span(),
            Some((at(2024, 1, 11, 0, 0), at(2024, 1, 11, 4, 0)))
        );

        let precip = w.six_hour_alignment(true);
        assert_eq!(precip.end_offset, 5);
        assert_eq!(precip.aligned_end, at(2024, 1, 11, 0, 0));
    }

    #[test]
    fn test_six_hour_alignment_inside_one_bucket() {
        let w = ObservationWindow {
            period_type: PeriodType::IntermediateNwws,
            utc_offset: 0,
            begin: at(2024, 1, 10, 1, 0),
            end: at(2024, 1, 10, 4, 0),
        };
        let a = w.six_hour_alignment(false);
        assert_eq!(a.bucket_count(), 0);
        assert_eq!(a.begin_offset, 3);
        assert_eq!(a.trailing_span(), None);
        assert_eq!(
            a.leading_span(),
            Some((at(2024, 1, 10, 1, 0), at(2024, 1, 10, 4, 0)))
        );
    }
}
