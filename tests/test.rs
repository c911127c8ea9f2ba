use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use climo::{
    Amount, ClimateDatabase, ClimateGlobal, DailySummary, Element, Orchestrator, PeriodType,
    Provenance, ReportRow, ReportSource, RunMode, SolarCalculator, Station, Wind,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

fn philadelphia() -> Station {
    Station {
        id: 11,
        icao: "KPHL".to_owned(),
        name: "Philadelphia".to_owned(),
        lat: 39.87,
        lon: -75.23,
        utc_offset: -5,
        std_all_year: false,
    }
}

fn database() -> ClimateDatabase {
    let db = ClimateDatabase::in_memory().unwrap();
    db.add_station(&philadelphia()).unwrap();
    db
}

/*-------------------------------------------------------------------------------------------------
 *                                    End to end scenarios
 *-----------------------------------------------------------------------------------------------*/
#[test]
fn test_unattended_morning_report_with_no_data() {
    let db = database();
    let globals = ClimateGlobal::default();
    let sun = SolarCalculator::default();

    // 09:00 EST on January 10th.
    let report = Orchestrator::new(&db, &sun, &globals)
        .run(PeriodType::MorningNwws, RunMode::Automatic, dt(2024, 1, 10, 14, 0))
        .unwrap();

    assert_eq!(report.begin, date(2024, 1, 9));
    assert_eq!(report.end, date(2024, 1, 9));

    let rec = &report.daily[&11];
    assert_eq!(rec.window.begin, dt(2024, 1, 9, 5, 0));
    assert_eq!(rec.window.end, dt(2024, 1, 10, 4, 59));

    assert!(rec.precip.is_missing());
    assert_eq!(rec.precip.provenance(), Provenance::Missing);
    assert!(rec.max_temp.is_missing());
    assert_eq!(rec.zone_label, "EST");

    // Morning reports carry the sunrise of the day the report is issued.
    let rise = rec.sunrise.unwrap();
    assert!(rise > NaiveTime::from_hms_opt(7, 0, 0).unwrap());
    assert!(rise < NaiveTime::from_hms_opt(7, 40, 0).unwrap());
}

#[test]
fn test_run_without_stations_fails() {
    let db = ClimateDatabase::in_memory().unwrap();
    let globals = ClimateGlobal::default();
    let sun = SolarCalculator::default();

    assert!(Orchestrator::new(&db, &sun, &globals)
        .run(PeriodType::MorningNwws, RunMode::Automatic, dt(2024, 1, 10, 14, 0))
        .is_err());
}

#[test]
fn test_hourly_reports_through_sqlite() {
    let db = database();
    let globals = ClimateGlobal::default();
    let sun = SolarCalculator::default();

    let report = |nominal: NaiveDateTime| ReportRow {
        source: ReportSource::Metar,
        nominal,
        observed: nominal - chrono::Duration::minutes(6),
        correction: None,
        origin: nominal + chrono::Duration::minutes(2),
    };

    // 24 hourly temperatures for the local day of January 9th, warmest at 20Z (15 EST).
    for hour in 0..24 {
        let nominal = dt(2024, 1, 9, 6, 0) + chrono::Duration::hours(hour);
        let celsius = 10.0 - (hour as f64 - 14.0).abs() * 0.5;
        db.add_report_value(11, Element::TempTenths, &report(nominal), celsius)
            .unwrap();
    }

    // Six hour precipitation groups for the whole buckets of the day.
    for (hour, inches) in [(12, 0.05), (18, 0.10), (24, 0.0)] {
        let nominal = dt(2024, 1, 9, 0, 0) + chrono::Duration::hours(hour);
        db.add_report_value(11, Element::Precip6Hour, &report(nominal), inches)
            .unwrap();
    }

    let run = Orchestrator::new(&db, &sun, &globals)
        .run(PeriodType::MorningNwws, RunMode::Automatic, dt(2024, 1, 10, 14, 0))
        .unwrap();
    let rec = &run.daily[&11];

    assert_eq!(rec.max_temp.get(), Some(50));
    assert_eq!(rec.max_temp.provenance(), Provenance::TempHourlyTenths);
    assert_eq!(rec.max_temp.time(), NaiveTime::from_hms_opt(14, 54, 0));

    match rec.precip.get() {
        Some(Amount::Value(total)) => assert!((total - 0.15).abs() < 1.0e-9),
        other => panic!("unexpected precipitation {:?}", other),
    }
    assert!(matches!(rec.precip.provenance(), Provenance::Precip(src) if src.six_hour));
}

#[test]
fn test_daily_summary_to_period_report() {
    let db = database();
    let globals = ClimateGlobal::default();
    let sun = SolarCalculator::default();

    let summary = DailySummary {
        max_temp: Some(41),
        min_temp: Some(25),
        precip: Amount::Value(0.12),
        snowfall: Amount::Value(1.5),
        snow_depth: Amount::Value(1.0),
        max_wind: Some(Wind {
            speed: 23.0,
            direction: 300.0,
        }),
        ..DailySummary::default()
    };
    db.add_daily_summary(11, date(2024, 1, 9), 24, &summary, dt(2024, 1, 10, 6, 0))
        .unwrap();

    let orch = Orchestrator::new(&db, &sun, &globals);
    let daily = orch
        .run(PeriodType::MorningNwws, RunMode::Automatic, dt(2024, 1, 10, 14, 0))
        .unwrap();

    let rec = &daily.daily[&11];
    assert_eq!(rec.max_temp.get(), Some(41));
    assert_eq!(rec.max_temp.provenance(), Provenance::DailySummary);
    assert_eq!(rec.precip.get(), Some(Amount::Value(0.12)));
    assert_eq!(rec.heating_degree_days.get(), Some(32));
    assert_eq!(rec.accumulations.precip.month, Amount::Value(0.12));

    db.store_daily(11, &[rec.to_stored()]).unwrap();

    let mode = RunMode::ManualExplicit {
        begin: date(2024, 1, 1),
        end: date(2024, 1, 31),
    };
    let period = orch
        .run(PeriodType::MonthlyNwws, mode, dt(2024, 2, 1, 14, 0))
        .unwrap();

    let rec = &period.period[&11];
    assert_eq!(rec.summary.days, 1);
    assert_eq!(rec.summary.max_temp, Some(41));
    assert_eq!(rec.summary.max_temp_dates, vec![date(2024, 1, 9)]);
    assert_eq!(rec.summary.precip, Amount::Value(0.12));
    assert_eq!(rec.summary.snowfall, Amount::Value(1.5));
    assert_eq!(rec.summary.heating_degree_days, Some(32));
    assert_eq!(rec.summary.days_min_le_32, 1);
    assert!(rec.last_year.is_none());
}
