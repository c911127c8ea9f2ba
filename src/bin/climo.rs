use chrono::{NaiveDate, Utc};
use clap::Parser;
use climo::{
    Amount, ClimateDatabase, ClimateGlobal, ClimateReport, ClimoResult, DailyClimateRecord,
    Derived, Orchestrator, PeriodClimateRecord, PeriodType, RunMode, SolarCalculator, Station,
    StationDirectory,
};
use log::LevelFilter;
use rustc_hash::FxHashMap as HashMap;
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    path::PathBuf,
};

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Build daily or period climate summaries.
///
/// Builds the climate summary of every station in the database for a report type. Unattended runs
/// infer the dates from the current time. Daily records are archived so later period reports can
/// be built from them.
///
#[derive(Debug, Parser)]
#[clap(name = "climo")]
#[clap(author, version, about)]
struct ClimoOptionsInit {
    /// The path to the database file.
    ///
    /// If this is not specified, then the program will check for it in the "CLIMO_DB"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "CLIMO_DB")]
    db: PathBuf,

    /// The path to the TOML file with office wide settings.
    ///
    /// It is created with default settings if it does not exist. Without it the defaults are
    /// used.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// The report to build, e.g. morning-nwws, evening-radio, monthly-nwws, or other.
    period: PeriodType,

    /// The date of a daily report in the format YYYY-MM-DD.
    ///
    /// A day that does not exist, e.g. 2023-02-30, falls back to the date an unattended run
    /// would use.
    #[clap(long, conflicts_with_all = &["begin", "end", "most-recent"])]
    #[clap(parse(try_from_str=parse_ymd))]
    date: Option<(i32, u32, u32)>,

    /// The first day of a period report in the format YYYY-MM-DD.
    #[clap(long, requires = "end")]
    begin: Option<NaiveDate>,

    /// The last day of a period report in the format YYYY-MM-DD.
    #[clap(long, requires = "begin")]
    end: Option<NaiveDate>,

    /// Build the most recent report as an unattended run would, but started by hand.
    #[clap(long)]
    most_recent: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct ClimoOptionsChecked {
    /// The path to the database file.
    db: PathBuf,

    /// Office wide settings.
    globals: ClimateGlobal,

    /// Where the settings came from.
    config: Option<PathBuf>,

    /// The report to build.
    period: PeriodType,

    /// How the dates are chosen.
    mode: RunMode,

    /// Verbose output
    verbose: bool,
}

impl Display for ClimoOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "    Database: {}", self.db.display())?;
        match self.config {
            Some(ref path) => writeln!(f, "      Config: {}", path.display())?,
            None => writeln!(f, "      Config: defaults")?,
        }
        writeln!(f, "      Office: {}", self.globals.office_name)?;
        writeln!(f, "      Report: {}", self.period)?;
        writeln!(f, "        Mode: {}", self.mode)?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Parse a YYYY-MM-DD argument without checking that the day exists.
fn parse_ymd(ymd_str: &str) -> Result<(i32, u32, u32), String> {
    let fields: Vec<_> = ymd_str.split('-').collect();
    if fields.len() != 3 {
        return Err(format!("expected YYYY-MM-DD, got {}", ymd_str));
    }

    let bad = |_| format!("invalid date {}", ymd_str);
    let year = fields[0].parse().map_err(bad)?;
    let month = fields[1].parse().map_err(bad)?;
    let day = fields[2].parse().map_err(bad)?;

    Ok((year, month, day))
}

/// Get the command line arguments and check them.
///
/// If there is missing data, try to fill it in with environment variables.
fn parse_args() -> ClimoResult<ClimoOptionsChecked> {
    let ClimoOptionsInit {
        db,
        config,
        period,
        date,
        begin,
        end,
        most_recent,
        verbose,
    } = ClimoOptionsInit::parse();

    let mode = match (date, begin, end) {
        (Some((year, month, day)), _, _) => RunMode::ManualDay { year, month, day },
        (None, Some(begin), Some(end)) => {
            if end < begin {
                return Err(format!("end ({}) is before begin ({})", end, begin).into());
            }
            RunMode::ManualExplicit { begin, end }
        }
        _ if most_recent => RunMode::ManualMostRecent,
        _ => RunMode::Automatic,
    };

    let globals = match config {
        Some(ref path) => ClimateGlobal::load(path)?,
        None => ClimateGlobal::default(),
    };

    let checked = ClimoOptionsChecked {
        db,
        globals,
        config,
        period,
        mode,
        verbose,
    };

    if verbose {
        println!("{}", checked);
    }

    Ok(checked)
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> ClimoResult<()> {
    let opts = parse_args()?;

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("climo", level)
        .init()?;

    let db = ClimateDatabase::connect(&opts.db)?;
    let sun = SolarCalculator::default();

    let report = Orchestrator::new(&db, &sun, &opts.globals).run(
        opts.period,
        opts.mode,
        Utc::now().naive_utc(),
    )?;

    let stations: HashMap<i32, Station> = db
        .stations()?
        .into_iter()
        .map(|stn| (stn.id, stn))
        .collect();

    print_report(&report, &stations);

    for (id, record) in &report.daily {
        db.store_daily(*id, &[record.to_stored()])?;
    }

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
 *                                           Output
 *-----------------------------------------------------------------------------------------------*/
fn print_report(report: &ClimateReport, stations: &HashMap<i32, Station>) {
    println!(
        "{} from {} to {}\n",
        report.period_type, report.begin, report.end
    );

    let mut ids: Vec<i32> = report
        .daily
        .keys()
        .chain(report.period.keys())
        .copied()
        .collect();
    ids.sort_unstable();

    for id in ids {
        let icao = stations.get(&id).map(|s| s.icao.as_str()).unwrap_or("????");

        if let Some(rec) = report.daily.get(&id) {
            print_daily(icao, rec);
        }
        if let Some(rec) = report.period.get(&id) {
            print_period(icao, rec);
        }
    }
}

fn print_daily(icao: &str, rec: &DailyClimateRecord) {
    println!(
        "{:>5} max {:>4} min {:>4} pcp {:>6} snow {:>5} depth {:>4} hdd {:>3} cdd {:>3} wx {:>2}",
        icao,
        derived(&rec.max_temp),
        derived(&rec.min_temp),
        amount(rec.precip.amount_or_missing()),
        amount(rec.snowfall.amount_or_missing()),
        amount(rec.snow_depth.amount_or_missing()),
        derived(&rec.heating_degree_days),
        derived(&rec.cooling_degree_days),
        rec.weather_count()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "M".to_owned()),
    );
}

fn print_period(icao: &str, rec: &PeriodClimateRecord) {
    let s = &rec.summary;
    let opt = |v: Option<i32>| v.map(|v| v.to_string()).unwrap_or_else(|| "M".to_owned());

    println!(
        "{:>5} days {:>3} max {:>4} min {:>4} pcp {:>6} snow {:>5} hdd {:>5} cdd {:>5}",
        icao,
        s.days,
        opt(s.max_temp),
        opt(s.min_temp),
        amount(s.precip),
        amount(s.snowfall),
        opt(s.heating_degree_days),
        opt(s.cooling_degree_days),
    );
}

fn derived(val: &Derived<i32>) -> String {
    val.get()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "M".to_owned())
}

fn amount(val: Amount) -> String {
    match val {
        Amount::Missing => "M".to_owned(),
        Amount::Trace => "T".to_owned(),
        Amount::Value(v) => format!("{:.2}", v),
    }
}
