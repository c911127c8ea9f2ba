/*! Global settings shared by every report a site produces. */

use crate::{period::Cadence, ClimoResult};
use chrono::{Duration, NaiveTime, Timelike};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path};

/// Site wide settings for climate report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateGlobal {
    pub office_name: String,
    pub time_zone: String,

    /// Use `valid_im` for intermediate reports rather than the local hour of the run.
    pub use_valid_im: bool,
    /// Use `valid_pm` for evening reports rather than the local hour of the run.
    pub use_valid_pm: bool,
    /// Local valid time of intermediate reports.
    pub valid_im: NaiveTime,
    /// Local valid time of evening reports.
    pub valid_pm: NaiveTime,

    pub thresholds: Thresholds,
}

/// User defined thresholds for the "number of days with" counts in period reports.
///
/// Unset thresholds leave their counts missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Maximum temperature at or above, °F.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t1: Option<i32>,
    /// Maximum temperature at or above, °F.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t2: Option<i32>,
    /// Maximum temperature at or below, °F.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t3: Option<i32>,
    /// Minimum temperature at or above, °F.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t4: Option<i32>,
    /// Minimum temperature at or below, °F.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t5: Option<i32>,
    /// Minimum temperature at or below, °F.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t6: Option<i32>,
    /// Precipitation at or above, inches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p1: Option<f64>,
    /// Precipitation at or above, inches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2: Option<f64>,
    /// Snowfall at or above, inches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s1: Option<f64>,
}

impl Default for ClimateGlobal {
    fn default() -> Self {
        ClimateGlobal {
            office_name: String::new(),
            time_zone: String::new(),
            use_valid_im: true,
            use_valid_pm: true,
            valid_im: NaiveTime::MIN + Duration::hours(9),
            valid_pm: NaiveTime::MIN + Duration::hours(17),
            thresholds: Thresholds::default(),
        }
    }
}

impl ClimateGlobal {
    /**
     * Load the global settings from a TOML file.
     *
     * If the file does not exist, the defaults are returned and an attempt is made to save them
     * at `path` so the next run finds a file to edit.
     */
    pub fn load<P: AsRef<Path>>(path: P) -> ClimoResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(text) => {
                let globals: ClimateGlobal = toml::from_str(&text)?;
                Ok(globals)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "No global settings at {}, saving and using defaults.",
                    path.display()
                );
                let globals = ClimateGlobal::default();
                if let Err(err) = globals.save(path) {
                    warn!("Unable to save default settings: {}", err);
                }
                Ok(globals)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write these settings to a TOML file, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ClimoResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /**
     * The local hour an evening or intermediate report is valid for.
     *
     * #Arguments
     * * cadence - the report cadence.
     * * local_now - the local time the run started, used when the configured time is disabled.
     *
     * #Returns
     * `None` for cadences that have no configurable valid time.
     */
    pub fn valid_hour(&self, cadence: Cadence, local_now: NaiveTime) -> Option<u32> {
        match cadence {
            Cadence::Evening if self.use_valid_pm => Some(self.valid_pm.hour()),
            Cadence::Intermediate if self.use_valid_im => Some(self.valid_im.hour()),
            Cadence::Evening | Cadence::Intermediate => Some(local_now.hour()),
            _ => None,
        }
    }
}
