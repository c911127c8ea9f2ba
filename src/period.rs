/*! Report cadences and the period types a run can be asked for. */

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A report cadence crossed with the distribution channel it is produced for.
///
/// The numeric codes match the ones used in archived report records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PeriodType {
    /// A user defined range of days, the climatological "other" period.
    Other,
    MorningRadio,
    EveningRadio,
    MorningNwws,
    EveningNwws,
    MonthlyRadio,
    MonthlyNwws,
    SeasonalRadio,
    SeasonalNwws,
    AnnualRadio,
    IntermediateRadio,
    IntermediateNwws,
    AnnualNwws,
}

/// How often a report is issued, independent of how it is distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    Morning,
    Evening,
    Intermediate,
    Monthly,
    Seasonal,
    Annual,
    Other,
}

/// The channel a report is formatted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// NOAA Weather Radio.
    Radio,
    /// NOAA Weather Wire Service text products.
    Nwws,
}

impl PeriodType {
    /// The numeric code of this period type.
    pub fn code(&self) -> i32 {
        use PeriodType::*;

        match self {
            Other => 0,
            MorningRadio => 1,
            EveningRadio => 2,
            MorningNwws => 3,
            EveningNwws => 4,
            MonthlyRadio => 5,
            MonthlyNwws => 6,
            SeasonalRadio => 7,
            SeasonalNwws => 8,
            AnnualRadio => 9,
            IntermediateRadio => 10,
            IntermediateNwws => 11,
            AnnualNwws => 12,
        }
    }

    /// Look up a period type by its numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        use strum::IntoEnumIterator;

        PeriodType::iter().find(|pt| pt.code() == code)
    }

    pub fn cadence(&self) -> Cadence {
        use PeriodType::*;

        match self {
            MorningRadio | MorningNwws => Cadence::Morning,
            EveningRadio | EveningNwws => Cadence::Evening,
            IntermediateRadio | IntermediateNwws => Cadence::Intermediate,
            MonthlyRadio | MonthlyNwws => Cadence::Monthly,
            SeasonalRadio | SeasonalNwws => Cadence::Seasonal,
            AnnualRadio | AnnualNwws => Cadence::Annual,
            Other => Cadence::Other,
        }
    }

    pub fn distribution(&self) -> Option<Distribution> {
        use PeriodType::*;

        match self {
            MorningRadio | EveningRadio | IntermediateRadio | MonthlyRadio | SeasonalRadio
            | AnnualRadio => Some(Distribution::Radio),
            MorningNwws | EveningNwws | IntermediateNwws | MonthlyNwws | SeasonalNwws
            | AnnualNwws => Some(Distribution::Nwws),
            Other => None,
        }
    }

    /// Daily reports are built from a single observation window; everything else spans days.
    pub fn is_daily(&self) -> bool {
        self.cadence().is_daily()
    }

    /// The short name used in product identifiers.
    pub fn short_name(&self) -> &'static str {
        match self.cadence() {
            Cadence::Morning => "am",
            Cadence::Evening => "pm",
            Cadence::Intermediate => "im",
            Cadence::Monthly => "mon",
            Cadence::Seasonal => "sea",
            Cadence::Annual => "ann",
            Cadence::Other => "other",
        }
    }
}

impl Cadence {
    pub fn is_daily(&self) -> bool {
        matches!(
            self,
            Cadence::Morning | Cadence::Evening | Cadence::Intermediate
        )
    }
}
