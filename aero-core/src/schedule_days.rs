use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// ISO weekday number of a date: Monday = 1 .. Sunday = 7.
pub fn iso_weekday(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// The set of weekdays a schedule operates on.
///
/// Persisted and serialized as a comma-joined list such as `"1,3,5"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DaysOfWeek(BTreeSet<u8>);

impl DaysOfWeek {
    pub fn every_day() -> Self {
        Self((1..=7).collect())
    }

    pub fn parse(raw: &str) -> CoreResult<Self> {
        let mut days = BTreeSet::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day: u8 = part.parse().map_err(|_| {
                CoreError::ValidationError(format!("invalid day of week '{}'", part))
            })?;
            if !(1..=7).contains(&day) {
                return Err(CoreError::ValidationError(format!(
                    "day of week must be between 1 and 7, got {}",
                    day
                )));
            }
            days.insert(day);
        }
        if days.is_empty() {
            return Err(CoreError::ValidationError(
                "days_of_week must name at least one day".to_string(),
            ));
        }
        Ok(Self(days))
    }

    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    pub fn runs_on(&self, date: NaiveDate) -> bool {
        self.contains(iso_weekday(date))
    }

    pub fn days(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl Default for DaysOfWeek {
    fn default() -> Self {
        Self::every_day()
    }
}

impl fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.0.iter().map(u8::to_string).collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

impl FromStr for DaysOfWeek {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DaysOfWeek {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DaysOfWeek> for String {
    fn from(days: DaysOfWeek) -> Self {
        days.to_string()
    }
}
