use chrono::NaiveDate;
use rusqlite::Connection;

use crate::http::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodName {
    First,
    Second,
}

impl PeriodName {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw.trim() {
            "first_period" => Ok(Self::First),
            "second_period" => Ok(Self::Second),
            other => Err(ApiError::validation(format!("unknown period: {other}"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first_period",
            Self::Second => "second_period",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    /// Closed on both ends: a grade dated exactly on `start` or `end`
    /// belongs to the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    fn overlaps(&self, other: &PeriodRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Both ranges, loaded once per request and consulted in memory.
#[derive(Debug, Clone, Copy)]
pub struct Periods {
    pub first: PeriodRange,
    pub second: PeriodRange,
}

impl Periods {
    pub fn load(conn: &Connection) -> Result<Self, ApiError> {
        Ok(Self {
            first: load_range(conn, PeriodName::First)?,
            second: load_range(conn, PeriodName::Second)?,
        })
    }

    pub fn range(&self, name: PeriodName) -> PeriodRange {
        match name {
            PeriodName::First => self.first,
            PeriodName::Second => self.second,
        }
    }

    /// First period wins if the stored ranges overlap; that state can only
    /// come from a pre-existing database, set_period refuses to create it.
    pub fn classify(&self, date: NaiveDate) -> Option<PeriodName> {
        if self.first.contains(date) {
            Some(PeriodName::First)
        } else if self.second.contains(date) {
            Some(PeriodName::Second)
        } else {
            None
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("invalid date: {raw}")))
}

fn load_range(conn: &Connection, name: PeriodName) -> Result<PeriodRange, ApiError> {
    let (start, end): (String, String) = conn.query_row(
        "SELECT start_date, end_date FROM periods WHERE name = ?",
        [name.as_str()],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(PeriodRange {
        start: stored_date(&start)?,
        end: stored_date(&end)?,
    })
}

fn stored_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt stored date {raw}: {e}")))
}

pub fn set_period(
    conn: &Connection,
    name: PeriodName,
    start_raw: &str,
    end_raw: &str,
) -> Result<PeriodRange, ApiError> {
    let range = PeriodRange {
        start: parse_date(start_raw)?,
        end: parse_date(end_raw)?,
    };
    if range.start > range.end {
        return Err(ApiError::validation(format!(
            "{} starts after it ends",
            name.as_str()
        )));
    }

    let other = load_range(conn, name.other())?;
    if range.overlaps(&other) {
        return Err(ApiError::validation(format!(
            "{} would overlap {}",
            name.as_str(),
            name.other().as_str()
        )));
    }

    conn.execute(
        "UPDATE periods SET start_date = ?, end_date = ? WHERE name = ?",
        (range.start.to_string(), range.end.to_string(), name.as_str()),
    )?;
    Ok(range)
}
