use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedValue {
    pub value: f64,
    pub weight: f64,
}

/// Sum of value*weight over sum of weights. None when the set is empty or
/// carries no weight, so callers render "no data" instead of dividing by
/// zero.
pub fn weighted_average<I>(grades: I) -> Option<f64>
where
    I: IntoIterator<Item = WeightedValue>,
{
    let mut sum = 0.0_f64;
    let mut denom = 0.0_f64;
    for g in grades {
        sum += g.value * g.weight;
        denom += g.weight;
    }
    if denom > 0.0 {
        Some(sum / denom)
    } else {
        None
    }
}

/// Nearest integer, half away from zero: 6.5 becomes 7, matching how the
/// rounded report-card grade is read.
pub fn round_average(avg: f64) -> f64 {
    avg.round()
}

/// Two decimals for display, same rounding direction as `round_average`.
pub fn round_display(avg: f64) -> f64 {
    (avg * 100.0).round() / 100.0
}

/// Histogram keys: whole grades print without a decimal point ("7"),
/// fractional ones keep their shortest form ("7.5").
pub fn value_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Occurrence count per distinct grade value. Counts always sum to the
/// number of grades given.
pub fn distribution<I>(values: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(value_label(v)).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub average_grade: f64,
}

/// Running averages as grades accumulate: one point per grade, in the
/// caller's (chronological) order. Returns the plain series and the
/// rounded series side by side.
pub fn running_averages(grades: &[(NaiveDate, WeightedValue)]) -> (Vec<SeriesPoint>, Vec<SeriesPoint>) {
    let mut sum = 0.0_f64;
    let mut denom = 0.0_f64;
    let mut plain = Vec::with_capacity(grades.len());
    let mut rounded = Vec::with_capacity(grades.len());

    for (date, g) in grades {
        sum += g.value * g.weight;
        denom += g.weight;
        if denom <= 0.0 {
            continue;
        }
        let avg = sum / denom;
        plain.push(SeriesPoint {
            date: date.to_string(),
            average_grade: round_display(avg),
        });
        rounded.push(SeriesPoint {
            date: date.to_string(),
            average_grade: round_average(avg),
        });
    }
    (plain, rounded)
}
