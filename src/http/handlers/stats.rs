use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde_json::json;

use crate::calc::{self, WeightedValue};
use crate::http::error::ApiError;
use crate::http::types::AppState;
use crate::periods::{PeriodName, Periods};
use crate::render;
use crate::store::{self, Grade};

fn period_grades<'a>(grades: &'a [Grade], periods: &Periods, name: PeriodName) -> Vec<&'a Grade> {
    grades
        .iter()
        .filter(|g| periods.classify(g.date) == Some(name))
        .collect()
}

pub async fn stats(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let conn = state.db()?;
    let grades = store::all_grades(&conn)?;
    let periods = Periods::load(&conn)?;

    let dist_first = calc::distribution(
        period_grades(&grades, &periods, PeriodName::First)
            .iter()
            .map(|g| g.value),
    );
    let dist_second = calc::distribution(
        period_grades(&grades, &periods, PeriodName::Second)
            .iter()
            .map(|g| g.value),
    );
    Ok(Html(render::stats(&dist_first, &dist_second)))
}

/// Running averages per period across every subject, one point per grade
/// in chronological order. The chart derives submission ordinals from the
/// dates client-side.
pub async fn get_average_by_date(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.db()?;
    let grades = store::all_grades(&conn)?;
    let periods = Periods::load(&conn)?;

    let series_for = |name: PeriodName| {
        let points: Vec<_> = period_grades(&grades, &periods, name)
            .iter()
            .map(|g| {
                (
                    g.date,
                    WeightedValue {
                        value: g.value,
                        weight: g.weight,
                    },
                )
            })
            .collect();
        calc::running_averages(&points)
    };

    let (data_fp, data_rounded_fp) = series_for(PeriodName::First);
    let (data_sp, data_rounded_sp) = series_for(PeriodName::Second);

    Ok(Json(json!({
        "data_fp": data_fp,
        "data_rounded_fp": data_rounded_fp,
        "data_sp": data_sp,
        "data_rounded_sp": data_rounded_sp,
    })))
}
