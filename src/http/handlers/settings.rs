use axum::extract::State;
use axum::response::Html;
use axum::Json;
use tracing::info;

use crate::http::error::{ok_message, ApiError};
use crate::http::types::{parse_body, AppState, SetPeriodBody};
use crate::periods::{self, PeriodName, Periods};
use crate::render;
use crate::store;

pub async fn settings(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let conn = state.db()?;
    let subjects = store::list_subjects(&conn)?;
    let periods = Periods::load(&conn)?;
    Ok(Html(render::settings(&subjects, &periods)))
}

pub async fn set_period(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: SetPeriodBody = parse_body(body)?;
    let name = PeriodName::parse(&body.period)?;
    let conn = state.db()?;
    let range = periods::set_period(&conn, name, &body.start, &body.end)?;
    info!(period = name.as_str(), start = %range.start, end = %range.end, "period updated");
    Ok(ok_message(format!(
        "{} set to {} / {}",
        name.as_str(),
        range.start,
        range.end
    )))
}
