use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use tracing::info;

use crate::calc::{self, WeightedValue};
use crate::http::error::{ok_message, ApiError};
use crate::http::types::{
    parse_body, AddGradeBody, AppState, ChangePeriodParams, DeleteGradeBody, EditGradeBody,
};
use crate::periods::{PeriodName, Periods};
use crate::render;
use crate::store;

pub async fn add_grade(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: AddGradeBody = parse_body(body)?;
    let subject = body.subject.trim().to_ascii_uppercase();
    let value = body.grade.as_f64("grade")?;
    let weight = body.grade_weight.as_f64("grade weight")?;
    let conn = state.db()?;
    let grade = store::add_grade(&conn, &subject, value, weight, &body.kind, &body.date)?;
    info!(subject = %subject, id = %grade.id, "grade added");
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("grade {} added to {subject}", calc::value_label(grade.value)),
        "id": grade.id,
    })))
}

pub async fn edit_grade(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: EditGradeBody = parse_body(body)?;
    let subject = body.subject.trim().to_ascii_uppercase();
    let value = body.grade.as_f64("grade")?;
    let weight = body.grade_weight.as_f64("grade weight")?;
    let conn = state.db()?;
    if !store::subject_exists(&conn, &subject)? {
        return Err(ApiError::not_found(format!("subject {subject} not found")));
    }
    let grade = store::edit_grade(&conn, &body.grade_id, value, weight, &body.kind, &body.date)?;
    info!(subject = %subject, id = %grade.id, "grade updated");
    Ok(ok_message("grade updated"))
}

pub async fn delete_grade(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: DeleteGradeBody = parse_body(body)?;
    let conn = state.db()?;
    store::delete_grade(&conn, &body.id)?;
    info!(id = %body.id, "grade deleted");
    Ok(ok_message("grade deleted"))
}

pub async fn change_period_query(
    State(state): State<AppState>,
    Query(params): Query<ChangePeriodParams>,
) -> Result<Html<String>, ApiError> {
    change_period(&state, params)
}

pub async fn change_period_body(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Html<String>, ApiError> {
    let params: ChangePeriodParams = parse_body(body)?;
    change_period(&state, params)
}

fn change_period(state: &AppState, params: ChangePeriodParams) -> Result<Html<String>, ApiError> {
    let period = PeriodName::parse(&params.period)?;
    let subject = params.subject.trim().to_ascii_uppercase();
    let conn = state.db()?;
    if !store::subject_exists(&conn, &subject)? {
        return Err(ApiError::not_found(format!("subject {subject} not found")));
    }
    let periods = Periods::load(&conn)?;
    let grades: Vec<_> = store::grades_for_subject(&conn, &subject)?
        .into_iter()
        .filter(|g| periods.classify(g.date) == Some(period))
        .collect();
    let average = calc::weighted_average(grades.iter().map(|g| WeightedValue {
        value: g.value,
        weight: g.weight,
    }));
    Ok(Html(render::grade_list(&grades, average)))
}
