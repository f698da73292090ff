use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::calc::{self, WeightedValue};
use crate::http::error::{ok_message, ApiError};
use crate::http::types::{
    parse_body, AddSubjectBody, AppState, DeleteSubjectBody, RedirectBody, RenameSubjectBody,
    SetObjectiveBody,
};
use crate::render::{self, SubjectCard};
use crate::store;

/// Lookups take whatever the client echoed back and match it against the
/// stored uppercase identifier.
fn lookup_name(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

pub async fn index_content(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let conn = state.db()?;
    let mut cards = Vec::new();
    for subject in store::list_subjects(&conn)? {
        let grades = store::grades_for_subject(&conn, &subject.name)?;
        let average = calc::weighted_average(grades.iter().map(|g| WeightedValue {
            value: g.value,
            weight: g.weight,
        }));
        cards.push(SubjectCard {
            name: subject.name,
            objective: subject.objective,
            average,
        });
    }
    Ok(Html(render::index_content(&cards)))
}

pub async fn add_subject(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: AddSubjectBody = parse_body(body)?;
    let conn = state.db()?;
    let name = store::add_subject(&conn, &body.subject)?;
    info!(subject = %name, "subject added");
    Ok(ok_message(format!("subject {name} added")))
}

pub async fn delete_subject(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: DeleteSubjectBody = parse_body(body)?;
    let name = lookup_name(&body.subject_to_delete);
    let conn = state.db()?;
    store::delete_subject(&conn, &name)?;
    info!(subject = %name, "subject deleted");
    Ok(ok_message(format!("subject {name} deleted")))
}

pub async fn rename_subject(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: RenameSubjectBody = parse_body(body)?;
    let old = lookup_name(&body.subject_to_rename);
    let conn = state.db()?;
    let new = store::rename_subject(&conn, &old, &body.new_name)?;
    info!(from = %old, to = %new, "subject renamed");
    Ok(ok_message(format!("subject {old} renamed to {new}")))
}

pub async fn set_objective(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: SetObjectiveBody = parse_body(body)?;
    let name = lookup_name(&body.subject);
    // An empty field clears the objective.
    let objective = if body.objective.is_empty() {
        None
    } else {
        Some(body.objective.as_f64("objective")?)
    };
    let conn = state.db()?;
    store::set_objective(&conn, &name, objective)?;
    info!(subject = %name, "objective updated");
    match objective {
        Some(v) => Ok(ok_message(format!(
            "objective for {name} set to {}",
            calc::value_label(v)
        ))),
        None => Ok(ok_message(format!("objective for {name} cleared"))),
    }
}

pub async fn redirect(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: RedirectBody = parse_body(body)?;
    let name = lookup_name(&body.subject_redirect);
    let conn = state.db()?;
    if !store::subject_exists(&conn, &name)? {
        return Err(ApiError::not_found(format!("subject {name} not found")));
    }
    Ok(Json(json!({ "redirect": format!("/subject/{name}") })))
}
