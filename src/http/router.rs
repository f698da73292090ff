use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::types::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::core::healthz))
        .route("/index-content", get(handlers::subjects::index_content))
        .route("/addSubject", post(handlers::subjects::add_subject))
        .route("/deleteSubject", post(handlers::subjects::delete_subject))
        .route("/renameSubject", post(handlers::subjects::rename_subject))
        .route("/setObjective", post(handlers::subjects::set_objective))
        .route("/redirect", post(handlers::subjects::redirect))
        .route("/stats", get(handlers::stats::stats))
        .route(
            "/getAverageByDate",
            get(handlers::stats::get_average_by_date),
        )
        .route("/settings", get(handlers::settings::settings))
        .route("/setPeriod", post(handlers::settings::set_period))
        .route(
            "/changePeriod",
            get(handlers::grades::change_period_query).post(handlers::grades::change_period_body),
        )
        .route("/addGrade", post(handlers::grades::add_grade))
        .route("/editGrade", post(handlers::grades::edit_grade))
        .route("/deleteGrade", post(handlers::grades::delete_grade))
        .route("/exportBackup", post(handlers::core::export_backup))
        .route("/importBackup", post(handlers::core::import_backup))
        .with_state(state)
}
