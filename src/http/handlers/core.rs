use std::path::Path;

use axum::extract::State;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::backup;
use crate::db;
use crate::http::error::{ok_message, ApiError};
use crate::http::types::{parse_body, AppState, ExportBackupBody, ImportBackupBody};

/// The host shell polls this until it answers instead of sleeping through
/// startup. The database is opened before the listener binds, so a 200
/// means requests will be served.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn export_backup(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: ExportBackupBody = parse_body(body)?;
    // Hold the connection lock so no mutation lands mid-copy.
    let _conn = state.db()?;
    let summary = backup::export_backup_bundle(&state.data_dir, Path::new(&body.destination))?;
    info!(destination = %body.destination, sha256 = %summary.db_sha256, "backup exported");
    Ok(ok_message(format!(
        "backup written to {}",
        body.destination
    )))
}

pub async fn import_backup(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: ImportBackupBody = parse_body(body)?;
    let mut conn = state.db()?;
    backup::import_backup_bundle(Path::new(&body.source), &state.data_dir)?;
    // The old connection still points at the replaced file; reopen.
    *conn = db::open_db(&state.data_dir)?;
    info!(source = %body.source, "backup restored");
    Ok(ok_message("backup restored"))
}
