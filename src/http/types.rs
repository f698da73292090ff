use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::http::error::ApiError;

/// Everything a request handler needs. The single connection behind the
/// mutex serializes mutations, so requests observe each other's writes in
/// order.
#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(data_dir: PathBuf, conn: Connection) -> Self {
        Self {
            data_dir,
            db: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}

/// Bodies are accepted as raw JSON and mapped onto these schemas so a
/// malformed body surfaces as a Validation error in the usual envelope.
pub fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("invalid request body: {e}")))
}

/// The web form submits every field as a string; tooling sends numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    pub fn as_f64(&self, field: &str) -> Result<f64, ApiError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ApiError::validation(format!("{field} must be a number"))),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct AddSubjectBody {
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSubjectBody {
    pub subject_to_delete: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameSubjectBody {
    pub subject_to_rename: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetObjectiveBody {
    pub subject: String,
    pub objective: FormValue,
}

#[derive(Debug, Deserialize)]
pub struct RedirectBody {
    pub subject_redirect: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPeriodBody {
    pub period: String,
    pub start: String,
    pub end: String,
}

/// Same shape whether it arrives as a JSON body or as query parameters.
#[derive(Debug, Deserialize)]
pub struct ChangePeriodParams {
    pub period: String,
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct AddGradeBody {
    pub subject: String,
    pub grade: FormValue,
    pub date: String,
    pub grade_weight: FormValue,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct EditGradeBody {
    pub subject: String,
    pub grade: FormValue,
    pub date: String,
    pub grade_weight: FormValue,
    #[serde(rename = "type")]
    pub kind: String,
    pub grade_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteGradeBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportBackupBody {
    pub destination: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportBackupBody {
    pub source: String,
}
