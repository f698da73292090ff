use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::periods;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub name: String,
    pub objective: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub id: String,
    pub subject: String,
    pub value: f64,
    pub weight: f64,
    pub kind: String,
    pub date: NaiveDate,
}

/// Identifiers are uppercase alphabetic plus underscore. The raw input is
/// checked before normalizing so "Math 1" fails rather than becoming
/// "MATH_1" silently.
pub fn normalize_subject_name(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("subject name must not be empty"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == '_')
    {
        return Err(ApiError::validation(
            "subject name may only contain letters and underscores",
        ));
    }
    Ok(trimmed.to_ascii_uppercase())
}

pub fn validate_grade_value(value: f64) -> Result<f64, ApiError> {
    if !value.is_finite() || !(MIN_GRADE..=MAX_GRADE).contains(&value) {
        return Err(ApiError::validation(format!(
            "grade must be between {MIN_GRADE} and {MAX_GRADE}"
        )));
    }
    Ok(value)
}

pub fn validate_grade_weight(weight: f64) -> Result<f64, ApiError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(ApiError::validation("grade weight must be positive"));
    }
    Ok(weight)
}

pub fn subject_exists(conn: &Connection, name: &str) -> Result<bool, ApiError> {
    let row: Option<i64> = conn
        .query_row("SELECT 1 FROM subjects WHERE name = ?", [name], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(row.is_some())
}

pub fn add_subject(conn: &Connection, raw_name: &str) -> Result<String, ApiError> {
    let name = normalize_subject_name(raw_name)?;
    if subject_exists(conn, &name)? {
        return Err(ApiError::validation(format!("subject {name} already exists")));
    }
    conn.execute("INSERT INTO subjects(name) VALUES(?)", [&name])?;
    Ok(name)
}

pub fn delete_subject(conn: &Connection, name: &str) -> Result<(), ApiError> {
    if !subject_exists(conn, name)? {
        return Err(ApiError::not_found(format!("subject {name} not found")));
    }
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM grades WHERE subject = ?", [name])?;
    tx.execute("DELETE FROM subjects WHERE name = ?", [name])?;
    tx.commit()?;
    Ok(())
}

/// Rename keeps every grade and its id; only the owning identifier moves.
pub fn rename_subject(conn: &Connection, old: &str, raw_new: &str) -> Result<String, ApiError> {
    if !subject_exists(conn, old)? {
        return Err(ApiError::not_found(format!("subject {old} not found")));
    }
    let new = normalize_subject_name(raw_new)?;
    if new != old && subject_exists(conn, &new)? {
        return Err(ApiError::conflict(format!("subject {new} already exists")));
    }
    // Grade rows follow via ON UPDATE CASCADE.
    conn.execute("UPDATE subjects SET name = ? WHERE name = ?", (&new, old))?;
    Ok(new)
}

pub fn set_objective(
    conn: &Connection,
    name: &str,
    objective: Option<f64>,
) -> Result<(), ApiError> {
    if !subject_exists(conn, name)? {
        return Err(ApiError::not_found(format!("subject {name} not found")));
    }
    if let Some(v) = objective {
        validate_grade_value(v)?;
    }
    conn.execute(
        "UPDATE subjects SET objective = ? WHERE name = ?",
        (objective, name),
    )?;
    Ok(())
}

pub fn add_grade(
    conn: &Connection,
    subject: &str,
    value: f64,
    weight: f64,
    kind: &str,
    date_raw: &str,
) -> Result<Grade, ApiError> {
    if !subject_exists(conn, subject)? {
        return Err(ApiError::not_found(format!("subject {subject} not found")));
    }
    let grade = Grade {
        id: Uuid::new_v4().to_string(),
        subject: subject.to_string(),
        value: validate_grade_value(value)?,
        weight: validate_grade_weight(weight)?,
        kind: kind.trim().to_string(),
        date: periods::parse_date(date_raw)?,
    };
    conn.execute(
        "INSERT INTO grades(id, subject, value, weight, type, date) VALUES(?, ?, ?, ?, ?, ?)",
        (
            &grade.id,
            &grade.subject,
            grade.value,
            grade.weight,
            &grade.kind,
            grade.date.to_string(),
        ),
    )?;
    Ok(grade)
}

pub fn edit_grade(
    conn: &Connection,
    id: &str,
    value: f64,
    weight: f64,
    kind: &str,
    date_raw: &str,
) -> Result<Grade, ApiError> {
    let existing = get_grade(conn, id)?;
    let value = validate_grade_value(value)?;
    let weight = validate_grade_weight(weight)?;
    let date = periods::parse_date(date_raw)?;
    let kind = kind.trim().to_string();
    conn.execute(
        "UPDATE grades SET value = ?, weight = ?, type = ?, date = ? WHERE id = ?",
        (value, weight, &kind, date.to_string(), id),
    )?;
    Ok(Grade {
        value,
        weight,
        kind,
        date,
        ..existing
    })
}

pub fn delete_grade(conn: &Connection, id: &str) -> Result<(), ApiError> {
    let affected = conn.execute("DELETE FROM grades WHERE id = ?", [id])?;
    if affected == 0 {
        return Err(ApiError::not_found(format!("grade {id} not found")));
    }
    Ok(())
}

pub fn get_grade(conn: &Connection, id: &str) -> Result<Grade, ApiError> {
    let row = conn
        .query_row(
            "SELECT id, subject, value, weight, type, date FROM grades WHERE id = ?",
            [id],
            grade_from_row,
        )
        .optional()?;
    match row {
        Some(r) => grade_from_stored(r),
        None => Err(ApiError::not_found(format!("grade {id} not found"))),
    }
}

pub fn list_subjects(conn: &Connection) -> Result<Vec<Subject>, ApiError> {
    let mut stmt =
        conn.prepare("SELECT name, objective FROM subjects ORDER BY name")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Subject {
                name: r.get(0)?,
                objective: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Date-ascending; ties keep insertion order via rowid.
pub fn grades_for_subject(conn: &Connection, subject: &str) -> Result<Vec<Grade>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, subject, value, weight, type, date
         FROM grades
         WHERE subject = ?
         ORDER BY date, rowid",
    )?;
    let rows = stmt
        .query_map([subject], grade_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(grade_from_stored).collect()
}

pub fn all_grades(conn: &Connection) -> Result<Vec<Grade>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, subject, value, weight, type, date
         FROM grades
         ORDER BY date, rowid",
    )?;
    let rows = stmt
        .query_map([], grade_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(grade_from_stored).collect()
}

type StoredGrade = (String, String, f64, f64, String, String);

fn grade_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<StoredGrade> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

fn grade_from_stored(row: StoredGrade) -> Result<Grade, ApiError> {
    let (id, subject, value, weight, kind, date) = row;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt grade date {date}: {e}")))?;
    Ok(Grade {
        id,
        subject,
        value,
        weight,
        kind,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = crate::db::open_db(dir.path()).expect("open db");
        (dir, conn)
    }

    #[test]
    fn subject_names_are_validated_and_uppercased() {
        let (_dir, conn) = test_conn();
        assert_eq!(add_subject(&conn, "math").expect("add"), "MATH");
        assert!(add_subject(&conn, "MATH").is_err());
        assert!(add_subject(&conn, "").is_err());
        assert!(add_subject(&conn, "MATH 1").is_err());
        assert!(add_subject(&conn, "SCI3NCE").is_err());
        assert_eq!(add_subject(&conn, "ART_HISTORY").expect("add"), "ART_HISTORY");
    }

    #[test]
    fn rename_preserves_grades_and_ids() {
        let (_dir, conn) = test_conn();
        add_subject(&conn, "MATH").expect("add subject");
        let g = add_grade(&conn, "MATH", 7.5, 1.0, "test", "2024-10-01").expect("add grade");

        rename_subject(&conn, "MATH", "algebra").expect("rename");
        assert!(!subject_exists(&conn, "MATH").expect("exists"));
        let grades = grades_for_subject(&conn, "ALGEBRA").expect("grades");
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].id, g.id);
        assert_eq!(grades[0].value, 7.5);
    }

    #[test]
    fn rename_to_taken_name_is_a_conflict() {
        let (_dir, conn) = test_conn();
        add_subject(&conn, "MATH").expect("add");
        add_subject(&conn, "LATIN").expect("add");
        let err = rename_subject(&conn, "MATH", "LATIN").expect_err("conflict");
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn grade_domain_is_enforced() {
        let (_dir, conn) = test_conn();
        add_subject(&conn, "MATH").expect("add");
        assert!(add_grade(&conn, "MATH", 11.0, 1.0, "test", "2024-10-01").is_err());
        assert!(add_grade(&conn, "MATH", -1.0, 1.0, "test", "2024-10-01").is_err());
        assert!(add_grade(&conn, "MATH", 7.0, 0.0, "test", "2024-10-01").is_err());
        assert!(add_grade(&conn, "MATH", 7.0, 1.0, "test", "not-a-date").is_err());
        assert!(add_grade(&conn, "GYM", 7.0, 1.0, "test", "2024-10-01").is_err());
    }

    #[test]
    fn edit_replaces_fields_in_place() {
        let (_dir, conn) = test_conn();
        add_subject(&conn, "MATH").expect("add");
        let g = add_grade(&conn, "MATH", 6.0, 1.0, "quiz", "2024-09-20").expect("add grade");
        let edited =
            edit_grade(&conn, &g.id, 8.0, 2.0, "test", "2024-09-21").expect("edit grade");
        assert_eq!(edited.id, g.id);

        let read = get_grade(&conn, &g.id).expect("get");
        assert_eq!(read.value, 8.0);
        assert_eq!(read.weight, 2.0);
        assert_eq!(read.kind, "test");
        assert_eq!(read.date.to_string(), "2024-09-21");
    }

    #[test]
    fn delete_subject_removes_its_grades() {
        let (_dir, conn) = test_conn();
        add_subject(&conn, "MATH").expect("add");
        add_grade(&conn, "MATH", 6.0, 1.0, "quiz", "2024-09-20").expect("add grade");
        delete_subject(&conn, "MATH").expect("delete");
        assert!(delete_subject(&conn, "MATH").is_err());
        let left: i64 = conn
            .query_row("SELECT COUNT(*) FROM grades", [], |r| r.get(0))
            .expect("count");
        assert_eq!(left, 0);
    }
}
