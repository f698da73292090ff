use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "grades.sqlite3";

pub fn open_db(data_dir: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            name TEXT PRIMARY KEY,
            objective REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            id TEXT PRIMARY KEY,
            subject TEXT NOT NULL,
            value REAL NOT NULL,
            weight REAL NOT NULL,
            type TEXT NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(subject) REFERENCES subjects(name) ON UPDATE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject)",
        [],
    )?;
    // Dates are ISO text, so this index also gives chronological scans.
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_subject_date ON grades(subject, date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS periods(
            name TEXT PRIMARY KEY,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL
        )",
        [],
    )?;

    // Existing data directories may predate per-subject objectives.
    ensure_subjects_objective(&conn)?;

    seed_periods(&conn, chrono::Local::now().date_naive())?;

    Ok(conn)
}

fn ensure_subjects_objective(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "subjects", "objective")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE subjects ADD COLUMN objective REAL", [])?;
    Ok(())
}

/// Both periods must exist before any request is served. New databases get
/// the school year containing `today`: Sep 1 - Jan 31 and Feb 1 - Jun 30.
fn seed_periods(conn: &Connection, today: NaiveDate) -> anyhow::Result<()> {
    let start_year = if today.month() >= 8 {
        today.year()
    } else {
        today.year() - 1
    };

    let first_start = ymd(start_year, 9, 1)?;
    let first_end = ymd(start_year + 1, 1, 31)?;
    let second_start = ymd(start_year + 1, 2, 1)?;
    let second_end = ymd(start_year + 1, 6, 30)?;

    conn.execute(
        "INSERT OR IGNORE INTO periods(name, start_date, end_date) VALUES(?, ?, ?)",
        (
            "first_period",
            first_start.to_string(),
            first_end.to_string(),
        ),
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO periods(name, start_date, end_date) VALUES(?, ?, ?)",
        (
            "second_period",
            second_start.to_string(),
            second_end.to_string(),
        ),
    )?;
    Ok(())
}

fn ymd(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow::anyhow!("invalid date {year}-{month:02}-{day:02}"))
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
