mod test_support;

use serde_json::{json, Value};
use test_support::{add_grade, get, post_ok, set_test_periods, spawn_app};

fn embedded_json(html: &str, element_id: &str) -> Value {
    let marker = format!("id=\"{element_id}\" data-value='");
    let start = html
        .find(&marker)
        .unwrap_or_else(|| panic!("{element_id} missing from fragment"))
        + marker.len();
    let end = html[start..].find('\'').expect("closing quote") + start;
    serde_json::from_str(&html[start..end]).expect("embedded JSON parses")
}

#[tokio::test]
async fn weighted_and_rounded_averages_match_hand_arithmetic() {
    let (_dir, addr) = spawn_app().await;
    set_test_periods(addr).await;
    post_ok(addr, "/addSubject", json!({ "subject": "MATH" })).await;

    add_grade(addr, "MATH", "8", "1", "test", "2024-09-10").await;
    add_grade(addr, "MATH", "6", "2", "quiz", "2024-10-02").await;

    // (8*1 + 6*2) / 3 = 6.67, rounded 7.
    let (status, html) = get(addr, "/changePeriod?period=first_period&subject=MATH").await;
    assert_eq!(status, 200);
    assert!(html.contains("average 6.67 (rounded 7)"), "got: {html}");

    let (status, body) = get(addr, "/getAverageByDate").await;
    assert_eq!(status, 200);
    let series: Value = serde_json::from_str(&body).expect("series json");

    let data_fp = series.get("data_fp").and_then(Value::as_array).expect("data_fp");
    assert_eq!(data_fp.len(), 2);
    assert_eq!(data_fp[0].get("average_grade"), Some(&json!(8.0)));
    assert_eq!(data_fp[0].get("date"), Some(&json!("2024-09-10")));
    assert_eq!(data_fp[1].get("average_grade"), Some(&json!(6.67)));

    let rounded_fp = series
        .get("data_rounded_fp")
        .and_then(Value::as_array)
        .expect("data_rounded_fp");
    assert_eq!(rounded_fp[1].get("average_grade"), Some(&json!(7.0)));

    let data_sp = series.get("data_sp").and_then(Value::as_array).expect("data_sp");
    assert!(data_sp.is_empty());
}

#[tokio::test]
async fn emptied_subject_reports_no_data_instead_of_dividing_by_zero() {
    let (_dir, addr) = spawn_app().await;
    set_test_periods(addr).await;
    post_ok(addr, "/addSubject", json!({ "subject": "MATH" })).await;
    let id = add_grade(addr, "MATH", "7", "1", "test", "2024-09-10").await;

    post_ok(addr, "/deleteGrade", json!({ "id": id })).await;

    let (status, html) = get(addr, "/changePeriod?period=first_period&subject=MATH").await;
    assert_eq!(status, 200);
    assert!(html.contains("no grades in this period"));

    let (status, html) = get(addr, "/index-content").await;
    assert_eq!(status, 200);
    assert!(html.contains("no grades"));
}

#[tokio::test]
async fn distribution_counts_sum_to_the_period_grade_count() {
    let (_dir, addr) = spawn_app().await;
    set_test_periods(addr).await;
    post_ok(addr, "/addSubject", json!({ "subject": "MATH" })).await;
    post_ok(addr, "/addSubject", json!({ "subject": "LATIN" })).await;

    // First period: four grades across two subjects, one repeated value.
    add_grade(addr, "MATH", "7", "1", "test", "2024-09-10").await;
    add_grade(addr, "MATH", "7", "2", "quiz", "2024-10-01").await;
    add_grade(addr, "LATIN", "8.5", "1", "test", "2024-11-05").await;
    add_grade(addr, "LATIN", "6", "1", "test", "2025-01-31").await;
    // Second period: one grade. Outside any period: one grade.
    add_grade(addr, "MATH", "9", "1", "test", "2025-03-01").await;
    add_grade(addr, "MATH", "10", "1", "test", "2025-08-15").await;

    let (status, html) = get(addr, "/stats").await;
    assert_eq!(status, 200);

    let fp = embedded_json(&html, "grade-bar-fp");
    let fp = fp.as_object().expect("fp distribution object");
    assert_eq!(fp.get("7").and_then(Value::as_i64), Some(2));
    assert_eq!(fp.get("8.5").and_then(Value::as_i64), Some(1));
    assert_eq!(fp.get("6").and_then(Value::as_i64), Some(1));
    let total: i64 = fp.values().filter_map(Value::as_i64).sum();
    assert_eq!(total, 4);

    let sp = embedded_json(&html, "grade-bar-sp");
    let sp = sp.as_object().expect("sp distribution object");
    let total: i64 = sp.values().filter_map(Value::as_i64).sum();
    assert_eq!(total, 1);
    assert_eq!(sp.get("9").and_then(Value::as_i64), Some(1));

    // The out-of-period grade still counts toward the overall average card.
    let (_, index) = get(addr, "/index-content").await;
    assert!(index.contains("MATH"));
    assert!(index.contains("LATIN"));
}

#[tokio::test]
async fn time_series_spans_subjects_in_chronological_order() {
    let (_dir, addr) = spawn_app().await;
    set_test_periods(addr).await;
    post_ok(addr, "/addSubject", json!({ "subject": "MATH" })).await;
    post_ok(addr, "/addSubject", json!({ "subject": "LATIN" })).await;

    add_grade(addr, "LATIN", "6", "1", "test", "2024-12-01").await;
    add_grade(addr, "MATH", "8", "1", "test", "2024-09-10").await;

    let (_, body) = get(addr, "/getAverageByDate").await;
    let series: Value = serde_json::from_str(&body).expect("series json");
    let data_fp = series.get("data_fp").and_then(Value::as_array).expect("data_fp");

    // Insertion order was reversed; the series is by date.
    assert_eq!(data_fp[0].get("date"), Some(&json!("2024-09-10")));
    assert_eq!(data_fp[1].get("date"), Some(&json!("2024-12-01")));
    assert_eq!(data_fp[1].get("average_grade"), Some(&json!(7.0)));
}
