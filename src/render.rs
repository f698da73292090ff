//! HTML fragments the WebView swaps into its page. Element ids and the
//! embedded JSON are part of the client contract; layout and styling live
//! with the static assets, not here.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::calc;
use crate::periods::{PeriodName, Periods};
use crate::store::{Grade, Subject};

#[derive(Debug, Clone)]
pub struct SubjectCard {
    pub name: String,
    pub objective: Option<f64>,
    pub average: Option<f64>,
}

pub fn index_content(cards: &[SubjectCard]) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<div class=\"subject-list\">");
    if cards.is_empty() {
        let _ = writeln!(
            html,
            "  <p class=\"empty-hint\">No subjects yet. Add one below.</p>"
        );
    }
    for card in cards {
        let _ = writeln!(
            html,
            "  <div class=\"subject-card\" onclick=\"redirect('{}')\">",
            card.name
        );
        let _ = writeln!(html, "    <h2>{}</h2>", card.name);
        match card.average {
            Some(avg) => {
                let _ = writeln!(
                    html,
                    "    <p class=\"subject-average\">{}</p>",
                    calc::round_display(avg)
                );
            }
            None => {
                let _ = writeln!(html, "    <p class=\"subject-average\">no grades</p>");
            }
        }
        if let Some(objective) = card.objective {
            let _ = writeln!(
                html,
                "    <p class=\"subject-objective\">objective {}</p>",
                calc::value_label(objective)
            );
        }
        let _ = writeln!(html, "  </div>");
    }
    let _ = writeln!(html, "</div>");

    let _ = writeln!(
        html,
        "<button id=\"add-subject-button\" onclick=\"showSection('add-subject-button')\">Add subject</button>"
    );
    let _ = writeln!(
        html,
        "<form id=\"add-subject-section\" style=\"display: none\">"
    );
    let _ = writeln!(
        html,
        "  <input id=\"subject\" name=\"subject\" placeholder=\"Subject name\" required>"
    );
    let _ = writeln!(html, "  <button type=\"submit\">Add</button>");
    let _ = writeln!(
        html,
        "  <button type=\"button\" onclick=\"cancelAddSubject()\">Cancel</button>"
    );
    let _ = writeln!(html, "</form>");
    html
}

/// The chart script reads the two distributions out of the `data-value`
/// attributes and draws onto the canvases; only ids and JSON matter here.
pub fn stats(
    dist_first: &BTreeMap<String, i64>,
    dist_second: &BTreeMap<String, i64>,
) -> String {
    let dist_fp = serde_json::to_string(dist_first).unwrap_or_else(|_| "{}".to_string());
    let dist_sp = serde_json::to_string(dist_second).unwrap_or_else(|_| "{}".to_string());

    let mut html = String::new();
    let _ = writeln!(html, "<div id=\"grade-bar-fp\" data-value='{dist_fp}'></div>");
    let _ = writeln!(html, "<div id=\"grade-bar-sp\" data-value='{dist_sp}'></div>");
    let _ = writeln!(html, "<div class=\"chart-box\">");
    let _ = writeln!(html, "  <canvas id=\"bar-grade-graph\"></canvas>");
    let _ = writeln!(html, "</div>");
    let _ = writeln!(html, "<div class=\"chart-box\">");
    let _ = writeln!(html, "  <canvas id=\"average-grade-over-time\"></canvas>");
    let _ = writeln!(html, "</div>");
    html
}

pub fn settings(subjects: &[Subject], periods: &Periods) -> String {
    let mut html = String::new();

    for name in [PeriodName::First, PeriodName::Second] {
        // Input ids use dashes; the request body uses the stored name.
        let slug = name.as_str().replace('_', "-");
        let range = periods.range(name);
        let label = match name {
            PeriodName::First => "First period",
            PeriodName::Second => "Second period",
        };
        let _ = writeln!(
            html,
            "<button id=\"{slug}-button\" onclick=\"showPeriodSection('{slug}', '{slug}-button')\">{label}</button>"
        );
        let _ = writeln!(html, "<div id=\"{slug}\" style=\"display: none\">");
        let _ = writeln!(
            html,
            "  <input type=\"date\" id=\"start-date-{slug}\" value=\"{}\">",
            range.start
        );
        let _ = writeln!(
            html,
            "  <input type=\"date\" id=\"end-date-{slug}\" value=\"{}\">",
            range.end
        );
        let _ = writeln!(
            html,
            "  <button onclick=\"setPeriod('{slug}')\">Save</button>"
        );
        let _ = writeln!(
            html,
            "  <button onclick=\"cancelPeriod('{slug}', '{slug}-button')\">Cancel</button>"
        );
        let _ = writeln!(html, "</div>");
    }

    let _ = writeln!(html, "<div class=\"subject-settings\">");
    for subject in subjects {
        let _ = writeln!(html, "  <div class=\"subject-row\">");
        let _ = writeln!(html, "    <span>{}</span>", subject.name);
        if let Some(objective) = subject.objective {
            let _ = writeln!(
                html,
                "    <span class=\"objective\">{}</span>",
                calc::value_label(objective)
            );
        }
        let _ = writeln!(
            html,
            "    <button onclick=\"renameSubject('{}')\">Rename</button>",
            subject.name
        );
        let _ = writeln!(
            html,
            "    <button onclick=\"setObjective('{}')\">Objective</button>",
            subject.name
        );
        let _ = writeln!(
            html,
            "    <button onclick=\"deleteSubject('{}')\">Delete</button>",
            subject.name
        );
        let _ = writeln!(html, "  </div>");
    }
    let _ = writeln!(html, "</div>");
    html
}

/// Grade rows for one subject filtered to one period, with the period
/// average above them.
pub fn grade_list(grades: &[Grade], average: Option<f64>) -> String {
    let mut html = String::new();
    match average {
        Some(avg) => {
            let _ = writeln!(
                html,
                "<p class=\"period-average\">average {} (rounded {})</p>",
                calc::round_display(avg),
                calc::value_label(calc::round_average(avg))
            );
        }
        None => {
            let _ = writeln!(
                html,
                "<p class=\"period-average\">no grades in this period</p>"
            );
        }
    }

    for grade in grades {
        let kind_attr = js_escape(&grade.kind);
        let _ = writeln!(html, "<div class=\"grade-row\">");
        let _ = writeln!(
            html,
            "  <span class=\"grade-value\">{}</span>",
            calc::value_label(grade.value)
        );
        let _ = writeln!(
            html,
            "  <span class=\"grade-type\">{}</span>",
            html_escape(&grade.kind)
        );
        let _ = writeln!(html, "  <span class=\"grade-date\">{}</span>", grade.date);
        let _ = writeln!(
            html,
            "  <span class=\"grade-weight\">x{}</span>",
            calc::value_label(grade.weight)
        );
        let _ = writeln!(
            html,
            "  <button onclick=\"editGrade('{}', {}, '{}', {}, '{}')\">Edit</button>",
            grade.id, grade.value, grade.date, grade.weight, kind_attr
        );
        let _ = writeln!(
            html,
            "  <button onclick=\"deleteGrade('{}')\">Delete</button>",
            grade.id
        );
        let _ = writeln!(html, "</div>");
    }
    html
}

pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// For free text dropped inside a single-quoted JS string within an HTML
/// attribute: hex escapes keep both parsers out of trouble.
fn js_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\x27"),
            '"' => out.push_str("\\x22"),
            '<' => out.push_str("\\x3c"),
            '>' => out.push_str("\\x3e"),
            '&' => out.push_str("\\x26"),
            _ => out.push(c),
        }
    }
    out
}
