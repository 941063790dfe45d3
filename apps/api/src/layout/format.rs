//! Display formatting shared by both templates. Dates are opaque strings; they are
//! only reformatted for display when they look like `YYYY-MM` or `YYYY-MM-DD`.

use chrono::NaiveDate;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `2023-01` → `Jan 2023`. Anything unrecognised is returned trimmed, unchanged.
pub fn format_month(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let padded = if raw.len() == 7 {
        format!("{raw}-01")
    } else {
        raw.to_string()
    };
    match NaiveDate::parse_from_str(&padded, "%Y-%m-%d") {
        Ok(date) => {
            use chrono::Datelike;
            format!("{} {}", MONTHS[date.month0() as usize], date.year())
        }
        Err(_) => raw.to_string(),
    }
}

/// `start - end`, with `Present` for ongoing items. Empty when there is nothing to show.
pub fn format_range(start: &str, end: &str, current: bool) -> String {
    let start = format_month(start);
    let end = if current {
        "Present".to_string()
    } else {
        format_month(end)
    };
    if start.is_empty() && end.is_empty() {
        String::new()
    } else {
        format!("{start} - {end}")
    }
}

/// One bullet line per non-blank line of a multi-line description.
pub fn bullet_lines(description: &str) -> Vec<String> {
    description
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// Returns `Some(text)` only when the text has visible content.
pub fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
