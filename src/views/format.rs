use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

use crate::models::Car;

const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

pub const NO_DESCRIPTION: &str = "Sin descripción";

/// Short Spanish date in local time, e.g. `05 ene 2024`.
///
/// `-` when absent or blank; the raw text when it is not a recognizable
/// date. Timestamps without an offset are read as local time.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "-".to_string();
    };
    match parse_date(raw) {
        Some(date) => short_date(date),
        None => raw.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Local).date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn short_date(date: NaiveDate) -> String {
    // month0 is always in 0..12
    let month = MONTHS[date.month0() as usize];
    format!("{:02} {} {}", date.day(), month, date.year())
}

pub fn description_or_placeholder(car: &Car) -> &str {
    match car.description.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => NO_DESCRIPTION,
    }
}
