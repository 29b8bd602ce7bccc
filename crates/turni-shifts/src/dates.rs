use chrono::{Datelike, Duration, NaiveDate};

/// Italian weekday names, indexed 0 = Monday … 6 = Sunday.
pub const DAYS_OF_WEEK: [&str; 7] = [
    "Lunedì",
    "Martedì",
    "Mercoledì",
    "Giovedì",
    "Venerdì",
    "Sabato",
    "Domenica",
];

/// Name of the weekday `date` falls on.
pub fn day_name(date: NaiveDate) -> &'static str {
    DAYS_OF_WEEK[date.weekday().num_days_from_monday() as usize]
}

/// Three-letter abbreviation of a weekday index, for reminder summaries.
pub fn short_day_name(day: u8) -> String {
    DAYS_OF_WEEK[usize::from(day.min(6))]
        .chars()
        .take(3)
        .collect()
}

/// "Lunedì 2022-01-30" style rendering.
pub fn format_date(date: NaiveDate) -> String {
    format!("{} {}", day_name(date), date.format("%Y-%m-%d"))
}

/// Monday..Friday of the ISO week containing `anchor`.
///
/// A Saturday or Sunday anchor still yields that week's Monday–Friday.
pub fn work_week(anchor: NaiveDate) -> [NaiveDate; 5] {
    let monday = anchor - Duration::days(i64::from(anchor.weekday().num_days_from_monday()));
    [
        monday,
        monday + Duration::days(1),
        monday + Duration::days(2),
        monday + Duration::days(3),
        monday + Duration::days(4),
    ]
}
