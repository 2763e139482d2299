use chrono::{Datelike, NaiveDate};

/// First day of the calendar month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the calendar month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Month key used to scope per-period preferences, e.g. `March2024`.
pub fn period_key(date: NaiveDate) -> String {
    date.format("%B%Y").to_string()
}

/// `March 2024`
pub fn month_year_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Long date with an ordinal day, e.g. `1st March 2024`.
pub fn long_date_label(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{} {}", day, suffix, date.format("%B %Y"))
}

/// Parses a `YYYY-MM-DD` form value.
pub fn parse_date(value: &str) -> crate::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")?)
}
