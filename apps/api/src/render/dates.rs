//! Locale-aware date stamps for rendered documents.

use chrono::{Datelike, NaiveDate};

use crate::models::document::Locale;

const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_name(date: NaiveDate, locale: Locale) -> &'static str {
    let idx = date.month0() as usize;
    match locale {
        Locale::Fr => MONTHS_FR[idx],
        Locale::En => MONTHS_EN[idx],
    }
}

/// Long date: "19 octobre 2026" / "October 19, 2026".
pub fn long_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::Fr => format!("{} {} {}", date.day(), month_name(date, locale), date.year()),
        Locale::En => format!("{} {}, {}", month_name(date, locale), date.day(), date.year()),
    }
}

/// Month and year: "octobre 2026" / "October 2026".
pub fn month_year(date: NaiveDate, locale: Locale) -> String {
    format!("{} {}", month_name(date, locale), date.year())
}
