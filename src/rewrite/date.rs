//! Date-template expansion.
//!
//! Templates embed `{{pattern}}` placeholders. Each pattern is a moment.js-style
//! format string (`YYYY-MM-DD`, `MMMM Do`, `[week] WW`, ...) rendered against the
//! reference date. Supported tokens:
//!
//! | token | output | token | output |
//! |---|---|---|---|
//! | `YYYY` / `YY` | 2023 / 23 | `Q` | quarter 1-4 |
//! | `MMMM` / `MMM` | May / May | `MM` / `M` | 05 / 5 |
//! | `DDDD` / `DDD` | day of year padded / plain | `DD` / `D` / `Do` | 01 / 1 / 1st |
//! | `dddd` / `ddd` / `dd` | Monday / Mon / Mo | `d` / `E` | weekday 0-6 (Sun=0) / ISO 1-7 |
//! | `WW` / `W` | ISO week padded / plain | `GGGG` | ISO week year |
//! | `HH` / `H` | 24h hour | `hh` / `h` | 12h hour |
//! | `kk` / `k` | 1-24 hour | `mm` / `m` | minutes |
//! | `ss` / `s` | seconds | `SSS` | milliseconds |
//! | `A` / `a` | AM / am | `X` / `x` | unix seconds / millis |
//! | `ZZ` / `Z` | +0200 / +02:00 | `[text]` | literal text |
//!
//! Any other character is copied through unchanged.

use chrono::{DateTime, Datelike, Local, Timelike};
use regex::Regex;
use std::sync::LazyLock;

static DATE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

// Longest tokens first so `YYYY` wins over `YY`.
const TOKENS: &[&str] = &[
    "YYYY", "GGGG", "MMMM", "DDDD", "dddd", "MMM", "DDD", "ddd", "SSS", "YY", "MM", "Do", "DD",
    "dd", "WW", "HH", "hh", "kk", "mm", "ss", "ZZ", "M", "D", "d", "E", "W", "H", "h", "k", "m",
    "s", "Q", "A", "a", "X", "x", "Z",
];

/// Replace every `{{pattern}}` in `template` by `date` formatted with that pattern.
/// Falls back to the current instant when no reference date is known.
pub fn expand_date_template(template: &str, date: Option<&DateTime<Local>>) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }
    let now;
    let date = match date {
        Some(d) => d,
        None => {
            now = Local::now();
            &now
        }
    };
    DATE_PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| format_moment(date, &caps[1]))
        .into_owned()
}

/// Render `date` with a moment-style `pattern`.
pub fn format_moment(date: &DateTime<Local>, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }
        match TOKENS.iter().find(|t| rest.starts_with(**t)) {
            Some(token) => {
                out.push_str(&render_token(date, token));
                rest = &rest[token.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

fn render_token(date: &DateTime<Local>, token: &str) -> String {
    match token {
        "YYYY" => format!("{:04}", date.year()),
        "YY" => format!("{:02}", date.year().rem_euclid(100)),
        "GGGG" => format!("{:04}", date.iso_week().year()),
        "Q" => ((date.month0() / 3) + 1).to_string(),
        "MMMM" => date.format("%B").to_string(),
        "MMM" => date.format("%b").to_string(),
        "MM" => format!("{:02}", date.month()),
        "M" => date.month().to_string(),
        "DDDD" => format!("{:03}", date.ordinal()),
        "DDD" => date.ordinal().to_string(),
        "DD" => format!("{:02}", date.day()),
        "D" => date.day().to_string(),
        "Do" => ordinal(date.day()),
        "dddd" => date.format("%A").to_string(),
        "ddd" => date.format("%a").to_string(),
        "dd" => date.format("%a").to_string().chars().take(2).collect(),
        "d" => date.weekday().num_days_from_sunday().to_string(),
        "E" => date.weekday().number_from_monday().to_string(),
        "WW" => format!("{:02}", date.iso_week().week()),
        "W" => date.iso_week().week().to_string(),
        "HH" => format!("{:02}", date.hour()),
        "H" => date.hour().to_string(),
        "hh" => format!("{:02}", date.hour12().1),
        "h" => date.hour12().1.to_string(),
        "kk" => format!("{:02}", if date.hour() == 0 { 24 } else { date.hour() }),
        "k" => (if date.hour() == 0 { 24 } else { date.hour() }).to_string(),
        "mm" => format!("{:02}", date.minute()),
        "m" => date.minute().to_string(),
        "ss" => format!("{:02}", date.second()),
        "s" => date.second().to_string(),
        "SSS" => format!("{:03}", date.timestamp_subsec_millis()),
        "A" => date.format("%p").to_string(),
        "a" => date.format("%P").to_string(),
        "X" => date.timestamp().to_string(),
        "x" => date.timestamp_millis().to_string(),
        "ZZ" => date.format("%z").to_string(),
        "Z" => date.format("%:z").to_string(),
        other => other.to_string(),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
