//! Display formatting
//!
//! Currency grouping, signed percentages and local times. Absent values
//! render as `PLACEHOLDER`.

use chrono::{DateTime, Local, NaiveDateTime};

pub const PLACEHOLDER: &str = "—";

/// Plain number with at most two decimals, trailing zeros dropped
pub fn number(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Number with thousands separators: 117640.5 -> "117,640.5"
pub fn grouped(value: f64) -> String {
    let plain = number(value);
    if plain == PLACEHOLDER {
        return plain;
    }
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::with_capacity(plain.len() + digits.len() / 3);
    out.push_str(sign);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

pub fn currency(value: f64) -> String {
    match grouped(value) {
        s if s == PLACEHOLDER => s,
        s => match s.strip_prefix('-') {
            Some(rest) => format!("-${}", rest),
            None => format!("${}", s),
        },
    }
}

/// `+1.2%` / `-0.5%`; zero counts as a gain
pub fn signed_percent(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{}%", sign, number(value))
}

pub fn percent(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("{}%", number(value))
}

pub fn opt_with<F>(value: Option<f64>, f: F) -> String
where
    F: Fn(f64) -> String,
{
    value.map(f).unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn opt_text(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Parse a backend timestamp. Naive ISO timestamps are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().with_timezone(&Local))
}

/// Local time of day, falling back to the raw text when unparseable
pub fn local_time(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_timestamp(raw)
            .map(|dt| clock(&dt))
            .unwrap_or_else(|| raw.to_string()),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn clock(dt: &DateTime<Local>) -> String {
    dt.format("%H:%M:%S").to_string()
}

pub fn date_time(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
