//! XSD built-in scalar format predicates
//!
//! Pure lexical checks for the built-in types a schema can name at its
//! leaves. The validator passes scalar leaves through untouched by default
//! and only consults these predicates in strict mode, so every predicate
//! here answers one question: does this text match the type's lexical
//! space?

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?P(\d+Y)?(\d+M)?(\d+W)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$").unwrap()
});

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
        .unwrap()
});

static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap());

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d{4,})-(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

static G_YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d{4,})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

static G_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d{4,})(Z|[+-]\d{2}:\d{2})?$").unwrap());

static G_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

static G_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^---(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

static G_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^--(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

static NCNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-.]*$").unwrap());

/// Check a text value against a built-in type's lexical space
///
/// Returns `None` when the type name is not a known built-in.
pub fn check(type_name: &str, value: &str) -> Option<bool> {
    let ok = match type_name {
        "string" | "normalizedString" | "token" | "anyURI" => true,
        "boolean" => is_boolean(value),
        "decimal" => is_decimal(value),
        "float" => value.parse::<f32>().is_ok(),
        "double" => value.parse::<f64>().is_ok(),
        "integer" | "long" => value.parse::<i64>().is_ok(),
        "int" => value.parse::<i32>().is_ok(),
        "short" => value.parse::<i16>().is_ok(),
        "byte" => value.parse::<i8>().is_ok(),
        "nonNegativeInteger" | "unsignedLong" => value.parse::<u64>().is_ok(),
        "unsignedInt" => value.parse::<u32>().is_ok(),
        "unsignedShort" => value.parse::<u16>().is_ok(),
        "unsignedByte" => value.parse::<u8>().is_ok(),
        "positiveInteger" => value.parse::<u64>().map(|n| n > 0).unwrap_or(false),
        "nonPositiveInteger" => value.parse::<i64>().map(|n| n <= 0).unwrap_or(false),
        "negativeInteger" => value.parse::<i64>().map(|n| n < 0).unwrap_or(false),
        "duration" => is_duration(value),
        "dateTime" => is_date_time(value),
        "time" => is_time(value),
        "date" => is_date(value),
        "gYearMonth" => is_g_year_month(value),
        "gYear" => G_YEAR.is_match(value),
        "gMonthDay" => is_g_month_day(value),
        "gDay" => is_g_day(value),
        "gMonth" => is_g_month(value),
        "hexBinary" => is_hex_binary(value),
        "base64Binary" => BASE64.decode(value).is_ok(),
        "QName" => is_qname(value),
        _ => return None,
    };
    Some(ok)
}

/// xsd:boolean lexical space
pub fn is_boolean(value: &str) -> bool {
    matches!(value, "true" | "false" | "1" | "0")
}

/// xsd:decimal lexical space
pub fn is_decimal(value: &str) -> bool {
    Decimal::from_str(value).is_ok()
}

/// xsd:duration: `PnYnMnDTnHnMnS`, at least one component, no dangling `T`
pub fn is_duration(value: &str) -> bool {
    let Some(caps) = DURATION.captures(value) else {
        return false;
    };
    let date_part = (1..=4).any(|i| caps.get(i).is_some());
    let t_present = caps.get(5).is_some();
    let time_part = caps.get(6).is_some() || caps.get(7).is_some() || caps.get(8).is_some();
    if t_present && !time_part {
        return false;
    }
    date_part || time_part
}

/// xsd:dateTime: lexical pattern plus calendar validity; `24:00:00` is
/// accepted as the end-of-day instant
pub fn is_date_time(value: &str) -> bool {
    let Some(caps) = DATE_TIME.captures(value) else {
        return false;
    };
    valid_date_fields(&caps[1], &caps[2], &caps[3])
        && valid_time_fields(&caps[4], &caps[5], &caps[6], caps.get(7).map(|m| m.as_str()))
}

/// xsd:time
pub fn is_time(value: &str) -> bool {
    let Some(caps) = TIME.captures(value) else {
        return false;
    };
    valid_time_fields(&caps[1], &caps[2], &caps[3], caps.get(4).map(|m| m.as_str()))
}

/// xsd:date: lexical pattern plus calendar validity
pub fn is_date(value: &str) -> bool {
    let Some(caps) = DATE.captures(value) else {
        return false;
    };
    valid_date_fields(&caps[1], &caps[2], &caps[3])
}

/// xsd:gYearMonth
pub fn is_g_year_month(value: &str) -> bool {
    let Some(caps) = G_YEAR_MONTH.captures(value) else {
        return false;
    };
    in_range(&caps[2], 1, 12)
}

/// xsd:gMonthDay
pub fn is_g_month_day(value: &str) -> bool {
    let Some(caps) = G_MONTH_DAY.captures(value) else {
        return false;
    };
    in_range(&caps[1], 1, 12) && in_range(&caps[2], 1, 31)
}

/// xsd:gDay
pub fn is_g_day(value: &str) -> bool {
    let Some(caps) = G_DAY.captures(value) else {
        return false;
    };
    in_range(&caps[1], 1, 31)
}

/// xsd:gMonth
pub fn is_g_month(value: &str) -> bool {
    let Some(caps) = G_MONTH.captures(value) else {
        return false;
    };
    in_range(&caps[1], 1, 12)
}

/// xsd:hexBinary: an even number of hex digits
pub fn is_hex_binary(value: &str) -> bool {
    value.len() % 2 == 0 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// xsd:QName: optional NCName prefix, NCName local part
pub fn is_qname(value: &str) -> bool {
    match value.split_once(':') {
        Some((prefix, local)) => NCNAME.is_match(prefix) && NCNAME.is_match(local),
        None => NCNAME.is_match(value),
    }
}

fn valid_date_fields(year: &str, month: &str, day: &str) -> bool {
    let Ok(year) = year.parse::<i32>() else {
        return false;
    };
    if year == 0 {
        return false;
    }
    let (Ok(month), Ok(day)) = (month.parse::<u32>(), day.parse::<u32>()) else {
        return false;
    };
    chrono::NaiveDate::from_ymd_opt(year, month, day).is_some()
}

fn valid_time_fields(hour: &str, minute: &str, second: &str, fraction: Option<&str>) -> bool {
    let (Ok(h), Ok(m), Ok(s)) = (
        hour.parse::<u32>(),
        minute.parse::<u32>(),
        second.parse::<u32>(),
    ) else {
        return false;
    };
    if h == 24 {
        return m == 0 && s == 0 && fraction.is_none();
    }
    chrono::NaiveTime::from_hms_opt(h, m, s).is_some()
}

fn in_range(field: &str, lo: u32, hi: u32) -> bool {
    field.parse::<u32>().map(|n| (lo..=hi).contains(&n)).unwrap_or(false)
}
