//! Value formatting driven by field metadata
//!
//! Number output follows the en-US conventions the charts have always shown:
//! comma thousands separators, `.` decimal point, rounding half away from
//! zero.

use std::fmt;

use chart_interact_shared::{DataType, FieldMetadataSet};
use serde_json::Value;

/// Field name whose values are already formatted upstream
pub const PERCENTAGE_FIELD: &str = "percentage";

pub const DEFAULT_LABEL_LENGTH: usize = 25;

const ELLIPSIS: &str = "...";

/// Result of metadata-driven formatting.
///
/// `Raw` carries the input through untouched (percentage fields, unknown
/// types, unknown fields) so callers can tell passthrough from formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Empty,
    Text(String),
    Raw(Value),
}

impl DisplayValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, DisplayValue::Empty)
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Empty => Ok(()),
            DisplayValue::Text(text) => f.write_str(text),
            DisplayValue::Raw(value) => f.write_str(&plain_value(value)),
        }
    }
}

/// Formats values for one chart using its field metadata
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter<'a> {
    metadata: &'a FieldMetadataSet,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(metadata: &'a FieldMetadataSet) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &'a FieldMetadataSet {
        self.metadata
    }

    pub fn format(&self, value: &Value, field: &str) -> DisplayValue {
        format_by_metadata(value, field, self.metadata)
    }

    pub fn display_name<'b>(&self, physical_name: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.metadata.display_name(physical_name)
    }
}

/// Abbreviate large numbers with K/M suffixes.
///
/// `1_500_000.0` renders as `1.5M`, `2_300.0` as `2.3K`, anything below a
/// thousand as a grouped number.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", to_fixed(value / 1_000_000.0, 1))
    } else if value >= 1_000.0 {
        format!("{}K", to_fixed(value / 1_000.0, 1))
    } else {
        format_grouped(value, 0, 3)
    }
}

/// Format a raw value according to the metadata entry of `field`.
///
/// Fields absent from the metadata pass through unchanged (with a warning)
/// instead of failing the tooltip that asked for them.
pub fn format_by_metadata(value: &Value, field: &str, metadata: &FieldMetadataSet) -> DisplayValue {
    match value {
        Value::Null => return DisplayValue::Empty,
        Value::String(s) if s.is_empty() => return DisplayValue::Empty,
        _ => {}
    }

    if field == PERCENTAGE_FIELD {
        return DisplayValue::Raw(value.clone());
    }

    let Some(entry) = metadata.find(field) else {
        log::warn!("No field metadata for '{field}', showing raw value");
        return DisplayValue::Raw(value.clone());
    };

    let digits = match entry.data_type {
        DataType::Integer => 0,
        DataType::Float => 1,
        _ => return DisplayValue::Raw(value.clone()),
    };

    match numeric(value) {
        Some(number) => DisplayValue::Text(format_grouped(number, digits, digits)),
        None => {
            log::debug!("Value {value} of '{field}' is not numeric, showing raw value");
            DisplayValue::Raw(value.clone())
        }
    }
}

/// Cut `text` to `max_length` characters followed by `...`.
pub fn truncate_label(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Group the integer part with commas and keep between `min_fraction` and
/// `max_fraction` decimal places (trailing zeros beyond the minimum dropped).
pub fn format_grouped(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = to_fixed(value.abs(), max_fraction);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (fixed.as_str(), ""),
    };

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_fraction {
        frac.push('0');
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac.bytes().all(|b| b == b'0');
    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// `Number.prototype.toFixed`: the exact binary value rounded to `digits`
/// places, exact halves away from zero.
fn to_fixed(value: f64, digits: usize) -> String {
    let magnitude = value.abs();
    let fixed = if is_halfway(magnitude, digits) {
        // Exact here: the expansion ends with the 5 being rounded
        let exact = format!("{magnitude:.prec$}", prec = digits + 1);
        increment_last_digit(exact[..exact.len() - 1].trim_end_matches('.'))
    } else {
        format!("{magnitude:.digits$}")
    };

    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        format!("-{fixed}")
    } else {
        fixed
    }
}

/// Whether `magnitude` sits exactly halfway between two `digits`-place
/// decimals. With `magnitude = m * 2^e`, `magnitude * 10^digits` is
/// `m * 5^digits / 2^(-e - digits)`, a half-integer exactly when `m` has
/// one fewer trailing zero than that power of two.
fn is_halfway(magnitude: f64, digits: usize) -> bool {
    if !magnitude.is_finite() || magnitude == 0.0 {
        return false;
    }
    let bits = magnitude.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };

    let shift = -exponent - digits as i32;
    shift >= 1 && mantissa.trailing_zeros() as i32 == shift - 1
}

/// Add one unit in the last place of a plain decimal string
fn increment_last_digit(decimal: &str) -> String {
    let mut bytes = decimal.as_bytes().to_vec();
    let mut carry = true;
    for byte in bytes.iter_mut().rev() {
        match *byte {
            b'.' => {}
            b'9' => *byte = b'0',
            _ => {
                *byte += 1;
                carry = false;
                break;
            }
        }
    }

    let mut out = String::with_capacity(bytes.len() + 1);
    if carry {
        out.push('1');
    }
    out.extend(bytes.into_iter().map(char::from));
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// How a JSON value reads when dropped into text, without JSON quoting.
pub fn plain_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
