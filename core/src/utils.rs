use std::fmt;

use num_enum::TryFromPrimitive;

pub fn compute_crc32(data: &[u8]) -> u32 {
    use crc32fast::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Drop trailing `0x00` bytes (symbol padding).
pub fn strip_trailing_nulls(data: &[u8]) -> &[u8] {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &data[..end]
}

/// Hex preview of the first `max` bytes, for diagnostics.
pub fn hex_preview(data: &[u8], max: usize) -> String {
    let shown = &data[..data.len().min(max)];
    if data.len() > max {
        format!("{}…", hex::encode(shown))
    } else {
        hex::encode(shown)
    }
}

/// Format a decimal amount string as `1'234'567.89` (Swiss grouping, two decimals).
/// Unparseable input is returned unchanged.
pub fn format_amount(raw: &str) -> String {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return raw.to_string();
    };
    format_amount_value(value)
}

pub fn format_amount_value(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('\'');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
