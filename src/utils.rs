//! Small text helpers shared by the converter and the NASA Ames writer.

/// Formats a number like the C/Python `%g` conversion.
///
/// `precision` is the number of significant digits (0 is treated as 1).
/// Fixed notation is used when the decimal exponent `x` satisfies
/// `-4 <= x < precision`, scientific notation otherwise. Trailing zeros and a
/// trailing decimal point are removed in both notations.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let precision = precision.max(1);
    // `{:e}` rounds to the requested digits first, so the exponent already
    // accounts for carries such as 999999.7 -> 1.00000e6.
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent >= -4 && exponent < precision as i32 {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    }
}

fn strip_trailing_zeros(number: &str) -> String {
    if number.contains('.') {
        number
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        number.to_string()
    }
}

/// Replaces every non-ASCII character with `?`.
pub fn to_ascii_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

/// Makes an attribute value fit on one ASCII header line.
pub fn to_header_line(text: &str) -> String {
    let flattened: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    to_ascii_lossy(&flattened)
}
