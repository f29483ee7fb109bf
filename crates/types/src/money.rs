//! Amount rounding and display formatting.
//!
//! Amounts are plain `f64` values rounded to whole currency units at the
//! line-item boundary; formatting inserts thousands separators for the
//! rendered table and totals box.

/// Rounds to the nearest whole currency unit, halves away from zero.
pub fn round_amount(value: f64) -> f64 {
    value.round()
}

/// Formats an amount with thousands separators, e.g. `1237500.0` -> `"1,237,500"`.
///
/// Negative amounts keep a leading minus sign. Fractional parts are dropped
/// after rounding since amounts are whole units by the time they render.
pub fn format_amount(value: f64) -> String {
    let rounded = round_amount(value) as i64;
    let negative = rounded < 0;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    let first_group = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - first_group) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fractional tax rate as a rounded percentage, e.g. `0.1` -> `"10%"`.
pub fn format_rate(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as i64)
}

/// Formats a quantity, trimming a trailing `.0` for whole values.
pub fn format_quantity(quantity: f64) -> String {
    if (quantity - quantity.round()).abs() < f64::EPSILON {
        format!("{}", quantity as i64)
    } else {
        format!("{:.2}", quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_thousands_separators() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(450.0), "450");
        assert_eq!(format_amount(1500.0), "1,500");
        assert_eq!(format_amount(1125000.0), "1,125,000");
        assert_eq!(format_amount(1237500.0), "1,237,500");
        assert_eq!(format_amount(-45000.0), "-45,000");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_amount(2.5), 3.0);
        assert_eq!(round_amount(-2.5), -3.0);
        assert_eq!(round_amount(2.4), 2.0);
    }

    #[test]
    fn formats_rates_as_rounded_percent() {
        assert_eq!(format_rate(0.1), "10%");
        assert_eq!(format_rate(0.08), "8%");
        assert_eq!(format_rate(0.1025), "10%");
    }

    #[test]
    fn formats_quantities() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.5), "2.50");
    }
}
