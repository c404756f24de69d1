/// Format a Rupiah amount for display: "Rp 60.000"
/// Dot-grouped thousands, comma decimal separator (id-ID conventions).
pub fn format_idr(value: f64) -> String {
    format_idr_with(value, 0)
}

/// Format a Rupiah amount with a fixed number of fraction digits.
/// Non-finite input renders as "Rp 0" rather than propagating NaN.
pub fn format_idr_with(value: f64, fraction_digits: u32) -> String {
    if !value.is_finite() {
        return "Rp 0".to_string();
    }

    let scale = 10u64.pow(fraction_digits) as f64;
    let scaled = (value.abs() * scale).round();
    let negative = value < 0.0 && scaled > 0.0;

    let whole = (scaled / scale).trunc() as u64;
    let fraction = (scaled as u64) % (scale as u64).max(1);

    let mut grouped = String::new();
    let digits = whole.to_string();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str("Rp ");
    out.push_str(&grouped);
    if fraction_digits > 0 {
        out.push(',');
        out.push_str(&format!("{:0width$}", fraction, width = fraction_digits as usize));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_idr() {
        assert_eq!(format_idr(60000.0), "Rp 60.000");
        assert_eq!(format_idr(0.0), "Rp 0");
        assert_eq!(format_idr(999.0), "Rp 999");
        assert_eq!(format_idr(1000.0), "Rp 1.000");
        assert_eq!(format_idr(1234567.0), "Rp 1.234.567");
    }

    #[test]
    fn test_format_idr_rounds() {
        assert_eq!(format_idr(59999.6), "Rp 60.000");
        assert_eq!(format_idr_with(1234.5, 1), "Rp 1.234,5");
        assert_eq!(format_idr_with(1000.0, 2), "Rp 1.000,00");
    }

    #[test]
    fn test_format_idr_negative() {
        assert_eq!(format_idr(-60000.0), "-Rp 60.000");
        // -0.4 rounds to zero, which carries no sign.
        assert_eq!(format_idr(-0.4), "Rp 0");
    }

    #[test]
    fn test_format_idr_non_finite() {
        assert_eq!(format_idr(f64::NAN), "Rp 0");
        assert_eq!(format_idr(f64::INFINITY), "Rp 0");
        assert_eq!(format_idr_with(f64::NEG_INFINITY, 2), "Rp 0");
    }
}
