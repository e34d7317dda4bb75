//! Display formatting shared by the on-screen preview and the PDF
//!
//! Amounts always print with two decimals and a comma separator, independent
//! of the system locale.

/// Format an amount as `1234,50`
pub fn format_amount(value: f64) -> String {
    // -0.0 would otherwise print with a sign
    let value = if value == 0.0 { 0.0 } else { value };

    // Exact ties at the third decimal (x.xx5) only exist for odd multiples of
    // 1/8; round those away from zero instead of to even.
    let eighths = value * 8.0;
    let value = if eighths.fract() == 0.0 && eighths.abs() % 2.0 == 1.0 {
        value + value.signum() * 0.0005
    } else {
        value
    };

    format!("{:.2}", value).replace('.', ",")
}

/// Format an amount with the euro sign: `€1234,50`
pub fn format_currency(value: f64) -> String {
    format!("€{}", format_amount(value))
}

/// Format a discount rate the way it was entered: `50`, `12.5`
pub fn format_percent(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_amount_pads_to_two_decimals() {
        assert_eq!(format_amount(1234.5), "1234,50");
        assert_eq!(format_amount(0.0), "0,00");
        assert_eq!(format_amount(224.0), "224,00");
    }

    #[test]
    fn test_format_amount_rounds() {
        assert_eq!(format_amount(334.8), "334,80");
        assert_eq!(format_amount(99.999), "100,00");
        assert_eq!(format_amount(0.004), "0,00");
    }

    #[test]
    fn test_format_amount_ties_round_away_from_zero() {
        assert_eq!(format_amount(0.125), "0,13");
        assert_eq!(format_amount(2.375), "2,38");
        assert_eq!(format_amount(-0.125), "-0,13");
    }

    #[test]
    fn test_format_amount_has_no_negative_zero() {
        assert_eq!(format_amount(-0.0), "0,00");
    }

    #[test]
    fn test_no_thousands_separator() {
        assert_eq!(format_amount(1_234_567.891), "1234567,89");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(124.0), "€124,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(50.0), "50");
        assert_eq!(format_percent(12.5), "12.5");
    }
}
