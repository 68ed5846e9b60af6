use num_bigint::BigUint;

/// Renders `value` expressed in the smallest unit with exactly `decimals` fractional digits.
pub fn format_units(value: &BigUint, decimals: u32) -> String {
    let divisor = BigUint::from(10u32).pow(decimals);
    let integer_part = value / &divisor;
    let decimal_part = value % &divisor;
    if decimals == 0 {
        return integer_part.to_string();
    }
    format!(
        "{}.{:0>width$}",
        integer_part,
        decimal_part.to_string(),
        width = decimals as usize
    )
}

pub fn format_currency(value: &BigUint, decimals: u32, currency: &str) -> String {
    format!("{} {}", format_units(value, decimals), currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(111111, 8, "0.00111111")]
    #[test_case(100_000_000, 8, "1.00000000")]
    #[test_case(123_456_789_012, 8, "1234.56789012")]
    #[test_case(0, 8, "0.00000000")]
    #[test_case(42, 0, "42")]
    fn formats_exact_units(value: u64, decimals: u32, expected: &str) {
        assert_eq!(format_units(&BigUint::from(value), decimals), expected);
    }

    #[test]
    fn formats_beyond_u128() {
        let value: BigUint = "340282366920938463463374607431768211456".parse().unwrap();
        assert_eq!(format_currency(&value, 6, "STX"), "340282366920938463463374607431768.211456 STX");
    }
}
