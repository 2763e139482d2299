use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::{Result, ValidationError};

/// Parses a submitted amount. Blank or non-numeric input is rejected rather
/// than silently read as zero.
pub fn parse_amount(raw: Option<&str>) -> Result<Decimal> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ValidationError::MissingField("amount".to_string()).into());
    }
    Ok(Decimal::from_str(value)?)
}

/// Whole currency units of `amount`, dropping any fraction. Preferences store
/// integers only.
pub fn whole_units(amount: Decimal) -> Result<i64> {
    amount.trunc().to_i64().ok_or_else(|| {
        ValidationError::InvalidInput(format!("amount {} is out of range", amount)).into()
    })
}

/// Form checkbox semantics: the flag is on when the value is the integer 1.
pub fn is_flag_set(raw: Option<&str>) -> bool {
    raw.and_then(|v| v.trim().parse::<i64>().ok()) == Some(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_amounts() {
        assert_eq!(parse_amount(Some("250")).unwrap(), dec!(250));
        assert_eq!(parse_amount(Some(" 12.50 ")).unwrap(), dec!(12.50));
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert!(matches!(
            parse_amount(None),
            Err(crate::Error::Validation(ValidationError::MissingField(_)))
        ));
        assert!(matches!(
            parse_amount(Some("abc")),
            Err(crate::Error::Validation(ValidationError::DecimalParse(_)))
        ));
    }

    #[test]
    fn whole_units_truncates() {
        assert_eq!(whole_units(dec!(1500)).unwrap(), 1500);
        assert_eq!(whole_units(dec!(1500.99)).unwrap(), 1500);
        assert_eq!(whole_units(dec!(-3.7)).unwrap(), -3);
    }

    #[test]
    fn flags() {
        assert!(is_flag_set(Some("1")));
        assert!(!is_flag_set(Some("0")));
        assert!(!is_flag_set(Some("on")));
        assert!(!is_flag_set(None));
    }
}
