use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::VentureLinkError;
use crate::types::{pct, Money, Percent};
use crate::VentureLinkResult;

/// Compounding factor `(1 + rate/100)^periods`.
///
/// Integer exponentiation keeps the factor exact to Decimal precision, so
/// year-N factors match the closed form rather than a repeated product.
pub fn compound_factor(rate: Percent, periods: u32) -> VentureLinkResult<Decimal> {
    let base = Decimal::ONE + pct(rate);
    if base <= Decimal::ZERO {
        return Err(VentureLinkError::invalid(
            "discount_rate",
            "Rate must be greater than -100%",
        ));
    }

    let factor = base
        .checked_powi(i64::from(periods))
        .ok_or_else(|| {
            VentureLinkError::invalid(
                "projection_years",
                format!("Compounding factor overflows at {periods} periods"),
            )
        })?;

    if factor.is_zero() {
        return Err(VentureLinkError::invalid(
            "projection_years",
            format!("Compounding factor underflows to zero at {periods} periods"),
        ));
    }

    Ok(factor)
}

/// Present value of `amount` received `periods` years out, discounted at
/// `rate` percent.
pub fn present_value(amount: Money, rate: Percent, periods: u32) -> VentureLinkResult<Money> {
    let factor = compound_factor(rate, periods)?;
    amount.checked_div(factor).ok_or_else(|| {
        VentureLinkError::invalid("discount_rate", "Discounted value exceeds the supported range")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_factor_zero_periods_is_one() {
        assert_eq!(compound_factor(dec!(12), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_compound_factor_exact() {
        // 1.12^3 = 1.404928
        assert_eq!(compound_factor(dec!(12), 3).unwrap(), dec!(1.404928));
    }

    #[test]
    fn test_compound_factor_negative_rate() {
        // 0.9^2 = 0.81
        assert_eq!(compound_factor(dec!(-10), 2).unwrap(), dec!(0.81));
    }

    #[test]
    fn test_compound_factor_rejects_total_loss_rate() {
        assert!(compound_factor(dec!(-100), 1).is_err());
        assert!(compound_factor(dec!(-150), 1).is_err());
    }

    #[test]
    fn test_compound_factor_overflow_is_error() {
        assert!(compound_factor(dec!(100), 200).is_err());
    }

    #[test]
    fn test_present_value() {
        // 112 one year out at 12% is worth 100 today
        assert_eq!(present_value(dec!(112), dec!(12), 1).unwrap(), dec!(100));
    }

    #[test]
    fn test_present_value_overflow_is_error() {
        // 0.01^10 = 1e-20 leaves no room for a 1e20 amount
        let err = present_value(dec!(100000000000000000000), dec!(-99), 10).unwrap_err();
        assert!(matches!(
            err,
            VentureLinkError::InvalidInput { ref field, .. } if field == "discount_rate"
        ));
    }
}
