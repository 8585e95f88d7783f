//! Presentation rounding and Korean won formatting.
//!
//! Nothing here feeds back into the engine: rounding happens once, on the
//! way out, over values that were accumulated at full precision.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;

use super::dcf::DcfYearProjection;

const JO: Decimal = dec!(1_000_000_000_000);
const EOK: Decimal = dec!(100_000_000);
const MAN: Decimal = dec!(10_000);

/// Rounded view of one forecast year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayYear {
    pub year: u32,
    pub free_cash_flow: Money,
    /// Three decimal places
    pub discount_factor: Decimal,
    pub present_value: Money,
}

/// Whole-unit figures for presentation, plus KRW labels for the headline values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfDisplay {
    pub sum_of_present_values: Money,
    pub terminal_value_present: Money,
    pub enterprise_value: Money,
    pub equity_value: Money,
    pub per_share_value: Money,
    pub enterprise_value_krw: String,
    pub equity_value_krw: String,
    pub per_share_value_krw: String,
    pub projections: Vec<DisplayYear>,
}

impl DcfDisplay {
    pub(crate) fn new(
        projections: &[DcfYearProjection],
        sum_of_present_values: Money,
        terminal_value_present: Money,
        enterprise_value: Money,
        equity_value: Money,
        per_share_value: Money,
    ) -> Self {
        Self {
            sum_of_present_values: round_currency(sum_of_present_values),
            terminal_value_present: round_currency(terminal_value_present),
            enterprise_value: round_currency(enterprise_value),
            equity_value: round_currency(equity_value),
            per_share_value: round_currency(per_share_value),
            enterprise_value_krw: format_krw(enterprise_value),
            equity_value_krw: format_krw(equity_value),
            per_share_value_krw: format_krw(per_share_value),
            projections: projections
                .iter()
                .map(|p| DisplayYear {
                    year: p.year,
                    free_cash_flow: round_currency(p.free_cash_flow),
                    discount_factor: round_half_up(p.discount_factor, 3),
                    present_value: round_currency(p.present_value),
                })
                .collect(),
        }
    }
}

/// Round to the nearest whole currency unit, halves away from zero.
pub fn round_currency(value: Money) -> Money {
    round_half_up(value, 0)
}

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // Drop the sign of a negative zero
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Format an amount in Korean won using the largest fitting unit.
///
/// - `>= 1e12`: 조원, one decimal
/// - `>= 1e8`: 억원, integer
/// - `>= 1e4`: 만원, integer
/// - otherwise the integer amount with `,` grouping and 원
pub fn format_krw(amount: Money) -> String {
    if amount >= JO {
        format!("{:.1}조원", round_half_up(amount / JO, 1))
    } else if amount >= EOK {
        format!("{}억원", round_half_up(amount / EOK, 0))
    } else if amount >= MAN {
        format!("{}만원", round_half_up(amount / MAN, 0))
    } else {
        format!("{}원", group_thousands(round_currency(amount)))
    }
}

fn group_thousands(value: Decimal) -> String {
    let digits = value.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value.is_sign_negative() && !value.is_zero() {
        grouped.insert(0, '-');
    }
    grouped
}
