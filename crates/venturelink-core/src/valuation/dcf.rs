use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::VentureLinkError;
use crate::time_value::{compound_factor, present_value};
use crate::types::{pct, with_metadata, ComputationOutput, Money, Percent};
use crate::VentureLinkResult;

use super::display::DcfDisplay;

/// Terminal value share of EV above which the explicit horizon is flagged as too short.
const TERMINAL_VALUE_WARNING_PCT: Decimal = dec!(0.75);

/// Longest explicit forecast accepted. Beyond this, compounding leaves the
/// Decimal range for any realistic rate anyway.
pub const MAX_PROJECTION_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Financial assumptions for a single DCF valuation.
///
/// Rates are percentages (20 = 20%). Built once per request by the form
/// boundary; the engine never fills in missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfInput {
    /// Current (year 0) revenue
    pub current_revenue: Money,
    /// Annual revenue growth; may be negative
    pub revenue_growth_rate: Percent,
    /// Operating income as a percentage of revenue
    pub operating_margin: Percent,
    /// Tax on operating income
    pub tax_rate: Percent,
    /// Capital expenditure as a percentage of revenue
    pub capex_ratio: Percent,
    /// Working capital as a percentage of revenue, scaled by growth
    pub working_capital_ratio: Percent,
    /// Discount rate (WACC)
    pub discount_rate: Percent,
    /// Perpetual growth after the explicit horizon
    pub terminal_growth_rate: Percent,
    /// Number of explicit forecast years
    pub projection_years: u32,
    /// Shares outstanding for the per-share value
    pub total_shares: u64,
    /// Debt minus cash; negative for a net cash position
    pub net_debt: Money,
}

/// One explicit forecast year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfYearProjection {
    pub year: u32,
    pub revenue: Money,
    pub operating_income: Money,
    pub nopat: Money,
    pub capex: Money,
    pub working_capital_investment: Money,
    pub free_cash_flow: Money,
    /// `(1 + discount_rate/100)^year`
    pub discount_factor: Decimal,
    pub present_value: Money,
}

/// Output of the DCF valuation. All currency fields are unrounded; `display`
/// carries the presentation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfOutput {
    /// Year-by-year projections, year 1 first
    pub projections: Vec<DcfYearProjection>,
    /// Sum of present values of the explicit-period FCFs
    pub sum_of_present_values: Money,
    /// Undiscounted Gordon growth terminal value at the end of the horizon
    pub terminal_value: Money,
    /// Terminal value discounted to today
    pub terminal_value_present: Money,
    /// Enterprise value = PV(FCFs) + PV(TV)
    pub enterprise_value: Money,
    /// Equity value = EV - net debt
    pub equity_value: Money,
    /// Equity value per share
    pub per_share_value: Money,
    /// Discounted terminal value as a fraction of enterprise value
    pub terminal_value_pct: Decimal,
    /// Rounded, human-readable figures
    pub display: DcfDisplay,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a single-stage FCF projection with a Gordon growth terminal value.
pub fn calculate_dcf(input: &DcfInput) -> VentureLinkResult<ComputationOutput<DcfOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_dcf_input(input)?;

    // --- Project cash flows ---
    let projections = build_projections(input)?;

    let sum_of_present_values = projections
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| add(acc, p.present_value, "current_revenue"))?;
    let last = projections.last().ok_or_else(|| {
        VentureLinkError::invalid("projection_years", "No projection years generated")
    })?;

    // --- Terminal value ---
    let (terminal_value, terminal_value_present) =
        compute_terminal_value(input, last.free_cash_flow)?;

    // --- Enterprise value ---
    let enterprise_value = add(sum_of_present_values, terminal_value_present, "current_revenue")?;

    let terminal_value_pct = if enterprise_value.is_zero() {
        Decimal::ZERO
    } else {
        div(terminal_value_present, enterprise_value, "net_debt")?
    };
    if terminal_value_pct > TERMINAL_VALUE_WARNING_PCT {
        warnings.push(format!(
            "Terminal value represents {:.1}% of enterprise value; consider extending the projection horizon",
            mul(terminal_value_pct, dec!(100), "terminal_growth_rate")?
        ));
    }

    if input.revenue_growth_rate < Decimal::ZERO && !input.working_capital_ratio.is_zero() {
        warnings.push(
            "Negative revenue growth makes working capital investment negative (a cash release each year)"
                .into(),
        );
    }

    // --- Equity bridge ---
    let equity_value = sub(enterprise_value, input.net_debt, "net_debt")?;
    let per_share_value = div(equity_value, Decimal::from(input.total_shares), "total_shares")?;
    if equity_value < Decimal::ZERO {
        warnings.push(format!(
            "Net debt ({}) exceeds enterprise value; equity value is negative",
            input.net_debt
        ));
    }

    for w in &warnings {
        warn!(target: "venturelink::dcf", "{w}");
    }

    let display = DcfDisplay::new(
        &projections,
        sum_of_present_values,
        terminal_value_present,
        enterprise_value,
        equity_value,
        per_share_value,
    );

    let output = DcfOutput {
        projections,
        sum_of_present_values,
        terminal_value,
        terminal_value_present,
        enterprise_value,
        equity_value,
        per_share_value,
        terminal_value_pct,
        display,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    debug!(
        years = input.projection_years,
        enterprise_value = %output.enterprise_value,
        per_share_value = %output.per_share_value,
        elapsed_us = elapsed,
        "dcf valuation computed"
    );

    Ok(with_metadata(
        "FCF DCF with Gordon growth terminal value",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_dcf_input(input: &DcfInput) -> VentureLinkResult<()> {
    if input.current_revenue <= Decimal::ZERO {
        return Err(VentureLinkError::invalid(
            "current_revenue",
            "Current revenue must be positive",
        ));
    }
    if input.projection_years == 0 {
        return Err(VentureLinkError::invalid(
            "projection_years",
            "At least one projection year is required",
        ));
    }
    if input.projection_years > MAX_PROJECTION_YEARS {
        return Err(VentureLinkError::invalid(
            "projection_years",
            format!(
                "At most {MAX_PROJECTION_YEARS} projection years are supported, got {}",
                input.projection_years
            ),
        ));
    }
    if input.total_shares == 0 {
        return Err(VentureLinkError::invalid(
            "total_shares",
            "Total shares must be positive",
        ));
    }
    if input.discount_rate <= dec!(-100) {
        return Err(VentureLinkError::invalid(
            "discount_rate",
            "Discount rate must be greater than -100%",
        ));
    }

    // Gordon growth model constraint
    if input.discount_rate <= input.terminal_growth_rate {
        return Err(VentureLinkError::NonConvergentTerminalValue {
            discount_rate: input.discount_rate,
            terminal_growth_rate: input.terminal_growth_rate,
        });
    }

    Ok(())
}

/// Expects `projection_years` already bounded by `validate_dcf_input`.
fn build_projections(input: &DcfInput) -> VentureLinkResult<Vec<DcfYearProjection>> {
    let mut projections = Vec::with_capacity(input.projection_years as usize);
    let growth = pct(input.revenue_growth_rate);
    let growth_factor = add(Decimal::ONE, growth, "revenue_growth_rate")?;
    let after_tax = sub(Decimal::ONE, pct(input.tax_rate), "tax_rate")?;
    let mut revenue = input.current_revenue;

    for year in 1..=input.projection_years {
        // Grow first: every line item below uses this year's revenue.
        revenue = mul(revenue, growth_factor, "revenue_growth_rate")?;

        let operating_income = mul(revenue, pct(input.operating_margin), "operating_margin")?;
        let nopat = mul(operating_income, after_tax, "tax_rate")?;
        let capex = mul(revenue, pct(input.capex_ratio), "capex_ratio")?;
        let working_capital_investment = mul(
            mul(revenue, pct(input.working_capital_ratio), "working_capital_ratio")?,
            growth,
            "working_capital_ratio",
        )?;
        let free_cash_flow = sub(
            sub(nopat, capex, "capex_ratio")?,
            working_capital_investment,
            "working_capital_ratio",
        )?;

        let discount_factor = compound_factor(input.discount_rate, year)?;
        let present_value = div(free_cash_flow, discount_factor, "discount_rate")?;

        projections.push(DcfYearProjection {
            year,
            revenue,
            operating_income,
            nopat,
            capex,
            working_capital_investment,
            free_cash_flow,
            discount_factor,
            present_value,
        });
    }

    Ok(projections)
}

/// Gordon growth terminal value off the last explicit year's FCF, returned as
/// (undiscounted, discounted to today).
fn compute_terminal_value(
    input: &DcfInput,
    last_free_cash_flow: Money,
) -> VentureLinkResult<(Money, Money)> {
    let spread = pct(sub(
        input.discount_rate,
        input.terminal_growth_rate,
        "terminal_growth_rate",
    )?);
    if spread <= Decimal::ZERO {
        return Err(VentureLinkError::NonConvergentTerminalValue {
            discount_rate: input.discount_rate,
            terminal_growth_rate: input.terminal_growth_rate,
        });
    }

    let terminal_growth = add(
        Decimal::ONE,
        pct(input.terminal_growth_rate),
        "terminal_growth_rate",
    )?;
    let terminal_fcf = mul(last_free_cash_flow, terminal_growth, "terminal_growth_rate")?;
    let terminal_value = div(terminal_fcf, spread, "discount_rate")?;
    let terminal_value_present =
        present_value(terminal_value, input.discount_rate, input.projection_years)?;

    Ok((terminal_value, terminal_value_present))
}

// Checked Decimal arithmetic. Plain operators panic when a result leaves the
// 96-bit range; these report the input that drove it there instead.

fn overflow(field: &str) -> VentureLinkError {
    VentureLinkError::invalid(field, "Value drives the valuation outside the supported decimal range")
}

fn add(a: Decimal, b: Decimal, field: &str) -> VentureLinkResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(field))
}

fn sub(a: Decimal, b: Decimal, field: &str) -> VentureLinkResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(field))
}

fn mul(a: Decimal, b: Decimal, field: &str) -> VentureLinkResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(field))
}

fn div(a: Decimal, b: Decimal, field: &str) -> VentureLinkResult<Decimal> {
    a.checked_div(b).ok_or_else(|| overflow(field))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
