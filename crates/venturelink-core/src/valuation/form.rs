//! Request-side collection of DCF assumptions.
//!
//! Raw values arrive as `f64` (JSON bodies, napi) or text (HTML form fields),
//! so this is the only place NaN, infinities and non-integer counts can show
//! up. They are rejected here, and defaults are applied here, before a
//! [`DcfInput`] is built.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::VentureLinkError;
use crate::VentureLinkResult;

use super::dcf::DcfInput;

pub const DEFAULT_CURRENT_REVENUE: f64 = 1_000_000_000.0;
pub const DEFAULT_REVENUE_GROWTH_RATE: f64 = 20.0;
pub const DEFAULT_OPERATING_MARGIN: f64 = 15.0;
pub const DEFAULT_TAX_RATE: f64 = 22.0;
pub const DEFAULT_CAPEX_RATIO: f64 = 5.0;
pub const DEFAULT_WORKING_CAPITAL_RATIO: f64 = 10.0;
pub const DEFAULT_DISCOUNT_RATE: f64 = 12.0;
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 2.0;
pub const DEFAULT_PROJECTION_YEARS: f64 = 5.0;
pub const DEFAULT_TOTAL_SHARES: f64 = 1_000_000.0;
pub const DEFAULT_NET_DEBT: f64 = 0.0;

/// Partially filled valuation form. `None` means the user left the field alone.
///
/// Field names are camelCase on the wire; the calculator page's legacy names
/// (`revenue`, `revenueGrowth`, `wacc`, `terminalGrowth`) are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DcfForm {
    #[serde(default, alias = "revenue", skip_serializing_if = "Option::is_none")]
    pub current_revenue: Option<f64>,
    #[serde(default, alias = "revenueGrowth", skip_serializing_if = "Option::is_none")]
    pub revenue_growth_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capex_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_capital_ratio: Option<f64>,
    #[serde(default, alias = "wacc", skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
    #[serde(default, alias = "terminalGrowth", skip_serializing_if = "Option::is_none")]
    pub terminal_growth_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_years: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_shares: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_debt: Option<f64>,
}

impl DcfForm {
    /// The calculator's initial form state.
    pub fn default_values() -> Self {
        Self {
            current_revenue: Some(DEFAULT_CURRENT_REVENUE),
            revenue_growth_rate: Some(DEFAULT_REVENUE_GROWTH_RATE),
            operating_margin: Some(DEFAULT_OPERATING_MARGIN),
            tax_rate: Some(DEFAULT_TAX_RATE),
            capex_ratio: Some(DEFAULT_CAPEX_RATIO),
            working_capital_ratio: Some(DEFAULT_WORKING_CAPITAL_RATIO),
            discount_rate: Some(DEFAULT_DISCOUNT_RATE),
            terminal_growth_rate: Some(DEFAULT_TERMINAL_GROWTH_RATE),
            projection_years: Some(DEFAULT_PROJECTION_YEARS),
            total_shares: Some(DEFAULT_TOTAL_SHARES),
            net_debt: Some(DEFAULT_NET_DEBT),
        }
    }

    /// Build a form from named text fields, as posted by an HTML form.
    ///
    /// Blank values leave the field unspecified. Unknown names and text that
    /// is not a number are rejected.
    pub fn from_fields<'a, I>(fields: I) -> VentureLinkResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::default();
        for (name, raw) in fields {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let field = canonical_field(name).ok_or_else(|| {
                VentureLinkError::invalid(name, "Unknown valuation field")
            })?;
            let value: f64 = raw.parse().map_err(|_| {
                VentureLinkError::invalid(field, format!("'{raw}' is not a number"))
            })?;
            form.set(field, value)?;
        }
        Ok(form)
    }

    /// Set a single field by name. Accepts snake_case, camelCase and legacy names.
    pub fn set(&mut self, name: &str, value: f64) -> VentureLinkResult<()> {
        let field = canonical_field(name)
            .ok_or_else(|| VentureLinkError::invalid(name, "Unknown valuation field"))?;
        let slot = match field {
            "current_revenue" => &mut self.current_revenue,
            "revenue_growth_rate" => &mut self.revenue_growth_rate,
            "operating_margin" => &mut self.operating_margin,
            "tax_rate" => &mut self.tax_rate,
            "capex_ratio" => &mut self.capex_ratio,
            "working_capital_ratio" => &mut self.working_capital_ratio,
            "discount_rate" => &mut self.discount_rate,
            "terminal_growth_rate" => &mut self.terminal_growth_rate,
            "projection_years" => &mut self.projection_years,
            "total_shares" => &mut self.total_shares,
            _ => &mut self.net_debt,
        };
        *slot = Some(value);
        Ok(())
    }

    /// Fill every unspecified field from [`DcfForm::default_values`].
    pub fn with_defaults(self) -> Self {
        let d = Self::default_values();
        Self {
            current_revenue: self.current_revenue.or(d.current_revenue),
            revenue_growth_rate: self.revenue_growth_rate.or(d.revenue_growth_rate),
            operating_margin: self.operating_margin.or(d.operating_margin),
            tax_rate: self.tax_rate.or(d.tax_rate),
            capex_ratio: self.capex_ratio.or(d.capex_ratio),
            working_capital_ratio: self.working_capital_ratio.or(d.working_capital_ratio),
            discount_rate: self.discount_rate.or(d.discount_rate),
            terminal_growth_rate: self.terminal_growth_rate.or(d.terminal_growth_rate),
            projection_years: self.projection_years.or(d.projection_years),
            total_shares: self.total_shares.or(d.total_shares),
            net_debt: self.net_debt.or(d.net_debt),
        }
    }

    /// Apply defaults, validate, and convert into engine input.
    pub fn into_input(self) -> VentureLinkResult<DcfInput> {
        DcfInput::try_from(self.with_defaults())
    }
}

/// Strict conversion: every field must be present. Use
/// [`DcfForm::into_input`] to fill gaps from the defaults first.
impl TryFrom<DcfForm> for DcfInput {
    type Error = VentureLinkError;

    fn try_from(form: DcfForm) -> VentureLinkResult<Self> {
        Ok(DcfInput {
            current_revenue: decimal_field("current_revenue", form.current_revenue)?,
            revenue_growth_rate: decimal_field("revenue_growth_rate", form.revenue_growth_rate)?,
            operating_margin: decimal_field("operating_margin", form.operating_margin)?,
            tax_rate: decimal_field("tax_rate", form.tax_rate)?,
            capex_ratio: decimal_field("capex_ratio", form.capex_ratio)?,
            working_capital_ratio: decimal_field(
                "working_capital_ratio",
                form.working_capital_ratio,
            )?,
            discount_rate: decimal_field("discount_rate", form.discount_rate)?,
            terminal_growth_rate: decimal_field(
                "terminal_growth_rate",
                form.terminal_growth_rate,
            )?,
            projection_years: count_field(
                "projection_years",
                form.projection_years,
                u64::from(u32::MAX),
            )? as u32,
            total_shares: count_field("total_shares", form.total_shares, u64::MAX)?,
            net_debt: decimal_field("net_debt", form.net_debt)?,
        })
    }
}

fn canonical_field(name: &str) -> Option<&'static str> {
    let field = match name {
        "current_revenue" | "currentRevenue" | "revenue" => "current_revenue",
        "revenue_growth_rate" | "revenueGrowthRate" | "revenueGrowth" => "revenue_growth_rate",
        "operating_margin" | "operatingMargin" => "operating_margin",
        "tax_rate" | "taxRate" => "tax_rate",
        "capex_ratio" | "capexRatio" => "capex_ratio",
        "working_capital_ratio" | "workingCapitalRatio" => "working_capital_ratio",
        "discount_rate" | "discountRate" | "wacc" => "discount_rate",
        "terminal_growth_rate" | "terminalGrowthRate" | "terminalGrowth" => {
            "terminal_growth_rate"
        }
        "projection_years" | "projectionYears" => "projection_years",
        "total_shares" | "totalShares" => "total_shares",
        "net_debt" | "netDebt" => "net_debt",
        _ => return None,
    };
    Some(field)
}

fn finite_field(field: &str, value: Option<f64>) -> VentureLinkResult<f64> {
    let value = value.ok_or_else(|| VentureLinkError::invalid(field, "Required field is missing"))?;
    if !value.is_finite() {
        return Err(VentureLinkError::invalid(
            field,
            format!("Value must be finite, got {value}"),
        ));
    }
    Ok(value)
}

fn decimal_field(field: &str, value: Option<f64>) -> VentureLinkResult<Decimal> {
    let value = finite_field(field, value)?;
    Decimal::try_from(value).map_err(|_| {
        VentureLinkError::invalid(field, format!("{value} is outside the supported range"))
    })
}

/// Whole, non-negative count no larger than `max`. Zero is left for the
/// engine to reject so the message is the same however the input was built.
fn count_field(field: &str, value: Option<f64>, max: u64) -> VentureLinkResult<u64> {
    let value = finite_field(field, value)?;
    if value.fract() != 0.0 {
        return Err(VentureLinkError::invalid(
            field,
            format!("Must be a whole number, got {value}"),
        ));
    }
    if value < 0.0 {
        return Err(VentureLinkError::invalid(
            field,
            format!("Must be positive, got {value}"),
        ));
    }
    // `max as f64` rounds u64::MAX up to 2^64, so compare after an exact
    // integer conversion instead.
    Decimal::try_from(value)
        .ok()
        .and_then(|d| d.to_u64())
        .filter(|count| *count <= max)
        .ok_or_else(|| {
            VentureLinkError::invalid(field, format!("{value} exceeds the maximum of {max}"))
        })
}
