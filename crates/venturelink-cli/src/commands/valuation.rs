use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use venturelink_core::valuation::{calculate_dcf, format_krw, DcfForm};

use crate::input;

/// Arguments for DCF valuation. Unset flags fall back to the calculator defaults.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DcfArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current annual revenue (default 1,000,000,000)
    #[arg(long, alias = "revenue")]
    pub current_revenue: Option<f64>,

    /// Revenue growth rate in percent (default 20)
    #[arg(long, alias = "growth")]
    pub revenue_growth_rate: Option<f64>,

    /// Operating margin in percent (default 15)
    #[arg(long)]
    pub operating_margin: Option<f64>,

    /// Tax rate on operating income in percent (default 22)
    #[arg(long)]
    pub tax_rate: Option<f64>,

    /// Capital expenditure as percent of revenue (default 5)
    #[arg(long)]
    pub capex_ratio: Option<f64>,

    /// Working capital as percent of revenue (default 10)
    #[arg(long)]
    pub working_capital_ratio: Option<f64>,

    /// Discount rate / WACC in percent (default 12)
    #[arg(long, alias = "wacc")]
    pub discount_rate: Option<f64>,

    /// Terminal growth rate in percent (default 2)
    #[arg(long, alias = "terminal-growth")]
    pub terminal_growth_rate: Option<f64>,

    /// Explicit projection years (default 5)
    #[arg(long, alias = "years")]
    pub projection_years: Option<f64>,

    /// Shares outstanding (default 1,000,000)
    #[arg(long)]
    pub total_shares: Option<f64>,

    /// Net debt; negative for net cash (default 0)
    #[arg(long)]
    pub net_debt: Option<f64>,
}

/// Arguments for KRW formatting
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FormatKrwArgs {
    /// Amount in won
    pub amount: Decimal,
}

impl DcfArgs {
    fn into_form(self) -> DcfForm {
        DcfForm {
            current_revenue: self.current_revenue,
            revenue_growth_rate: self.revenue_growth_rate,
            operating_margin: self.operating_margin,
            tax_rate: self.tax_rate,
            capex_ratio: self.capex_ratio,
            working_capital_ratio: self.working_capital_ratio,
            discount_rate: self.discount_rate,
            terminal_growth_rate: self.terminal_growth_rate,
            projection_years: self.projection_years,
            total_shares: self.total_shares,
            net_debt: self.net_debt,
        }
    }
}

pub fn run_dcf(args: DcfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let form: DcfForm = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.into_form()
    };

    let dcf_input = form.into_input()?;
    let result = calculate_dcf(&dcf_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_format_krw(args: FormatKrwArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::json!({
        "amount": args.amount.to_string(),
        "formatted": format_krw(args.amount),
    }))
}
