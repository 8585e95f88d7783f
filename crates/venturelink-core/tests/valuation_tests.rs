use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use venturelink_core::valuation::{calculate_dcf, format_krw, DcfForm, DcfInput};
use venturelink_core::VentureLinkError;

fn reference_input() -> DcfInput {
    DcfInput {
        current_revenue: dec!(1_000_000_000),
        revenue_growth_rate: dec!(20),
        operating_margin: dec!(15),
        tax_rate: dec!(22),
        capex_ratio: dec!(5),
        working_capital_ratio: dec!(10),
        discount_rate: dec!(12),
        terminal_growth_rate: dec!(2),
        projection_years: 5,
        total_shares: 1_000_000,
        net_debt: Decimal::ZERO,
    }
}

fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

// ===========================================================================
// Engine properties
// ===========================================================================

#[test]
fn test_dcf_is_deterministic() {
    let input = reference_input();
    let first = calculate_dcf(&input).unwrap();
    let second = calculate_dcf(&input).unwrap();
    assert_eq!(first.result, second.result);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn test_dcf_year_count_and_order() {
    for years in [1u32, 3, 5, 10, 30] {
        let mut input = reference_input();
        input.projection_years = years;
        let out = calculate_dcf(&input).unwrap().result;

        let got: Vec<u32> = out.projections.iter().map(|p| p.year).collect();
        let expected: Vec<u32> = (1..=years).collect();
        assert_eq!(got, expected);
        assert_eq!(out.display.projections.len(), years as usize);
    }
}

#[test]
fn test_dcf_discount_factor_matches_closed_form() {
    let mut input = reference_input();
    input.projection_years = 10;
    input.discount_rate = dec!(9.75);
    let out = calculate_dcf(&input).unwrap().result;

    let base = dec!(1.0975);
    let mut expected = Decimal::ONE;
    for p in &out.projections {
        expected *= base;
        let rel = ((p.discount_factor - expected) / expected).abs();
        assert!(rel < dec!(0.000000001), "year {}: {rel}", p.year);
        assert_eq!(p.present_value, p.free_cash_flow / p.discount_factor);
    }
}

#[test]
fn test_dcf_aggregation_identities() {
    let mut input = reference_input();
    input.net_debt = dec!(120_000_000);
    let out = calculate_dcf(&input).unwrap().result;

    let sum: Decimal = out.projections.iter().map(|p| p.present_value).sum();
    assert_eq!(out.sum_of_present_values, sum);
    assert_eq!(
        out.enterprise_value,
        out.sum_of_present_values + out.terminal_value_present
    );
    assert_eq!(out.equity_value, out.enterprise_value - dec!(120_000_000));
    assert_eq!(out.per_share_value, out.equity_value / dec!(1_000_000));
}

#[test]
fn test_dcf_zero_growth_has_flat_revenue_and_no_working_capital() {
    let mut input = reference_input();
    input.revenue_growth_rate = Decimal::ZERO;
    let out = calculate_dcf(&input).unwrap().result;

    for p in &out.projections {
        assert_eq!(p.revenue, dec!(1_000_000_000));
        assert_eq!(p.working_capital_investment, Decimal::ZERO);
    }
}

// ===========================================================================
// Preconditions
// ===========================================================================

#[test]
fn test_dcf_equal_rates_non_convergent() {
    let mut input = reference_input();
    input.discount_rate = dec!(5);
    input.terminal_growth_rate = dec!(5);
    assert!(matches!(
        calculate_dcf(&input),
        Err(VentureLinkError::NonConvergentTerminalValue { .. })
    ));
}

#[test]
fn test_dcf_zero_shares_invalid() {
    let mut input = reference_input();
    input.total_shares = 0;
    assert!(matches!(
        calculate_dcf(&input),
        Err(VentureLinkError::InvalidInput { ref field, .. }) if field == "total_shares"
    ));
}

#[test]
fn test_dcf_zero_years_invalid() {
    let mut input = reference_input();
    input.projection_years = 0;
    assert!(matches!(
        calculate_dcf(&input),
        Err(VentureLinkError::InvalidInput { ref field, .. }) if field == "projection_years"
    ));
}

#[test]
fn test_dcf_error_messages_name_the_problem() {
    let mut input = reference_input();
    input.discount_rate = dec!(2);
    let msg = calculate_dcf(&input).unwrap_err().to_string();
    assert!(msg.contains("discount rate (2%)"), "{msg}");
    assert!(msg.contains("terminal growth rate (2%)"), "{msg}");
}

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_dcf_reference_scenario() {
    let output = calculate_dcf(&reference_input()).unwrap();
    let out = &output.result;
    let y1 = &out.projections[0];

    assert_eq!(y1.revenue, dec!(1_200_000_000));
    assert_eq!(y1.operating_income, dec!(180_000_000));
    assert_eq!(y1.nopat, dec!(140_400_000));
    assert_eq!(y1.capex, dec!(60_000_000));
    assert_eq!(y1.working_capital_investment, dec!(24_000_000));
    assert_eq!(y1.free_cash_flow, dec!(56_400_000));
    assert_eq!(y1.discount_factor, dec!(1.12));
    assert_close(y1.present_value, dec!(50_357_142.86), dec!(0.01));

    let y5 = &out.projections[4];
    assert_eq!(y5.revenue, dec!(2_488_320_000));
    assert_eq!(y5.free_cash_flow, dec!(116_951_040));
    assert_eq!(y5.discount_factor, dec!(1.7623416832));

    assert_close(out.sum_of_present_values, dec!(290_417_413.50), dec!(0.01));
    assert_eq!(out.terminal_value, dec!(1_192_900_608));
    assert_close(out.terminal_value_present, dec!(676_883_841.18), dec!(0.01));
    assert_close(out.enterprise_value, dec!(967_301_254.69), dec!(0.01));
    assert_close(out.per_share_value, dec!(967.30), dec!(0.01));

    assert!(output.warnings.is_empty(), "{:?}", output.warnings);
}

#[test]
fn test_dcf_reference_display() {
    let out = calculate_dcf(&reference_input()).unwrap().result;
    let display = &out.display;

    assert_eq!(display.enterprise_value, dec!(967_301_255));
    assert_eq!(display.equity_value, dec!(967_301_255));
    assert_eq!(display.per_share_value, dec!(967));
    assert_eq!(display.projections[0].free_cash_flow, dec!(56_400_000));
    assert_eq!(display.projections[0].present_value, dec!(50_357_143));
    assert_eq!(display.projections[1].discount_factor, dec!(1.254));
    assert_eq!(display.enterprise_value_krw, "10억원");
    assert_eq!(display.per_share_value_krw, "967원");

    // Exact values are untouched by display rounding
    assert_ne!(out.enterprise_value, display.enterprise_value);
}

#[test]
fn test_short_horizon_warns_on_terminal_share() {
    let mut input = reference_input();
    input.projection_years = 1;
    input.discount_rate = dec!(6);
    input.terminal_growth_rate = dec!(4);
    let output = calculate_dcf(&input).unwrap();
    assert!(output.result.terminal_value_pct > dec!(0.75));
    assert!(output.warnings.iter().any(|w| w.contains("Terminal value")));
}

// ===========================================================================
// Form boundary
// ===========================================================================

#[test]
fn test_default_form_reproduces_reference_scenario() {
    let input = DcfForm::default().into_input().unwrap();
    assert_eq!(input, reference_input());
}

#[test]
fn test_form_json_request_end_to_end() {
    let form: DcfForm = serde_json::from_str(
        r#"{"revenue": 1000000000, "wacc": 12, "terminalGrowth": 2, "netDebt": -100000000}"#,
    )
    .unwrap();
    let out = calculate_dcf(&form.into_input().unwrap()).unwrap().result;
    assert_eq!(out.equity_value, out.enterprise_value + dec!(100_000_000));
}

#[test]
fn test_form_text_fields_end_to_end() {
    let form = DcfForm::from_fields([("discountRate", "5"), ("terminalGrowthRate", "5")]).unwrap();
    let input = form.into_input().unwrap();
    assert!(matches!(
        calculate_dcf(&input),
        Err(VentureLinkError::NonConvergentTerminalValue { .. })
    ));
}

fn rejected_field(form_json: &str) -> String {
    let form: DcfForm = serde_json::from_str(form_json).unwrap();
    let result = form.into_input().and_then(|input| calculate_dcf(&input));
    match result {
        Err(VentureLinkError::InvalidInput { field, .. }) => field,
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_form_huge_projection_horizon_rejected_without_allocating() {
    assert_eq!(rejected_field(r#"{"projectionYears": 4000000000}"#), "projection_years");
}

#[test]
fn test_form_extreme_values_report_overflow_instead_of_panicking() {
    assert_eq!(
        rejected_field(
            r#"{"currentRevenue": 1e15, "revenueGrowthRate": 100, "projectionYears": 60}"#
        ),
        "revenue_growth_rate"
    );
    assert_eq!(
        rejected_field(
            r#"{"currentRevenue": 1e22, "discountRate": 2.0000000000001, "terminalGrowthRate": 2}"#
        ),
        "discount_rate"
    );
}

#[test]
fn test_format_krw_units() {
    assert_eq!(format_krw(dec!(3_200_000_000_000)), "3.2조원");
    assert_eq!(format_krw(dec!(450_000_000)), "5억원");
    assert_eq!(format_krw(dec!(125_000)), "13만원");
    assert_eq!(format_krw(dec!(4_321)), "4,321원");
}
