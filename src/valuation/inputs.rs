//! Scalar inputs to the CFROI calculation derived from the financial statements

/// After-tax share of interest expense added back to cash flow (30% tax rate)
pub const INTEREST_AFTER_TAX_FACTOR: f64 = 0.7;

/// Gross investment: net asset base scaled by the inflation multiplier
///
/// Non-positive results are passed through; the CFROI solver treats them as
/// degenerate input.
pub fn gross_investment(
    gross_assets: f64,
    accumulated_depreciation: f64,
    inflation_adjustment: f64,
) -> f64 {
    (gross_assets - accumulated_depreciation) * inflation_adjustment
}

/// Gross cash flow: pre-financing operating cash flow proxy
pub fn gross_cash_flow(
    net_income: f64,
    depreciation: f64,
    interest_expense: f64,
    rent_expense: f64,
) -> f64 {
    net_income + depreciation + interest_expense * INTEREST_AFTER_TAX_FACTOR + rent_expense
}

/// Remaining useful life of the asset base in periods
///
/// Returns 0.0 ("cannot estimate") when there is no depreciation to divide by.
pub fn asset_life(gross_assets: f64, depreciation: f64) -> f64 {
    if depreciation > 0.0 {
        gross_assets / depreciation
    } else {
        0.0
    }
}
