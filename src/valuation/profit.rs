//! Economic profit over the cost-of-capital benchmark

/// Default cost of capital benchmark
pub const DEFAULT_COST_OF_CAPITAL: f64 = 0.08;

/// Economic profit: excess return over cost of capital, scaled by gross investment
///
/// Returns 0.0 when the rate or the benchmark is NaN, which is how a
/// non-numeric value from an untyped input record arrives here. Infinite
/// inputs pass through; the orchestrator rejects the non-finite profit.
pub fn economic_profit(cfroi: f64, cost_of_capital: f64, gross_investment: f64) -> f64 {
    if cfroi.is_nan() || cost_of_capital.is_nan() {
        return 0.0;
    }
    (cfroi - cost_of_capital) * gross_investment
}
