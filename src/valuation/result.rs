//! Valuation output record

use serde::{Deserialize, Serialize};

/// Complete CFROI valuation for one company
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Cash flow return on investment as a decimal
    pub cfroi: f64,

    /// Excess return over cost of capital, in currency units
    pub economic_profit: f64,

    /// Inflation-adjusted net asset base
    pub gross_investment: f64,

    /// Gross cash flow per period
    pub gross_cash_flow: f64,

    /// Estimated asset life in periods
    pub asset_life: f64,
}

impl ValuationResult {
    /// The all-zero record returned when a valuation cannot be completed
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Whether the company earns more than the benchmark on its investment
    pub fn creates_value(&self) -> bool {
        self.economic_profit > 0.0
    }
}
