//! Valuation orchestration: one company record in, one complete result out

use serde::{Deserialize, Serialize};

use super::cfroi::{solve_cfroi, DEFAULT_FADE_RATE};
use super::inputs;
use super::irr::{NewtonBisection, RateSolver};
use super::profit::{self, DEFAULT_COST_OF_CAPITAL};
use super::result::ValuationResult;
use crate::company::{CompanyFinancials, CompanyRecord};
use crate::error::{Result, ValuationError};

/// Defaults for the optional per-company overrides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Static inflation multiplier on the net asset base
    pub inflation_adjustment: f64,

    /// Annual fade of projected cash flows
    pub fade_rate: f64,

    /// Benchmark return for economic profit
    pub cost_of_capital: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            inflation_adjustment: 1.0,
            fade_rate: DEFAULT_FADE_RATE,
            cost_of_capital: DEFAULT_COST_OF_CAPITAL,
        }
    }
}

/// CFROI valuation model
///
/// Holds no per-valuation state; every call is independent, so one model can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct ValuationModel<S = NewtonBisection> {
    config: ValuationConfig,
    solver: S,
}

impl ValuationModel<NewtonBisection> {
    /// Create a model with the default Newton-Raphson/bisection solver
    pub fn new(config: ValuationConfig) -> Self {
        Self::with_solver(config, NewtonBisection::default())
    }
}

impl Default for ValuationModel<NewtonBisection> {
    fn default() -> Self {
        Self::new(ValuationConfig::default())
    }
}

impl<S: RateSolver> ValuationModel<S> {
    /// Create a model with a custom rate-of-return solver
    pub fn with_solver(config: ValuationConfig, solver: S) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Value an untyped record
    ///
    /// Never fails: missing or non-numeric required fields and internal
    /// failures are logged and produce [`ValuationResult::zero`].
    pub fn run_valuation(&self, record: &CompanyRecord) -> ValuationResult {
        match self.try_run_valuation(record) {
            Ok(result) => result,
            Err(err) => {
                log::warn!(
                    "Valuation of {} failed, returning zero result: {}",
                    record.company.as_deref().unwrap_or("company"),
                    err
                );
                ValuationResult::zero()
            }
        }
    }

    /// Value an untyped record, reporting conversion and pipeline failures
    pub fn try_run_valuation(&self, record: &CompanyRecord) -> Result<ValuationResult> {
        let financials = record.to_financials()?;
        self.try_value(&financials)
    }

    /// Value typed financials, returning the zero result on failure
    pub fn value_company(&self, financials: &CompanyFinancials) -> ValuationResult {
        self.try_value(financials).unwrap_or_else(|err| {
            log::warn!("Valuation failed, returning zero result: {}", err);
            ValuationResult::zero()
        })
    }

    /// Run the full pipeline, reporting why it could not complete
    pub fn try_value(&self, financials: &CompanyFinancials) -> Result<ValuationResult> {
        let inflation_adjustment = financials
            .inflation_adjustment
            .unwrap_or(self.config.inflation_adjustment);
        let fade_rate = financials.fade_rate.unwrap_or(self.config.fade_rate);
        let cost_of_capital = financials
            .cost_of_capital
            .unwrap_or(self.config.cost_of_capital);

        let gross_investment = finite(
            "gross investment",
            inputs::gross_investment(
                financials.gross_assets,
                financials.accumulated_depreciation,
                inflation_adjustment,
            ),
        )?;

        let gross_cash_flow = finite(
            "gross cash flow",
            inputs::gross_cash_flow(
                financials.net_income,
                financials.depreciation,
                financials.interest_expense,
                financials.rent_expense,
            ),
        )?;

        let asset_life = finite(
            "asset life",
            inputs::asset_life(financials.gross_assets, financials.depreciation),
        )?;

        let outcome = solve_cfroi(
            &self.solver,
            gross_cash_flow,
            gross_investment,
            asset_life,
            fade_rate,
        );
        let cfroi = outcome.rate();

        let economic_profit = finite(
            "economic profit",
            profit::economic_profit(cfroi, cost_of_capital, gross_investment),
        )?;

        Ok(ValuationResult {
            cfroi,
            economic_profit,
            gross_investment,
            gross_cash_flow,
            asset_life,
        })
    }
}

fn finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValuationError::NonFinite { quantity, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::irr::IrrError;
    use approx::assert_abs_diff_eq;

    fn reference_company() -> CompanyFinancials {
        CompanyFinancials::new(
            10_000_000.0, // gross assets
            2_000_000.0,  // accumulated depreciation
            1_500_000.0,  // net income
            500_000.0,    // depreciation
            300_000.0,    // interest expense
            200_000.0,    // rent expense
        )
        .with_cost_of_capital(0.08)
        .with_fade_rate(0.04)
    }

    struct FailingSolver;

    impl RateSolver for FailingSolver {
        fn solve(&self, _cashflows: &[f64]) -> std::result::Result<f64, IrrError> {
            Err(IrrError::NotConverged { iterations: 1 })
        }
    }

    #[test]
    fn test_reference_valuation() {
        let model = ValuationModel::new(ValuationConfig::default());
        let result = model.value_company(&reference_company());

        assert_eq!(result.gross_investment, 8_000_000.0);
        assert_abs_diff_eq!(result.gross_cash_flow, 2_410_000.0, epsilon = 1e-6);
        assert_eq!(result.asset_life, 20.0);
        assert_abs_diff_eq!(result.cfroi, 0.260240011, epsilon = 1e-6);
        assert_abs_diff_eq!(
            result.economic_profit,
            (result.cfroi - 0.08) * 8_000_000.0,
            epsilon = 1e-6
        );
        assert!(result.creates_value());
    }

    #[test]
    fn test_config_defaults_apply() {
        let base = CompanyFinancials::new(10_000_000.0, 2_000_000.0, 1_500_000.0, 500_000.0, 300_000.0, 200_000.0);
        let default_result = ValuationModel::new(ValuationConfig::default()).value_company(&base);
        let explicit_result = ValuationModel::new(ValuationConfig::default()).value_company(&reference_company());
        assert_eq!(default_result, explicit_result);

        let config = ValuationConfig { inflation_adjustment: 1.5, cost_of_capital: 0.1, ..Default::default() };
        let result = ValuationModel::new(config).value_company(&base);
        assert_eq!(result.gross_investment, 12_000_000.0);
        assert_abs_diff_eq!(result.economic_profit, (result.cfroi - 0.1) * 12_000_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_record_overrides_beat_config() {
        let config = ValuationConfig { fade_rate: 0.5, ..Default::default() };
        let result = ValuationModel::new(config).value_company(&reference_company());
        assert_abs_diff_eq!(result.cfroi, 0.260240011, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_field_gives_zero_result() {
        let mut record = CompanyRecord::from(&reference_company());
        record.depreciation = None;

        let model = ValuationModel::new(ValuationConfig::default());
        assert!(model.run_valuation(&record).is_zero());
        assert!(matches!(
            model.try_run_valuation(&record),
            Err(ValuationError::MissingField("depreciation"))
        ));
    }

    #[test]
    fn test_non_numeric_cost_of_capital_zeroes_profit_only() {
        let mut record = CompanyRecord::from(&reference_company());
        record.cost_of_capital = Some(f64::NAN);

        let result = ValuationModel::new(ValuationConfig::default()).run_valuation(&record);
        assert_eq!(result.economic_profit, 0.0);
        assert_eq!(result.gross_investment, 8_000_000.0);
        assert!(result.cfroi > 0.0);
    }

    #[test]
    fn test_non_finite_intermediate_gives_zero_result() {
        let financials = CompanyFinancials::new(f64::INFINITY, 0.0, 1.0, 1.0, 0.0, 0.0);
        let model = ValuationModel::new(ValuationConfig::default());
        assert!(matches!(
            model.try_value(&financials),
            Err(ValuationError::NonFinite { quantity: "gross investment", .. })
        ));
        assert!(model.value_company(&financials).is_zero());
    }

    #[test]
    fn test_infinite_cost_of_capital_gives_zero_result() {
        let financials = reference_company().with_cost_of_capital(f64::INFINITY);
        let model = ValuationModel::new(ValuationConfig::default());
        assert!(matches!(
            model.try_value(&financials),
            Err(ValuationError::NonFinite { quantity: "economic profit", .. })
        ));
        assert!(model.value_company(&financials).is_zero());
    }

    #[test]
    fn test_degenerate_company_keeps_inputs() {
        // No depreciation: asset life cannot be estimated, CFROI is zero
        let financials = CompanyFinancials::new(1_000_000.0, 0.0, 100_000.0, 0.0, 0.0, 0.0);
        let result = ValuationModel::new(ValuationConfig::default()).value_company(&financials);
        assert_eq!(result.asset_life, 0.0);
        assert_eq!(result.cfroi, 0.0);
        assert_eq!(result.gross_investment, 1_000_000.0);
        assert_abs_diff_eq!(result.economic_profit, -80_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_solver_failure_still_completes() {
        let model = ValuationModel::with_solver(ValuationConfig::default(), FailingSolver);
        let result = model.value_company(&reference_company());
        assert_eq!(result.cfroi, 0.0);
        assert_eq!(result.gross_investment, 8_000_000.0);
        assert_abs_diff_eq!(result.economic_profit, -640_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_repeated_valuations_identical() {
        let model = ValuationModel::new(ValuationConfig::default());
        let first = model.value_company(&reference_company());
        let second = model.value_company(&reference_company());
        assert_eq!(first.cfroi.to_bits(), second.cfroi.to_bits());
        assert_eq!(first.economic_profit.to_bits(), second.economic_profit.to_bits());
    }
}
