//! CFROI solver
//!
//! Projects a fading cash flow stream over the asset life, adds a terminal
//! salvage value and solves for the rate of return on the gross investment.
//! The result is always a finite, non-negative rate: degenerate inputs and
//! solver failures both collapse to 0.0, but the tagged [`CfroiOutcome`]
//! keeps them apart for callers that care.
//!
//! Streams longer than [`MAX_EXPLICIT_PERIODS`] are solved through their
//! closed-form NPV instead of being materialised; the result is the same
//! root the element-by-element stream would give.

use super::irr::{IrrError, NewtonBisection, RateSolver};

/// Default annual fade applied to projected cash flows
pub const DEFAULT_FADE_RATE: f64 = 0.04;

/// Residual value of the asset base at the end of its life, as a share of gross investment
pub const SALVAGE_FRACTION: f64 = 0.1;

/// Longest stream built element by element
pub const MAX_EXPLICIT_PERIODS: usize = 10_000;

/// Input condition that makes a CFROI meaningless
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegenerateInput {
    NonPositiveAssetLife(f64),
    NonPositiveInvestment(f64),
    NonPositiveCashFlow(f64),
    /// Asset life is positive but shorter than one whole period
    AssetLifeBelowOnePeriod(f64),
}

/// How a CFROI calculation ended
#[derive(Debug, Clone, PartialEq)]
pub enum CfroiOutcome {
    /// Solver found a non-negative rate
    Solved(f64),
    /// Solver found a negative rate, floored at zero
    Clamped { raw_rate: f64 },
    /// Inputs short-circuited before any stream was built
    Degenerate(DegenerateInput),
    /// Solver failed or returned a non-finite rate
    SolverFailed(IrrError),
}

impl CfroiOutcome {
    /// The externally visible CFROI
    pub fn rate(&self) -> f64 {
        match self {
            CfroiOutcome::Solved(rate) => *rate,
            CfroiOutcome::Clamped { .. }
            | CfroiOutcome::Degenerate(_)
            | CfroiOutcome::SolverFailed(_) => 0.0,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, CfroiOutcome::Solved(_))
    }
}

/// Check the short-circuit conditions, returning the whole number of projected periods
///
/// Asset lives below one period would leave only the initial outlay in the
/// stream, which has no rate of return, so they are rejected here too.
pub fn check_inputs(
    gross_cash_flow: f64,
    gross_investment: f64,
    asset_life: f64,
) -> Result<f64, DegenerateInput> {
    // Negated comparisons so NaN inputs are caught as well
    if !(asset_life > 0.0) {
        return Err(DegenerateInput::NonPositiveAssetLife(asset_life));
    }
    if !(gross_investment > 0.0) {
        return Err(DegenerateInput::NonPositiveInvestment(gross_investment));
    }
    if !(gross_cash_flow > 0.0) {
        return Err(DegenerateInput::NonPositiveCashFlow(gross_cash_flow));
    }

    let periods = asset_life.floor();
    if periods < 1.0 {
        return Err(DegenerateInput::AssetLifeBelowOnePeriod(asset_life));
    }

    Ok(periods)
}

/// Build the cash flow stream: outlay, faded flows, salvage on the last period
///
/// `periods` must be at least 1.
pub fn project_cashflows(
    gross_cash_flow: f64,
    gross_investment: f64,
    periods: usize,
    fade_rate: f64,
) -> Vec<f64> {
    let mut cashflows = Vec::with_capacity(periods + 1);
    cashflows.push(-gross_investment);

    let retention = 1.0 - fade_rate;
    cashflows.extend((0..periods).map(|t| gross_cash_flow * retention.powi(t as i32)));

    if let Some(last) = cashflows.last_mut() {
        *last += gross_investment * SALVAGE_FRACTION;
    }

    cashflows
}

/// NPV at `rate` of the stream [`project_cashflows`] would build, in closed form
///
/// Projected flows form a geometric series with ratio `(1 - fade_rate) / (1 + rate)`;
/// salvage is discounted over the full `periods`.
pub fn projected_npv(
    gross_cash_flow: f64,
    gross_investment: f64,
    periods: f64,
    fade_rate: f64,
    rate: f64,
) -> f64 {
    let log_discount = rate.ln_1p();
    let retention = 1.0 - fade_rate;

    // Sum of ratio^t for t in 0..periods
    let series = if retention > 0.0 {
        let log_ratio = (-fade_rate).ln_1p() - log_discount;
        if log_ratio == 0.0 {
            periods
        } else {
            (periods * log_ratio).exp_m1() / log_ratio.exp_m1()
        }
    } else {
        let ratio = retention / (1.0 + rate);
        if ratio == 1.0 {
            periods
        } else {
            (1.0 - ratio.powf(periods)) / (1.0 - ratio)
        }
    };

    let salvage_discount = if log_discount == 0.0 {
        1.0
    } else {
        (-periods * log_discount).exp()
    };

    -gross_investment
        + gross_cash_flow * (-log_discount).exp() * series
        + gross_investment * SALVAGE_FRACTION * salvage_discount
}

/// Solve CFROI with an explicit rate solver
pub fn solve_cfroi<S: RateSolver + ?Sized>(
    solver: &S,
    gross_cash_flow: f64,
    gross_investment: f64,
    asset_life: f64,
    fade_rate: f64,
) -> CfroiOutcome {
    let periods = match check_inputs(gross_cash_flow, gross_investment, asset_life) {
        Ok(periods) => periods,
        Err(reason) => {
            log::debug!("CFROI short-circuited: {:?}", reason);
            return CfroiOutcome::Degenerate(reason);
        }
    };

    let solved = if periods <= MAX_EXPLICIT_PERIODS as f64 {
        let cashflows =
            project_cashflows(gross_cash_flow, gross_investment, periods as usize, fade_rate);
        solver.solve(&cashflows)
    } else {
        log::debug!("Solving {} periods through closed-form NPV", periods);
        solver.solve_npv(&|rate| {
            projected_npv(gross_cash_flow, gross_investment, periods, fade_rate, rate)
        })
    };

    match solved {
        Ok(rate) if !rate.is_finite() => {
            log::debug!("Rate solver returned {} over {} periods", rate, periods);
            CfroiOutcome::SolverFailed(IrrError::NonFiniteRate(rate))
        }
        Ok(rate) if rate < 0.0 => CfroiOutcome::Clamped { raw_rate: rate },
        Ok(rate) => CfroiOutcome::Solved(rate),
        Err(err) => {
            log::debug!("Rate solver failed: {}", err);
            CfroiOutcome::SolverFailed(err)
        }
    }
}

/// Calculate CFROI with the default Newton-Raphson/bisection solver
///
/// # Returns
/// * CFROI as a decimal, or 0.0 for degenerate inputs and solver failures
pub fn calculate_cfroi(
    gross_cash_flow: f64,
    gross_investment: f64,
    asset_life: f64,
    fade_rate: f64,
) -> f64 {
    solve_cfroi(
        &NewtonBisection::default(),
        gross_cash_flow,
        gross_investment,
        asset_life,
        fade_rate,
    )
    .rate()
}
