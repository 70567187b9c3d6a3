//! Internal Rate of Return (IRR) calculation
//!
//! Used to solve the CFROI rate from a projected cash flow stream

use thiserror::Error;

/// Why a rate of return could not be found
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum IrrError {
    #[error("Empty cash flow series")]
    Empty,

    #[error("Cash flow at period {period} is not finite")]
    NonFiniteCashflow { period: usize },

    #[error("Cash flows never change sign")]
    NoSignChange,

    #[error("No root between {low} and {high}")]
    NoRootInBracket { low: f64, high: f64 },

    #[error("No convergence after {iterations} iterations")]
    NotConverged { iterations: u32 },

    #[error("Solver returned a non-finite rate: {0}")]
    NonFiniteRate(f64),
}

/// Rate-of-return solver for an ordered series of per-period cash flows
///
/// Implementations return a periodic discount rate at which the net present
/// value of `cashflows` is zero, or an error when none exists or none is found.
pub trait RateSolver {
    fn solve(&self, cashflows: &[f64]) -> Result<f64, IrrError>;

    /// Solve for the rate at which an NPV function crosses zero
    ///
    /// Used for streams too long to hold element by element. `npv` must be
    /// positive at low rates and turn negative as the rate grows.
    fn solve_npv(&self, npv: &dyn Fn(f64) -> f64) -> Result<f64, IrrError> {
        bisect_npv(&NewtonBisection::default(), npv)
    }
}

/// Doublings of the upper bisection bound before giving up
const MAX_BRACKET_EXPANSIONS: u32 = 64;

/// Newton roots must leave at most this share of the stream's gross size as NPV
const NPV_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Newton-Raphson IRR with a bisection fallback
#[derive(Debug, Clone, Copy)]
pub struct NewtonBisection {
    /// Starting rate for Newton iteration
    pub initial_guess: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Lowest rate searched (-99%)
    pub min_rate: f64,
    /// Highest rate searched (1000%)
    pub max_rate: f64,
}

impl Default for NewtonBisection {
    fn default() -> Self {
        Self {
            initial_guess: 0.05,
            tolerance: 1e-10,
            max_iterations: 1000,
            min_rate: -0.99,
            max_rate: 10.0,
        }
    }
}

impl RateSolver for NewtonBisection {
    fn solve(&self, cashflows: &[f64]) -> Result<f64, IrrError> {
        calculate_irr_with(self, cashflows)
    }

    fn solve_npv(&self, npv: &dyn Fn(f64) -> f64) -> Result<f64, IrrError> {
        bisect_npv(self, npv)
    }
}

/// Calculate the periodic IRR of a series of cash flows with default settings
///
/// # Arguments
/// * `cashflows` - Cash flows per period (positive = inflow, negative = outflow)
///
/// # Returns
/// * Periodic IRR as a decimal (e.g., 0.05 for 5%)
pub fn calculate_irr(cashflows: &[f64]) -> Result<f64, IrrError> {
    calculate_irr_with(&NewtonBisection::default(), cashflows)
}

fn calculate_irr_with(params: &NewtonBisection, cashflows: &[f64]) -> Result<f64, IrrError> {
    if cashflows.is_empty() {
        return Err(IrrError::Empty);
    }

    if let Some(period) = cashflows.iter().position(|cf| !cf.is_finite()) {
        return Err(IrrError::NonFiniteCashflow { period });
    }

    // Check if all cashflows are zero
    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Ok(0.0);
    }

    // At least one sign change is required for an IRR to exist
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return Err(IrrError::NoSignChange);
    }

    let gross_size: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
    let mut rate = params.initial_guess;

    for _ in 0..params.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 || !dnpv.is_finite() {
            // Derivative unusable, try bisection instead
            return calculate_irr_bisection(params, cashflows);
        }

        let new_rate = (rate - npv / dnpv).clamp(params.min_rate, params.max_rate);

        if (new_rate - rate).abs() < params.tolerance {
            // A step pinned against the search bounds is not a root
            let residual = npv_at_rate(cashflows, new_rate);
            if residual.abs() <= NPV_RELATIVE_TOLERANCE * gross_size {
                return Ok(new_rate);
            }
            log::debug!("Newton-Raphson stalled at {} with NPV {}", new_rate, residual);
            break;
        }

        rate = new_rate;
    }

    log::debug!("Newton-Raphson did not converge, falling back to bisection");
    calculate_irr_bisection(params, cashflows)
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        // Underflowed flows would turn into 0/0 at steep negative rates
        if cf == 0.0 {
            continue;
        }
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Fallback IRR calculation using bisection
fn calculate_irr_bisection(params: &NewtonBisection, cashflows: &[f64]) -> Result<f64, IrrError> {
    bisect_npv(params, |rate| npv_at_rate(cashflows, rate))
}

/// Bisection on an NPV function
///
/// The upper bound doubles while NPV is still positive there, so rates above
/// `max_rate` are found rather than reported as missing.
fn bisect_npv<F: Fn(f64) -> f64>(params: &NewtonBisection, npv: F) -> Result<f64, IrrError> {
    let mut low = params.min_rate;
    let mut high = params.max_rate;

    let mut npv_low = npv(low);
    let mut npv_high = npv(high);

    let mut expansions = 0;
    while npv_low > 0.0 && npv_high > 0.0 && expansions < MAX_BRACKET_EXPANSIONS {
        high *= 2.0;
        npv_high = npv(high);
        expansions += 1;
    }

    if npv_low.is_nan() || npv_high.is_nan() || npv_low * npv_high > 0.0 {
        return Err(IrrError::NoRootInBracket { low, high });
    }

    for _ in 0..params.max_iterations {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid);

        if npv_mid.abs() < params.tolerance || (high - low) / 2.0 < params.tolerance * mid.abs().max(1.0) {
            return Ok(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Err(IrrError::NotConverged { iterations: params.max_iterations })
}

/// Net present value at a given periodic rate, first cash flow undiscounted
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .filter(|&(_, &cf)| cf != 0.0)
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // Investment of $1000 returning $1100 one period later
        let irr = calculate_irr(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_two_period_irr() {
        // -100, 60, 60 has IRR ~13.07%
        let irr = calculate_irr(&[-100.0, 60.0, 60.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.130662386, epsilon = 1e-6);
        assert_abs_diff_eq!(npv_at_rate(&[-100.0, 60.0, 60.0], irr), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_irr() {
        // Getting back less than invested
        let irr = calculate_irr(&[-1000.0, 500.0, 400.0]).unwrap();
        assert!(irr < 0.0);
        assert_abs_diff_eq!(npv_at_rate(&[-1000.0, 500.0, 400.0], irr), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_level_cashflows() {
        // Loan of $10000, 12 payments of $900
        let mut cashflows = vec![10000.0];
        cashflows.extend(vec![-900.0; 12]);

        assert!(calculate_irr(&cashflows).is_ok());
    }

    #[test]
    fn test_failures() {
        assert_eq!(calculate_irr(&[]), Err(IrrError::Empty));
        assert_eq!(calculate_irr(&[-900.0]), Err(IrrError::NoSignChange));
        assert_eq!(calculate_irr(&[100.0, 50.0]), Err(IrrError::NoSignChange));
        assert_eq!(
            calculate_irr(&[-100.0, f64::NAN]),
            Err(IrrError::NonFiniteCashflow { period: 1 })
        );
    }

    #[test]
    fn test_all_zero() {
        assert_eq!(calculate_irr(&[0.0, 0.0, 0.0]), Ok(0.0));
    }

    #[test]
    fn test_irr_above_search_bound() {
        // True IRR is 1400%; Newton pins at the 1000% bound and must not report it
        let cashflows = [-1_000.0, 15_000.0];
        let irr = calculate_irr(&cashflows).unwrap();
        assert_abs_diff_eq!(irr, 14.0, epsilon = 1e-8);
        assert_abs_diff_eq!(npv_at_rate(&cashflows, irr), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bisection_expands_bracket() {
        let params = NewtonBisection::default();
        let irr = calculate_irr_bisection(&params, &[-1_000.0, 100_000.0]).unwrap();
        assert_abs_diff_eq!(irr, 99.0, epsilon = 1e-6);
    }

    #[test]
    fn test_solve_npv_function() {
        // Perpetuity of 50 on 1000 yields 5%
        let irr = NewtonBisection::default().solve_npv(&|r: f64| -1_000.0 + 50.0 / r.max(1e-300)).unwrap();
        assert_abs_diff_eq!(irr, 0.05, epsilon = 1e-8);
    }

    #[test]
    fn test_npv_ignores_underflowed_flows() {
        // 0.5^1100 underflows to zero, as does the discount factor at -50%
        let mut cashflows = vec![-1.0];
        cashflows.extend((0..1_100).map(|t| 0.5f64.powi(t)));
        assert_eq!(*cashflows.last().unwrap(), 0.0);
        assert!(npv_at_rate(&cashflows, -0.5).is_finite());
    }

    #[test]
    fn test_bisection_fallback() {
        let params = NewtonBisection { max_iterations: 200, ..Default::default() };
        let irr = calculate_irr_bisection(&params, &[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-8);
    }
}
