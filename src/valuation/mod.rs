//! CFROI valuation: scalar inputs, rate-of-return solver and orchestration

mod engine;
mod result;
pub mod cfroi;
pub mod inputs;
pub mod irr;
pub mod profit;

pub use engine::{ValuationConfig, ValuationModel};
pub use result::ValuationResult;
pub use cfroi::{calculate_cfroi, solve_cfroi, CfroiOutcome, DegenerateInput};
pub use inputs::{asset_life, gross_cash_flow, gross_investment};
pub use irr::{calculate_irr, IrrError, NewtonBisection, RateSolver};
pub use profit::economic_profit;
