//! CFROI Valuation - Cash Flow Return on Investment engine for company financials
//!
//! This library provides:
//! - Gross investment, gross cash flow and asset life from statement data
//! - CFROI solved as the IRR of a fading projected cash flow stream
//! - Economic profit against a cost-of-capital benchmark
//! - Total orchestration that always returns a complete result
//! - CSV/JSON record loading and parallel batch valuation

pub mod error;
pub mod company;
pub mod valuation;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, ValuationError};
pub use company::{CompanyFinancials, CompanyRecord};
pub use valuation::{ValuationConfig, ValuationModel, ValuationResult};
pub use runner::{BatchOutcome, ValuationRunner};
