//! Company financial data structures and record loading

mod data;
pub mod loader;

pub use data::{CompanyFinancials, CompanyRecord};
pub use loader::{load_companies, load_companies_from_json, load_companies_from_reader};
