//! CFROI Valuation CLI
//!
//! Values a sample company and prints the formatted results

use cfroi_valuation::{CompanyFinancials, ValuationConfig, ValuationModel};

/// Format a currency amount with thousands separators and two decimals
fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

fn main() {
    env_logger::init();

    println!("CFROI Valuation v0.1.0");
    println!("======================\n");

    // Sample company
    let company = CompanyFinancials::new(
        10_000_000.0, // gross assets
        2_000_000.0,  // accumulated depreciation
        1_500_000.0,  // net income
        500_000.0,    // annual depreciation
        300_000.0,    // interest expense
        200_000.0,    // rent expense
    )
    .with_cost_of_capital(0.08)
    .with_fade_rate(0.04);

    let model = ValuationModel::new(ValuationConfig::default());
    let results = model.value_company(&company);

    println!("CFROI Analysis Results:");
    println!("CFROI: {:.2}%", results.cfroi * 100.0);
    println!("Economic Profit: {}", format_currency(results.economic_profit));
    println!("Gross Investment: {}", format_currency(results.gross_investment));
    println!("Gross Cash Flow: {}", format_currency(results.gross_cash_flow));
    println!("Asset Life: {:.1} years", results.asset_life);
}
