//! Company financial statement records

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ValuationError};

/// Financial statement snapshot for one company, all required fields present
///
/// Monetary amounts are expected to be non-negative and in one currency unit.
/// Nothing enforces that: negative inputs flow through and show up as
/// degenerate values downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Historical cost of the asset base
    pub gross_assets: f64,

    /// Depreciation accumulated against the asset base
    pub accumulated_depreciation: f64,

    pub net_income: f64,

    /// Depreciation expense for the period
    pub depreciation: f64,

    pub interest_expense: f64,

    pub rent_expense: f64,

    /// Static inflation multiplier applied to the net asset base
    #[serde(default)]
    pub inflation_adjustment: Option<f64>,

    /// Annual decay applied to projected cash flows
    #[serde(default)]
    pub fade_rate: Option<f64>,

    /// Benchmark return used for economic profit
    #[serde(default)]
    pub cost_of_capital: Option<f64>,
}

impl CompanyFinancials {
    /// Create a record with the required fields and no overrides
    pub fn new(
        gross_assets: f64,
        accumulated_depreciation: f64,
        net_income: f64,
        depreciation: f64,
        interest_expense: f64,
        rent_expense: f64,
    ) -> Self {
        Self {
            gross_assets,
            accumulated_depreciation,
            net_income,
            depreciation,
            interest_expense,
            rent_expense,
            inflation_adjustment: None,
            fade_rate: None,
            cost_of_capital: None,
        }
    }

    pub fn with_inflation_adjustment(mut self, inflation_adjustment: f64) -> Self {
        self.inflation_adjustment = Some(inflation_adjustment);
        self
    }

    pub fn with_fade_rate(mut self, fade_rate: f64) -> Self {
        self.fade_rate = Some(fade_rate);
        self
    }

    pub fn with_cost_of_capital(mut self, cost_of_capital: f64) -> Self {
        self.cost_of_capital = Some(cost_of_capital);
        self
    }
}

/// Raw company record as read from CSV or JSON
///
/// Every field is optional. A value that is present but not a number is kept
/// as NaN so the pipeline can decide per field how to react to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Free-form label (ticker, name) carried through batch output
    #[serde(default)]
    pub company: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub gross_assets: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub accumulated_depreciation: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub net_income: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub depreciation: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub interest_expense: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub rent_expense: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub inflation_adjustment: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub fade_rate: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub cost_of_capital: Option<f64>,
}

impl CompanyRecord {
    /// Convert into typed financials
    ///
    /// Fails when a required field is absent or not a number. The inflation
    /// multiplier is checked the same way because gross investment cannot be
    /// computed without it. A non-numeric fade rate or cost of capital is
    /// passed through as NaN and handled by the step that consumes it.
    pub fn to_financials(&self) -> Result<CompanyFinancials> {
        Ok(CompanyFinancials {
            gross_assets: required("gross_assets", self.gross_assets)?,
            accumulated_depreciation: required(
                "accumulated_depreciation",
                self.accumulated_depreciation,
            )?,
            net_income: required("net_income", self.net_income)?,
            depreciation: required("depreciation", self.depreciation)?,
            interest_expense: required("interest_expense", self.interest_expense)?,
            rent_expense: required("rent_expense", self.rent_expense)?,
            inflation_adjustment: match self.inflation_adjustment {
                Some(v) if v.is_nan() => {
                    return Err(ValuationError::InvalidField { field: "inflation_adjustment" })
                }
                other => other,
            },
            fade_rate: self.fade_rate,
            cost_of_capital: self.cost_of_capital,
        })
    }

    /// Display label, falling back to a row number
    pub fn label(&self, index: usize) -> String {
        self.company
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1))
    }
}

impl From<&CompanyFinancials> for CompanyRecord {
    fn from(financials: &CompanyFinancials) -> Self {
        Self {
            company: None,
            gross_assets: Some(financials.gross_assets),
            accumulated_depreciation: Some(financials.accumulated_depreciation),
            net_income: Some(financials.net_income),
            depreciation: Some(financials.depreciation),
            interest_expense: Some(financials.interest_expense),
            rent_expense: Some(financials.rent_expense),
            inflation_adjustment: financials.inflation_adjustment,
            fade_rate: financials.fade_rate,
            cost_of_capital: financials.cost_of_capital,
        }
    }
}

fn required(field: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        None => Err(ValuationError::MissingField(field)),
        Some(v) if v.is_nan() => Err(ValuationError::InvalidField { field }),
        Some(v) => Ok(v),
    }
}

/// Any scalar the input format can hold
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Read a number, mapping non-numeric values to NaN and empty text to None
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawValue>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(RawValue::Number(v)) => Some(v),
        Some(RawValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse().unwrap_or(f64::NAN))
            }
        }
        Some(RawValue::Other(_)) => Some(f64::NAN),
    })
}
