//! Batch runner for valuing many companies with one model
//!
//! Valuations share nothing but the read-only model, so batches are spread
//! across threads with rayon.

use rayon::prelude::*;

use crate::company::CompanyRecord;
use crate::valuation::{NewtonBisection, RateSolver, ValuationConfig, ValuationModel, ValuationResult};

/// Batch results in input order, with the records that could not be valued
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub results: Vec<ValuationResult>,
    /// Input indices whose valuation failed and came back as the zero result
    pub failed: Vec<usize>,
}

/// Runs valuations for single records or whole batches
///
/// # Example
/// ```ignore
/// let runner = ValuationRunner::new(ValuationConfig::default());
/// let companies = load_companies("companies.csv")?;
/// let results = runner.run_batch(&companies);
/// ```
#[derive(Debug, Clone)]
pub struct ValuationRunner<S = NewtonBisection> {
    model: ValuationModel<S>,
}

impl ValuationRunner<NewtonBisection> {
    /// Create runner with the default solver
    pub fn new(config: ValuationConfig) -> Self {
        Self {
            model: ValuationModel::new(config),
        }
    }
}

impl Default for ValuationRunner<NewtonBisection> {
    fn default() -> Self {
        Self::new(ValuationConfig::default())
    }
}

impl<S: RateSolver + Sync> ValuationRunner<S> {
    /// Create runner with a pre-built model
    pub fn with_model(model: ValuationModel<S>) -> Self {
        Self { model }
    }

    /// Value a single record
    pub fn run(&self, record: &CompanyRecord) -> ValuationResult {
        self.model.run_valuation(record)
    }

    /// Value a batch of records in parallel, preserving input order
    pub fn run_batch(&self, records: &[CompanyRecord]) -> Vec<ValuationResult> {
        self.run_batch_detailed(records).results
    }

    /// Value a batch in parallel and keep track of which records failed
    ///
    /// A company whose valuation legitimately comes out as all zeros is not
    /// a failure; only conversion and pipeline errors are counted.
    pub fn run_batch_detailed(&self, records: &[CompanyRecord]) -> BatchOutcome {
        let outcomes: Vec<_> = records
            .par_iter()
            .map(|record| self.model.try_run_valuation(record))
            .collect();

        let mut batch = BatchOutcome {
            results: Vec::with_capacity(outcomes.len()),
            failed: Vec::new(),
        };

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => batch.results.push(result),
                Err(err) => {
                    log::warn!(
                        "Valuation of {} failed, returning zero result: {}",
                        records[index].label(index),
                        err
                    );
                    batch.failed.push(index);
                    batch.results.push(ValuationResult::zero());
                }
            }
        }

        if !batch.failed.is_empty() {
            log::info!("{} of {} valuations failed", batch.failed.len(), batch.results.len());
        }

        batch
    }

    /// Get reference to the underlying model
    pub fn model(&self) -> &ValuationModel<S> {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::CompanyFinancials;

    fn test_record(net_income: f64) -> CompanyRecord {
        let financials =
            CompanyFinancials::new(10_000_000.0, 2_000_000.0, net_income, 500_000.0, 300_000.0, 200_000.0);
        CompanyRecord::from(&financials)
    }

    #[test]
    fn test_runner_batch() {
        let runner = ValuationRunner::new(ValuationConfig::default());

        let mut records: Vec<_> = [500_000.0, 1_500_000.0, 3_000_000.0]
            .iter()
            .map(|&ni| test_record(ni))
            .collect();
        records.push(CompanyRecord::default());

        let results = runner.run_batch(&records);
        assert_eq!(results.len(), 4);

        // Higher income should result in higher CFROI, in input order
        assert!(results[0].cfroi < results[1].cfroi);
        assert!(results[1].cfroi < results[2].cfroi);

        // Empty record has no required fields
        assert!(results[3].is_zero());
    }

    #[test]
    fn test_failures_counted_from_errors() {
        let runner = ValuationRunner::new(ValuationConfig::default());

        // Valid but empty balance sheet values to all zeros without failing
        let empty_books = CompanyRecord::from(&CompanyFinancials::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        let records = vec![test_record(1_500_000.0), empty_books, CompanyRecord::default()];

        let batch = runner.run_batch_detailed(&records);
        assert_eq!(batch.results.len(), 3);
        assert!(batch.results[1].is_zero());
        assert!(batch.results[2].is_zero());
        assert_eq!(batch.failed, vec![2]);
        assert_eq!(runner.run_batch(&records), batch.results);
    }

    #[test]
    fn test_batch_matches_single_runs() {
        let runner = ValuationRunner::new(ValuationConfig::default());
        let records: Vec<_> = (1..=20).map(|i| test_record(100_000.0 * i as f64)).collect();

        let batch = runner.run_batch(&records);
        for (record, result) in records.iter().zip(&batch) {
            assert_eq!(runner.run(record), *result);
        }
        assert_eq!(runner.model().config().fade_rate, 0.04);
    }
}
