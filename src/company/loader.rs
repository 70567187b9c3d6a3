//! Load company records from CSV or JSON

use super::CompanyRecord;
use crate::error::Result;
use csv::Reader;
use std::io::Read;
use std::path::Path;

/// Load all company records from a CSV file
///
/// Column headers match the record field names (`gross_assets`,
/// `accumulated_depreciation`, ...). Missing columns and empty cells load as
/// absent values; the valuation decides what to do about them.
pub fn load_companies<P: AsRef<Path>>(path: P) -> Result<Vec<CompanyRecord>> {
    let reader = Reader::from_path(path)?;
    collect_records(reader)
}

/// Load company records from any CSV reader (e.g., string buffer, stdin)
pub fn load_companies_from_reader<R: Read>(reader: R) -> Result<Vec<CompanyRecord>> {
    collect_records(Reader::from_reader(reader))
}

/// Load company records from a JSON array
pub fn load_companies_from_json<R: Read>(reader: R) -> Result<Vec<CompanyRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

fn collect_records<R: Read>(mut reader: Reader<R>) -> Result<Vec<CompanyRecord>> {
    let mut companies = Vec::new();

    for result in reader.deserialize() {
        let record: CompanyRecord = result?;
        companies.push(record);
    }

    log::debug!("Loaded {} company records", companies.len());
    Ok(companies)
}
