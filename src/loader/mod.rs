//! CSV loader for the company financials table.

pub mod cleaner;

use crate::error::DataLoadError;
use crate::models::{FinancialTable, RawFinancialRow};
use crate::utils::Timer;
use chrono::Utc;
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use self::cleaner::{clean_rows, dedupe_company_years};

pub const COMPANY: &str = "Company";
pub const FISCAL_YEAR: &str = "Fiscal Year";
pub const TOTAL_REVENUE: &str = "Total Revenue";
pub const NET_INCOME: &str = "Net Income";
pub const TOTAL_ASSETS: &str = "Total Assets";
pub const TOTAL_LIABILITIES: &str = "Total Liabilities";
pub const CASH_FLOW: &str = "Cash Flow from Operations";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COMPANY,
    FISCAL_YEAR,
    TOTAL_REVENUE,
    NET_INCOME,
    TOTAL_ASSETS,
    TOTAL_LIABILITIES,
    CASH_FLOW,
];

/// Header positions of the required columns, in `REQUIRED_COLUMNS` order.
#[derive(Debug, Clone, Copy)]
struct ColumnMap([usize; 7]);

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, DataLoadError> {
        let mut idx = [0usize; 7];
        let mut missing = Vec::new();
        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h.trim() == name) {
                Some(i) => *slot = i,
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(Self(idx))
        } else {
            Err(DataLoadError::MissingColumns(missing))
        }
    }

    fn extract(&self, record: &StringRecord) -> RawFinancialRow {
        let field = |i: usize| record.get(self.0[i]).map(|s| s.to_string());
        RawFinancialRow {
            company: field(0),
            fiscal_year: field(1),
            total_revenue: field(2),
            net_income: field(3),
            total_assets: field(4),
            total_liabilities: field(5),
            cash_flow: field(6),
        }
    }
}

/// Load and normalise the financials CSV at `path`.
pub fn load_table(path: &Path) -> Result<FinancialTable, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_table_from_reader(file, path)
}

/// Parse any CSV source. Malformed records are skipped; only the header can
/// fail the load.
pub fn load_table_from_reader<R: Read>(
    reader: R,
    source: impl Into<PathBuf>,
) -> Result<FinancialTable, DataLoadError> {
    let source = source.into();
    let _t = Timer::start(format!("Loading {}", source.display()));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(reader.headers()?)?;
    debug!("Column positions: {:?}", columns);

    let mut raw = Vec::new();
    for (i, result) in reader.records().enumerate() {
        match result {
            Ok(record) => raw.push(columns.extract(&record)),
            Err(e) => warn!("Row {} in {:?}: {}", i + 1, source, e),
        }
    }

    let rows = dedupe_company_years(clean_rows(raw));
    info!("{:?}: {} rows loaded", source, rows.len());

    Ok(FinancialTable {
        rows,
        source,
        loaded_at: Utc::now().naive_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::QueryEngine;
    use std::io::Write;

    const SAMPLE: &str = "\
Company,Fiscal Year,Total Revenue,Net Income,Total Assets,Total Liabilities,Cash Flow from Operations
Apple,2022,\"394,328\",\"99,803\",\"352,755\",\"302,083\",\"122,151\"
,2023,\"383,285\",\"96,995\",\"352,583\",\"290,437\",\"110,543\"
Tesla,2022,\"81,462\",\"12,556\",\"82,338\",\"36,440\",\"14,724\"
";

    #[test]
    fn test_load_from_reader() {
        let table = load_table_from_reader(SAMPLE.as_bytes(), "sample.csv").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[1].company, "Apple");
        assert_eq!(table.rows[1].fiscal_year, Some(2023));
        assert_eq!(table.rows[2].cash_flow_from_operations, Some(14_724.0));
        assert_eq!(table.source, PathBuf::from("sample.csv"));
    }

    #[test]
    fn test_columns_located_by_name() {
        let csv = "\
Net Income,Notes,Company,Total Assets,Fiscal Year,Total Liabilities,Total Revenue,Cash Flow from Operations
10,ignored,Acme,1,2020,1,100,5
";
        let table = load_table_from_reader(csv.as_bytes(), "shuffled.csv").unwrap();
        let row = &table.rows[0];
        assert_eq!(row.company, "Acme");
        assert_eq!(row.total_revenue, Some(100.0));
        assert_eq!(row.profit_margin_pct, Some(10.0));
    }

    #[test]
    fn test_missing_columns() {
        let csv = "Company,Fiscal Year,Total Revenue\nApple,2022,1\n";
        let err = load_table_from_reader(csv.as_bytes(), "thin.csv").unwrap_err();
        match err {
            DataLoadError::MissingColumns(cols) => assert_eq!(
                cols,
                [NET_INCOME, TOTAL_ASSETS, TOTAL_LIABILITIES, CASH_FLOW]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_record_tolerated() {
        let csv = "\
Company,Fiscal Year,Total Revenue,Net Income,Total Assets,Total Liabilities,Cash Flow from Operations
Apple,2022,100
";
        let table = load_table_from_reader(csv.as_bytes(), "short.csv").unwrap();
        assert_eq!(table.rows[0].total_revenue, Some(100.0));
        assert_eq!(table.rows[0].net_income, None);
    }

    #[test]
    fn test_file_not_found() {
        let err = load_table(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
    }

    #[test]
    fn test_reload_is_deterministic() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let first = load_table(file.path()).unwrap();
        let second = load_table(file.path()).unwrap();
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.source, file.path());

        let (a, b) = (QueryEngine::new(first), QueryEngine::new(second));
        assert_eq!(a.available_companies(), b.available_companies());
        assert_eq!(a.available_years(), b.available_years());
        for company in ["Apple", "Tesla", "Google"] {
            assert_eq!(a.net_income_change(company), b.net_income_change(company));
            assert_eq!(a.cash_flow_trend(company), b.cash_flow_trend(company));
            for year in [2021, 2022, 2023] {
                assert_eq!(a.company_revenue(company, year), b.company_revenue(company, year));
                assert_eq!(a.profit_margin(company, year), b.profit_margin(company, year));
            }
        }
        for year in [2021, 2022, 2023] {
            assert_eq!(a.highest_revenue_company(year), b.highest_revenue_company(year));
        }
    }
}
