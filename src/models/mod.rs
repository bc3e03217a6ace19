use chrono::NaiveDateTime;
use std::path::PathBuf;

// ── Normalised row ────────────────────────────────────────────────────────────

/// One company's figures for one fiscal year. Amounts are in millions.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRow {
    pub company: String,
    pub fiscal_year: Option<i32>,
    pub total_revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub cash_flow_from_operations: Option<f64>,
    pub profit_margin_pct: Option<f64>, // derived
}

impl FinancialRow {
    pub fn matches(&self, company: &str, year: i32) -> bool {
        self.company == company && self.fiscal_year == Some(year)
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// Rows in file order with at most one row per (company, fiscal year).
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialTable {
    pub rows: Vec<FinancialRow>,
    pub source: PathBuf,
    pub loaded_at: NaiveDateTime,
}

impl FinancialTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Raw CSV rows ──────────────────────────────────────────────────────────────

/// Company, Fiscal Year, Total Revenue, Net Income, Total Assets,
/// Total Liabilities, Cash Flow from Operations
#[derive(Debug, Clone, Default)]
pub struct RawFinancialRow {
    pub company: Option<String>,
    pub fiscal_year: Option<String>,
    pub total_revenue: Option<String>,
    pub net_income: Option<String>,
    pub total_assets: Option<String>,
    pub total_liabilities: Option<String>,
    pub cash_flow: Option<String>,
}
