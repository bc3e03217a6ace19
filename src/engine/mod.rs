//! Query engine over the immutable financials table.
//!
//! Every public query returns display text. Lookups that find nothing are
//! `QueryError` values rendered through `Display`, so a bad query never
//! escapes as a fault.

pub mod query;

use crate::error::{DataLoadError, QueryError};
use crate::loader::load_table;
use crate::models::{FinancialRow, FinancialTable};
use crate::utils::{fmt_amount, fmt_opt_amount};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

type Answer = Result<String, QueryError>;

fn render(answer: Answer) -> String {
    answer.unwrap_or_else(|e| {
        debug!("Query resolved to: {:?}", e);
        e.to_string()
    })
}

pub struct QueryEngine {
    table: FinancialTable,
}

impl QueryEngine {
    pub fn new(table: FinancialTable) -> Self {
        Self { table }
    }

    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        load_table(path).map(Self::new)
    }

    pub fn table(&self) -> &FinancialTable {
        &self.table
    }

    fn find(&self, company: &str, year: i32) -> Result<&FinancialRow, QueryError> {
        self.table
            .rows
            .iter()
            .find(|r| r.matches(company, year))
            .ok_or_else(|| QueryError::NoMatch {
                company: company.to_string(),
                year,
            })
    }

    /// Rows for `company` that carry a fiscal year, ascending by year.
    fn history(&self, company: &str) -> Vec<(i32, &FinancialRow)> {
        let mut rows: Vec<_> = self
            .table
            .rows
            .iter()
            .filter(|r| r.company == company)
            .filter_map(|r| r.fiscal_year.map(|y| (y, r)))
            .collect();
        rows.sort_by_key(|(year, _)| *year);
        rows
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn company_revenue(&self, company: &str, year: i32) -> String {
        render(self.find(company, year).map(|row| {
            format!(
                "{company}在{year}年的總營收為 ${} 百萬美元",
                fmt_opt_amount(row.total_revenue)
            )
        }))
    }

    pub fn net_income_change(&self, company: &str) -> String {
        render(self.try_net_income_change(company))
    }

    fn try_net_income_change(&self, company: &str) -> Answer {
        let history = self.history(company);
        let [.., (previous_year, previous), (latest_year, latest)] = history.as_slice() else {
            return Err(QueryError::InsufficientData(company.to_string()));
        };
        let (previous_year, latest_year) = (*previous_year, *latest_year);

        let income = |year: i32, row: &FinancialRow| {
            row.net_income.ok_or_else(|| QueryError::MissingValue {
                company: company.to_string(),
                year,
                metric: "淨利",
            })
        };
        let previous = income(previous_year, *previous)?;
        let latest = income(latest_year, *latest)?;

        let span = format!("{company}的淨利從{previous_year}年到{latest_year}年");
        if latest == previous {
            return Ok(format!("{span}持平，維持在${}百萬美元", fmt_amount(latest)));
        }
        // Relative to |previous| so a shrinking loss still reads as growth.
        let change = (latest - previous) / previous.abs() * 100.0;
        if !change.is_finite() {
            return Err(QueryError::ChangeUndefined {
                company: company.to_string(),
                previous_year,
                latest_year,
            });
        }
        let (prev, last) = (fmt_amount(previous), fmt_amount(latest));
        if change > 0.0 {
            Ok(format!(
                "{span}增長了{change:.1}%，從${prev}百萬美元增加到${last}百萬美元"
            ))
        } else {
            Ok(format!(
                "{span}下降了{:.1}%，從${prev}百萬美元減少到${last}百萬美元",
                change.abs()
            ))
        }
    }

    pub fn highest_revenue_company(&self, year: i32) -> String {
        render(self.try_highest_revenue_company(year))
    }

    fn try_highest_revenue_company(&self, year: i32) -> Answer {
        let mut best: Option<(&FinancialRow, f64)> = None;
        for row in self.table.rows.iter().filter(|r| r.fiscal_year == Some(year)) {
            let Some(revenue) = row.total_revenue else {
                continue;
            };
            // Strictly greater: ties keep the earliest row.
            if best.is_none_or(|(_, top)| revenue > top) {
                best = Some((row, revenue));
            }
        }
        let (row, revenue) = best.ok_or(QueryError::NoYearData(year))?;
        Ok(format!(
            "{year}年營收最高的公司是{}，總營收為${}百萬美元",
            row.company,
            fmt_amount(revenue)
        ))
    }

    pub fn profit_margin(&self, company: &str, year: i32) -> String {
        render(self.find(company, year).and_then(|row| {
            let margin = row.profit_margin_pct.ok_or_else(|| QueryError::MarginUndefined {
                company: company.to_string(),
                year,
            })?;
            Ok(format!("{company}在{year}年的淨利潤率為{margin:.2}%"))
        }))
    }

    pub fn cash_flow_trend(&self, company: &str) -> String {
        render(self.try_cash_flow_trend(company))
    }

    fn try_cash_flow_trend(&self, company: &str) -> Answer {
        let history = self.history(company);
        if history.is_empty() {
            return Err(QueryError::NoCompanyData(company.to_string()));
        }
        let mut out = format!("{company}的營運現金流趨勢：\n");
        for (year, row) in history {
            out.push_str(&format!(
                "{year}年: ${}百萬美元\n",
                fmt_opt_amount(row.cash_flow_from_operations)
            ));
        }
        Ok(out.trim_end().to_string())
    }

    // ── Catalog ───────────────────────────────────────────────────────────────

    /// Distinct company names in first-appearance order.
    pub fn available_companies(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.table
            .rows
            .iter()
            .filter(|r| seen.insert(r.company.as_str()))
            .map(|r| r.company.clone())
            .collect()
    }

    /// Distinct fiscal years, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.table.rows.iter().filter_map(|r| r.fiscal_year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}
