use crate::models::{FinancialRow, RawFinancialRow};
use std::collections::HashSet;
use tracing::warn;

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse an amount in millions: strip thousands separators.
/// "394,328" → 394328.0 | "-1,234.5" → -1234.5 | "N/A" → None
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a fiscal year. Integral floats ("2022.0") are accepted.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f: f64 = s.parse().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// `net_income / total_revenue * 100`; undefined for zero or missing revenue,
/// and when the quotient overflows.
pub fn profit_margin(net_income: Option<f64>, total_revenue: Option<f64>) -> Option<f64> {
    match (net_income, total_revenue) {
        (Some(income), Some(revenue)) if revenue != 0.0 => {
            Some(income / revenue * 100.0).filter(|m| m.is_finite())
        }
        _ => None,
    }
}

// ── Pass 1: company identity ──────────────────────────────────────────────────

/// Blank company cells inherit the nearest preceding company in file order.
pub fn forward_fill_company(rows: Vec<RawFinancialRow>) -> Vec<RawFinancialRow> {
    let mut last: Option<String> = None;
    rows.into_iter()
        .map(|mut row| {
            match non_blank(row.company.as_deref()) {
                Some(name) => last = Some(name.to_string()),
                None => row.company = last.clone(),
            }
            row
        })
        .collect()
}

// ── Pass 2: numeric coercion ─────────────────────────────────────────────────

/// Returns `None` only when the row has no company at all.
pub fn raw_to_row(row: &RawFinancialRow) -> Option<FinancialRow> {
    let company = non_blank(row.company.as_deref())?.to_string();

    let amount = |field: &Option<String>| field.as_deref().and_then(parse_amount);
    let total_revenue = amount(&row.total_revenue);
    let net_income = amount(&row.net_income);

    Some(FinancialRow {
        company,
        fiscal_year: row.fiscal_year.as_deref().and_then(parse_year),
        total_revenue,
        net_income,
        total_assets: amount(&row.total_assets),
        total_liabilities: amount(&row.total_liabilities),
        cash_flow_from_operations: amount(&row.cash_flow),
        profit_margin_pct: profit_margin(net_income, total_revenue),
    })
}

pub fn clean_rows(raw: Vec<RawFinancialRow>) -> Vec<FinancialRow> {
    forward_fill_company(raw)
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let cleaned = raw_to_row(row);
            if cleaned.is_none() {
                warn!("Row {}: no company name and nothing to inherit, skipped", i + 1);
            }
            cleaned
        })
        .collect()
}

/// Keep the first row for each (company, fiscal year). Rows without a year
/// are never treated as duplicates.
pub fn dedupe_company_years(rows: Vec<FinancialRow>) -> Vec<FinancialRow> {
    let mut seen: HashSet<(String, i32)> = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            let Some(year) = row.fiscal_year else {
                return true;
            };
            let fresh = seen.insert((row.company.clone(), year));
            if !fresh {
                warn!("Duplicate row for {} {}, keeping the first", row.company, year);
            }
            fresh
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
