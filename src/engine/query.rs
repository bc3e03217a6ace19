use super::{render, QueryEngine};
use crate::error::QueryError;
use std::fmt;
use std::str::FromStr;

/// The five predefined questions, tagged the way the web form sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Revenue,
    IncomeChange,
    HighestRevenue,
    ProfitMargin,
    CashFlow,
}

impl QueryKind {
    /// Menu order: options 1–5.
    pub const ALL: [QueryKind; 5] = [
        QueryKind::Revenue,
        QueryKind::IncomeChange,
        QueryKind::HighestRevenue,
        QueryKind::ProfitMargin,
        QueryKind::CashFlow,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            QueryKind::Revenue => "revenue",
            QueryKind::IncomeChange => "income_change",
            QueryKind::HighestRevenue => "highest_revenue",
            QueryKind::ProfitMargin => "profit_margin",
            QueryKind::CashFlow => "cash_flow",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            QueryKind::Revenue => "查詢公司特定年份的總營收",
            QueryKind::IncomeChange => "查詢公司淨利變化趨勢",
            QueryKind::HighestRevenue => "查詢特定年份營收最高的公司",
            QueryKind::ProfitMargin => "查詢公司特定年份的利潤率",
            QueryKind::CashFlow => "查詢公司現金流趨勢",
        }
    }

    pub fn needs_company(self) -> bool {
        !matches!(self, QueryKind::HighestRevenue)
    }

    pub fn needs_year(self) -> bool {
        matches!(
            self,
            QueryKind::Revenue | QueryKind::HighestRevenue | QueryKind::ProfitMargin
        )
    }

    fn missing_parameters(self) -> &'static str {
        match (self.needs_company(), self.needs_year()) {
            (true, true) => "公司名稱和年份",
            (true, false) => "公司名稱",
            _ => "年份",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for QueryKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        QueryKind::ALL
            .into_iter()
            .find(|k| k.tag() == s)
            .ok_or_else(|| QueryError::UnsupportedQuery(s.to_string()))
    }
}

/// Parse free-text year input; blank means "not provided".
pub fn parse_year_input(s: &str) -> Result<Option<i32>, QueryError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse()
        .map(Some)
        .map_err(|_| QueryError::InvalidYear(s.to_string()))
}

impl QueryEngine {
    /// Route a query to its operation once the required parameters are
    /// present. A blank company counts as absent.
    pub fn dispatch(&self, kind: QueryKind, company: Option<&str>, year: Option<i32>) -> String {
        let company = company.map(str::trim).filter(|c| !c.is_empty());
        let missing = (kind.needs_company() && company.is_none())
            || (kind.needs_year() && year.is_none());
        if missing {
            return render(Err(QueryError::MissingParameters(kind.missing_parameters())));
        }

        match (kind, company, year) {
            (QueryKind::Revenue, Some(c), Some(y)) => self.company_revenue(c, y),
            (QueryKind::IncomeChange, Some(c), _) => self.net_income_change(c),
            (QueryKind::HighestRevenue, _, Some(y)) => self.highest_revenue_company(y),
            (QueryKind::ProfitMargin, Some(c), Some(y)) => self.profit_margin(c, y),
            (QueryKind::CashFlow, Some(c), _) => self.cash_flow_trend(c),
            _ => render(Err(QueryError::MissingParameters(kind.missing_parameters()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::sample_engine;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in QueryKind::ALL {
            assert_eq!(kind.tag().parse::<QueryKind>().unwrap(), kind);
        }
        let err = "weather".parse::<QueryKind>().unwrap_err();
        assert_eq!(err.to_string(), "不支援的查詢類型");
    }

    #[test]
    fn test_parse_year_input() {
        assert_eq!(parse_year_input(" 2022 ").unwrap(), Some(2022));
        assert_eq!(parse_year_input("").unwrap(), None);
        assert_eq!(
            parse_year_input("next year").unwrap_err().to_string(),
            "請輸入有效的年份數字"
        );
    }

    #[test]
    fn test_dispatch_missing_parameters() {
        let engine = sample_engine();
        assert_eq!(
            engine.dispatch(QueryKind::Revenue, Some("Apple"), None),
            "請提供公司名稱和年份"
        );
        assert_eq!(
            engine.dispatch(QueryKind::ProfitMargin, Some("  "), Some(2022)),
            "請提供公司名稱和年份"
        );
        assert_eq!(engine.dispatch(QueryKind::CashFlow, None, None), "請提供公司名稱");
        assert_eq!(
            engine.dispatch(QueryKind::HighestRevenue, Some("Apple"), None),
            "請提供年份"
        );
    }

    #[test]
    fn test_dispatch_routes_to_operation() {
        let engine = sample_engine();
        assert_eq!(
            engine.dispatch(QueryKind::Revenue, Some("Apple"), Some(2022)),
            engine.company_revenue("Apple", 2022)
        );
        assert_eq!(
            engine.dispatch(QueryKind::HighestRevenue, None, Some(2021)),
            engine.highest_revenue_company(2021)
        );
        assert_eq!(
            engine.dispatch(QueryKind::IncomeChange, Some("Tesla"), Some(1)),
            engine.net_income_change("Tesla")
        );
    }
}
