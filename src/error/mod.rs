use std::path::PathBuf;
use thiserror::Error;

/// Fatal startup failure: nothing is served without a loaded table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse CSV header: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Logical query outcomes. `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("抱歉，找不到{company}在{year}年的數據")]
    NoMatch { company: String, year: i32 },

    #[error("抱歉，{0}年沒有可用數據")]
    NoYearData(i32),

    #[error("抱歉，找不到{0}的數據")]
    NoCompanyData(String),

    #[error("{0}的數據不足以計算變化趨勢")]
    InsufficientData(String),

    #[error("{company}的淨利從{previous_year}年到{latest_year}年的變化率無法計算（{previous_year}年淨利為零）")]
    ChangeUndefined {
        company: String,
        previous_year: i32,
        latest_year: i32,
    },

    #[error("{company}在{year}年的淨利潤率無法計算（總營收為零或缺失）")]
    MarginUndefined { company: String, year: i32 },

    #[error("抱歉，{company}在{year}年缺少{metric}數據")]
    MissingValue {
        company: String,
        year: i32,
        metric: &'static str,
    },

    #[error("請提供{0}")]
    MissingParameters(&'static str),

    #[error("請輸入有效的年份數字")]
    InvalidYear(String),

    #[error("不支援的查詢類型")]
    UnsupportedQuery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_column() {
        let err = DataLoadError::MissingColumns(vec!["Net Income".into(), "Company".into()]);
        assert_eq!(err.to_string(), "missing required columns: Net Income, Company");
    }

    #[test]
    fn test_query_error_text() {
        let err = QueryError::NoMatch { company: "Apple".into(), year: 1999 };
        assert_eq!(err.to_string(), "抱歉，找不到Apple在1999年的數據");
        assert_eq!(QueryError::MissingParameters("年份").to_string(), "請提供年份");
    }
}
