//! HTTP routes for the query service.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::page::render_index;
use super::AppState;
use crate::engine::query::{parse_year_input, QueryKind};
use crate::error::QueryError;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query_type: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    /// Number or numeric string; blank means absent.
    #[serde(default)]
    pub year: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct YearsResponse {
    pub years: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rows: usize,
}

fn year_from_json(value: Option<&Value>) -> Result<Option<i32>, QueryError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .map(Some)
            .ok_or_else(|| QueryError::InvalidYear(n.to_string())),
        Some(Value::String(s)) => parse_year_input(s),
        Some(other) => Err(QueryError::InvalidYear(other.to_string())),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Query menu plus the company and year catalogs
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.engine))
}

/// Answer one predefined query. Always 200 with a `response` string.
pub async fn handle_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Json<QueryResponse> {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected query body");
            return Json(QueryResponse {
                response: format!("處理查詢時發生錯誤: {}", rejection.body_text()),
            });
        }
    };
    debug!(?request, "Query received");

    let response = answer(&state, &request).unwrap_or_else(|e| e.to_string());
    Json(QueryResponse { response })
}

fn answer(state: &AppState, request: &QueryRequest) -> Result<String, QueryError> {
    let kind: QueryKind = request.query_type.as_deref().unwrap_or_default().parse()?;
    let year = year_from_json(request.year.as_ref())?;
    Ok(state.engine.dispatch(kind, request.company.as_deref(), year))
}

pub async fn companies(State(state): State<AppState>) -> Json<CompaniesResponse> {
    Json(CompaniesResponse {
        companies: state.engine.available_companies(),
    })
}

pub async fn years(State(state): State<AppState>) -> Json<YearsResponse> {
    Json(YearsResponse {
        years: state.engine.available_years(),
    })
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rows: state.engine.table().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_from_json() {
        assert_eq!(year_from_json(None).unwrap(), None);
        assert_eq!(year_from_json(Some(&json!(null))).unwrap(), None);
        assert_eq!(year_from_json(Some(&json!(2022))).unwrap(), Some(2022));
        assert_eq!(year_from_json(Some(&json!("2023"))).unwrap(), Some(2023));
        assert_eq!(year_from_json(Some(&json!(""))).unwrap(), None);
        assert!(year_from_json(Some(&json!("abc"))).is_err());
        assert!(year_from_json(Some(&json!(2022.5))).is_err());
        assert!(year_from_json(Some(&json!([2022]))).is_err());
    }
}
