use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::dto::RootResponse;
use crate::AppState;

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} is running", state.config.app_name),
        version: env!("CARGO_PKG_VERSION"),
        docs: "/docs",
    })
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Index of the public endpoints.
pub async fn docs(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": state.config.app_name,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "LLM-powered mood tracking API with automatic tag extraction and intelligent summaries",
        "endpoints": [
            { "method": "POST", "path": "/api/analyze/tags", "body": "TagAnalysisRequest { text, date, mood? }" },
            { "method": "POST", "path": "/api/analyze/batch", "body": "BatchAnalysisRequest { entries }" },
            { "method": "POST", "path": "/api/summaries/generate", "body": "SummaryRequest { date_range, entries, focus? }" },
            { "method": "GET", "path": "/health" },
        ],
    }))
}
