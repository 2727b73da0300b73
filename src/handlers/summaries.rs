use axum::{extract::State, Json};

use crate::dto::{SummaryRequest, SummaryResponse};
use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::services::summary_generator;
use crate::AppState;

pub async fn generate_summary(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SummaryRequest>,
) -> AppResult<Json<SummaryResponse>> {
    let summary = summary_generator::generate_summary(state.llm.as_ref(), &body).await;
    tracing::info!(
        start = %body.date_range.start,
        end = %body.date_range.end,
        focus = %body.focus,
        entries = body.entries.len(),
        source = ?summary.source,
        "Summary generated"
    );
    Ok(Json(summary))
}
