use axum::{extract::State, Json};

use crate::dto::{
    BatchAnalysisRequest, BatchAnalysisResponse, TagAnalysisRequest, TagAnalysisResponse,
};
use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::services::tag_extractor::{self, ExtractionOptions};
use crate::AppState;

pub async fn analyze_tags(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<TagAnalysisRequest>,
) -> AppResult<Json<TagAnalysisResponse>> {
    let result =
        tag_extractor::extract_tags(state.llm.as_ref(), &body, extraction_options(&state)).await;
    tracing::debug!(date = %body.date, tags = result.tags.len(), "Tags analyzed");
    Ok(Json(result))
}

pub async fn analyze_batch(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<BatchAnalysisRequest>,
) -> AppResult<Json<BatchAnalysisResponse>> {
    let result =
        tag_extractor::extract_batch(state.llm.as_ref(), &body.entries, extraction_options(&state))
            .await;
    Ok(Json(result))
}

fn extraction_options(state: &AppState) -> ExtractionOptions {
    ExtractionOptions {
        canonicalize: state.config.canonicalize_tags,
    }
}
