use axum::{extract::Extension, Json};
use codeforces_insight_libs::codeforces::client::CodeforcesClient;
use std::sync::Arc;

use crate::modules::error::ApiError;
use crate::modules::handlers::ApiResponse;
use crate::modules::profile::compare::{self, CompareRequest, CompareResponse};

pub async fn compare_users(
    Extension(client): Extension<Arc<CodeforcesClient>>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<ApiResponse<CompareResponse>>, ApiError> {
    let result = compare::compare_users(client.as_ref(), request).await?;
    Ok(ApiResponse::new(result))
}
