use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use codeforces_insight_libs::codeforces::client::CodeforcesClient;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::modules::error::ApiError;
use crate::modules::handlers::ApiResponse;
use crate::modules::teams::leaderboard::{self, Leaderboard};
use crate::modules::teams::store::{PgTeamStore, Team, TeamStore};
use crate::modules::teams::{self, CreateTeamRequest};

pub async fn create_team(
    Extension(client): Extension<Arc<CodeforcesClient>>,
    Extension(store): Extension<Arc<PgTeamStore>>,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Team>>), ApiError> {
    let team = teams::create_team(client.as_ref(), store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(team)))
}

pub async fn list_teams(
    Extension(store): Extension<Arc<PgTeamStore>>,
) -> Result<Json<ApiResponse<Vec<Team>>>, ApiError> {
    let teams = store.find_all().await?;
    Ok(ApiResponse::new(teams))
}

pub async fn get_team(
    Path(id): Path<i64>,
    Extension(store): Extension<Arc<PgTeamStore>>,
) -> Result<Json<ApiResponse<Team>>, ApiError> {
    let team = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("Team not found")))?;
    Ok(ApiResponse::new(team))
}

pub async fn delete_team(
    Path(id): Path<i64>,
    Extension(store): Extension<Arc<PgTeamStore>>,
) -> Result<Json<Value>, ApiError> {
    if !store.delete(id).await? {
        return Err(ApiError::NotFound(String::from("Team not found")));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Team deleted successfully",
    })))
}

pub async fn get_leaderboard(
    Path(id): Path<i64>,
    Extension(client): Extension<Arc<CodeforcesClient>>,
    Extension(store): Extension<Arc<PgTeamStore>>,
) -> Result<Json<ApiResponse<Leaderboard>>, ApiError> {
    let board = leaderboard::get_leaderboard(client.as_ref(), store.as_ref(), id).await?;
    Ok(ApiResponse::new(board))
}
