use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Path},
    Json,
};
use codeforces_insight_libs::codeforces::client::{CodeforcesApi, CodeforcesClient};
use codeforces_insight_libs::codeforces::model::CfUser;
use http::request::Parts;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::modules::error::ApiError;
use crate::modules::handlers::ApiResponse;
use crate::modules::profile::aggregator::{self, SolvedProblem, UserProfile};

pub async fn get_user_profile(
    Path(username): Path<String>,
    Extension(client): Extension<Arc<CodeforcesClient>>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = aggregator::get_user_profile(client.as_ref(), &username).await?;
    Ok(ApiResponse::new(profile.truncate_solved_sample()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub handle: String,
    pub rating: i64,
    pub max_rating: i64,
    pub rank: String,
    pub max_rank: String,
    pub country: String,
    pub organization: String,
    pub avatar: String,
    pub contribution: i64,
    pub friend_of_count: i64,
    pub registration_time_seconds: Option<i64>,
}

impl From<CfUser> for BasicInfo {
    fn from(info: CfUser) -> Self {
        Self {
            handle: info.handle,
            rating: info.rating.unwrap_or(0),
            max_rating: info.max_rating.unwrap_or(0),
            rank: info.rank.unwrap_or_else(|| String::from("Unrated")),
            max_rank: info.max_rank.unwrap_or_else(|| String::from("Unrated")),
            country: info.country.unwrap_or_else(|| String::from("Unknown")),
            organization: info.organization.unwrap_or_else(|| String::from("N/A")),
            avatar: info.avatar.or(info.title_photo).unwrap_or_default(),
            contribution: info.contribution.unwrap_or(0),
            friend_of_count: info.friend_of_count.unwrap_or(0),
            registration_time_seconds: info.registration_time_seconds,
        }
    }
}

pub async fn get_user_info(
    Path(username): Path<String>,
    Extension(client): Extension<Arc<CodeforcesClient>>,
) -> Result<Json<ApiResponse<BasicInfo>>, ApiError> {
    let info = client.user_info(&username).await?;
    Ok(ApiResponse::new(BasicInfo::from(info)))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SolvedParameter {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Query-string extractor that parses and validates in one step; rejects
/// with the uniform 400 envelope.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value: T = serde_structuredqs::from_str(query).map_err(|rejection| {
            tracing::error!("Parsing error: {}", rejection);
            ApiError::Validation(format!("invalid format query string: [{}]", rejection))
        })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            ApiError::Validation(format!("Validation error: [{}]", rejection).replace('\n', ", "))
        })?;

        Ok(ValidatedQuery(value))
    }
}

#[derive(Debug, Serialize)]
pub struct SolvedPage {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub problems: Vec<SolvedProblem>,
}

pub async fn get_solved_problems(
    Path(username): Path<String>,
    ValidatedQuery(params): ValidatedQuery<SolvedParameter>,
    Extension(client): Extension<Arc<CodeforcesClient>>,
) -> Result<Json<ApiResponse<SolvedPage>>, ApiError> {
    let submissions = client.user_status(&username).await?;
    let solved = aggregator::collect_solved(&submissions);

    let limit = params.limit.unwrap_or(50) as usize;
    let offset = params.offset.unwrap_or(0) as usize;
    let total = solved.problems.len();
    let problems: Vec<SolvedProblem> = solved
        .problems
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();

    Ok(ApiResponse::new(SolvedPage {
        total,
        limit,
        offset,
        problems,
    }))
}
