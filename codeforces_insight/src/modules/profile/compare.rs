use codeforces_insight_libs::codeforces::client::CodeforcesApi;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::modules::error::{ApiError, InvalidHandle};
use crate::modules::profile::aggregator::{self, SolvedProblem, UserProfile};
use crate::modules::utils::is_valid_handle;

#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub user1: Option<String>,
    pub user2: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBrief {
    pub handle: String,
    pub rating: i64,
    pub max_rating: i64,
    pub rank: String,
    pub solved_count: usize,
}

impl UserBrief {
    fn from_profile(profile: &UserProfile) -> Self {
        Self {
            handle: profile.handle.clone(),
            rating: profile.rating,
            max_rating: profile.max_rating,
            rank: profile.rank.clone(),
            solved_count: profile.solved_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagComparison {
    pub tag: String,
    pub user1: u64,
    pub user2: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingComparison {
    pub user1: i64,
    pub user2: i64,
    pub max_user1: i64,
    pub max_user2: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub common_problems: Vec<SolvedProblem>,
    pub user1_unique: Vec<SolvedProblem>,
    pub user2_unique: Vec<SolvedProblem>,
    pub tag_distribution_comparison: Vec<TagComparison>,
    pub rating_comparison: RatingComparison,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub user1: UserBrief,
    pub user2: UserBrief,
    pub comparison: Comparison,
}

/// Identity key for cross-user matching. Contest-less (gym) problems all
/// share the same marker, so the name has to participate in the key.
fn problem_key(problem: &SolvedProblem) -> String {
    let contest = problem
        .contest_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| String::from("GYM"));
    format!("{}-{}-{}", contest, problem.index, problem.name)
}

fn sanitize_handle(raw: Option<&String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Validate both handles, fetch both profiles in parallel, and build the
/// comparison. Format offenders are collected for BOTH fields before
/// failing, and no fetch is issued when either handle is rejected.
pub async fn compare_users<C>(api: &C, request: CompareRequest) -> Result<CompareResponse, ApiError>
where
    C: CodeforcesApi + Sync,
{
    let (user1, user2) = match (
        sanitize_handle(request.user1.as_ref()),
        sanitize_handle(request.user2.as_ref()),
    ) {
        (Some(user1), Some(user2)) => (user1, user2),
        _ => {
            return Err(ApiError::Validation(String::from(
                "Both \"user1\" and \"user2\" must be provided in JSON body.",
            )))
        }
    };

    let mut details = Vec::new();
    if !is_valid_handle(&user1) {
        details.push(InvalidHandle {
            field: String::from("user1"),
            value: user1.clone(),
        });
    }
    if !is_valid_handle(&user2) {
        details.push(InvalidHandle {
            field: String::from("user2"),
            value: user2.clone(),
        });
    }
    if !details.is_empty() {
        return Err(ApiError::InvalidHandles {
            message: String::from(
                "Handles may contain only Latin letters, digits, underscore (_), or dash (-).",
            ),
            details,
        });
    }

    let (profile1, profile2) = tokio::try_join!(
        aggregator::get_user_profile(api, &user1),
        aggregator::get_user_profile(api, &user2),
    )?;

    Ok(build_comparison(&profile1, &profile2))
}

/// Pure comparison over two aggregated profiles with FULL solved sets.
pub fn build_comparison(profile1: &UserProfile, profile2: &UserProfile) -> CompareResponse {
    let keys1: HashSet<String> = profile1.solved_problems.iter().map(problem_key).collect();
    let keys2: HashSet<String> = profile2.solved_problems.iter().map(problem_key).collect();

    let mut common_problems = Vec::new();
    let mut user1_unique = Vec::new();
    for problem in &profile1.solved_problems {
        if keys2.contains(&problem_key(problem)) {
            common_problems.push(problem.clone());
        } else {
            user1_unique.push(problem.clone());
        }
    }
    let user2_unique: Vec<SolvedProblem> = profile2
        .solved_problems
        .iter()
        .filter(|problem| !keys1.contains(&problem_key(problem)))
        .cloned()
        .collect();

    // Alphabetical pre-order + stable sort pins the tie-break on equal
    // combined counts.
    let mut tag_distribution_comparison: Vec<TagComparison> = profile1
        .problems_by_tag
        .keys()
        .chain(profile2.problems_by_tag.keys())
        .collect::<BTreeSet<&String>>()
        .into_iter()
        .map(|tag| TagComparison {
            tag: tag.clone(),
            user1: profile1.problems_by_tag.get(tag).copied().unwrap_or(0),
            user2: profile2.problems_by_tag.get(tag).copied().unwrap_or(0),
        })
        .collect();
    tag_distribution_comparison
        .sort_by(|a, b| (b.user1 + b.user2).cmp(&(a.user1 + a.user2)));

    CompareResponse {
        user1: UserBrief::from_profile(profile1),
        user2: UserBrief::from_profile(profile2),
        comparison: Comparison {
            common_problems,
            user1_unique,
            user2_unique,
            tag_distribution_comparison,
            rating_comparison: RatingComparison {
                user1: profile1.rating,
                user2: profile2.rating,
                max_user1: profile1.max_rating,
                max_user2: profile2.max_rating,
            },
        },
    }
}
