pub mod leaderboard;
pub mod store;

use codeforces_insight_libs::codeforces::client::CodeforcesApi;
use serde::Deserialize;

use crate::modules::error::ApiError;
use crate::modules::profile::aggregator;
use store::{NewTeam, Team, TeamStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: Option<String>,
    pub members: Option<Vec<String>>,
    pub created_by: Option<String>,
}

/// Validate the request and every member against Codeforces, then persist.
///
/// Member checks run one at a time so the shared rate gate spaces them out,
/// and the loop never short-circuits: every invalid member is collected and
/// reported together, and nothing is persisted when any check fails.
pub async fn create_team<C, S>(
    api: &C,
    store: &S,
    request: CreateTeamRequest,
) -> Result<Team, ApiError>
where
    C: CodeforcesApi + Sync,
    S: TeamStore + Sync,
{
    let name = request
        .name
        .map(|name| name.trim().to_string())
        .unwrap_or_default();
    let members: Vec<String> = request
        .members
        .unwrap_or_default()
        .into_iter()
        .map(|member| member.trim().to_string())
        .collect();
    let created_by = request
        .created_by
        .map(|creator| creator.trim().to_string())
        .unwrap_or_default();

    if name.is_empty() || members.is_empty() || members.iter().any(|member| member.is_empty()) {
        return Err(ApiError::Validation(String::from(
            "Team name and members array are required",
        )));
    }
    if created_by.is_empty() {
        return Err(ApiError::Validation(String::from(
            "createdBy field is required",
        )));
    }

    let mut invalid_members = Vec::new();
    for member in &members {
        if let Err(e) = aggregator::member_summary(api, member).await {
            tracing::warn!("member validation failed for {}: {}", member, e);
            invalid_members.push(member.clone());
        }
    }
    if !invalid_members.is_empty() {
        return Err(ApiError::InvalidMembers { invalid_members });
    }

    let team = store
        .insert(NewTeam {
            name,
            members,
            created_by,
        })
        .await?;
    tracing::info!("team {} created with {} members", team.id, team.members.len());

    Ok(team)
}
