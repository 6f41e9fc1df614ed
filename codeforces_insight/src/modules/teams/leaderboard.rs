use codeforces_insight_libs::codeforces::client::CodeforcesApi;
use serde::Serialize;

use crate::modules::error::ApiError;
use crate::modules::profile::aggregator::{self, MemberSummary};
use crate::modules::teams::store::TeamStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub handle: String,
    pub rating: i64,
    pub max_rating: i64,
    pub rank: String,
    pub max_rank: String,
    pub country: String,
    pub organization: String,
    pub solved_count: usize,
    pub avatar: String,
    pub contribution: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub position: usize,
}

impl LeaderboardEntry {
    fn from_summary(summary: MemberSummary) -> Self {
        Self {
            handle: summary.handle,
            rating: summary.rating,
            max_rating: summary.max_rating,
            rank: summary.rank,
            max_rank: summary.max_rank,
            country: summary.country,
            organization: summary.organization,
            solved_count: summary.solved_count,
            avatar: summary.avatar,
            contribution: summary.contribution,
            error: None,
            position: 0,
        }
    }

    fn placeholder(handle: &str) -> Self {
        Self {
            handle: String::from(handle),
            rating: 0,
            max_rating: 0,
            rank: String::from("Unknown"),
            max_rank: String::from("Unknown"),
            country: String::from("Unknown"),
            organization: String::from("Unknown"),
            solved_count: 0,
            avatar: String::new(),
            contribution: 0,
            error: Some(String::from("Failed to fetch data")),
            position: 0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub team_id: i64,
    pub team_name: String,
    pub member_count: usize,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Build the ranked leaderboard for a team.
///
/// Member summaries are fetched one at a time through the shared rate gate.
/// A failed member does not abort the board; it shows up as a placeholder
/// entry with an error marker.
pub async fn get_leaderboard<C, S>(api: &C, store: &S, team_id: i64) -> Result<Leaderboard, ApiError>
where
    C: CodeforcesApi + Sync,
    S: TeamStore + Sync,
{
    let team = store
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("Team not found")))?;

    let mut entries = Vec::with_capacity(team.members.len());
    for member in &team.members {
        match aggregator::member_summary(api, member).await {
            Ok(summary) => entries.push(LeaderboardEntry::from_summary(summary)),
            Err(e) => {
                tracing::warn!("failed to fetch leaderboard data for {}: {}", member, e);
                entries.push(LeaderboardEntry::placeholder(member));
            }
        }
    }

    rank_entries(&mut entries);

    Ok(Leaderboard {
        team_id: team.id,
        team_name: team.name,
        member_count: team.members.len(),
        leaderboard: entries,
    })
}

/// Rating descending, ties by solved count descending; positions are
/// 1-based in sorted order.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then(b.solved_count.cmp(&a.solved_count))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.position = i + 1;
    }
}
