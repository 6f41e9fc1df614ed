use chrono::{NaiveDate, TimeZone, Utc};
use codeforces_insight_libs::codeforces::{
    client::CodeforcesApi,
    model::{CfRatingChange, CfSubmission},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::modules::error::ApiError;

/// Problems kept in the profile payload. The full solved set stays
/// available to the comparison and pagination paths; only the HTTP profile
/// body is capped.
pub const SOLVED_SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedProblem {
    pub contest_id: Option<i64>,
    pub index: String,
    pub name: String,
    pub rating: Option<i64>,
    pub tags: Vec<String>,
    pub solved_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
    pub total: u64,
    pub accepted: u64,
    pub wrong_answer: u64,
    pub time_limit_exceeded: u64,
    pub runtime_error: u64,
    pub compilation_error: u64,
    pub other: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapEntry {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestResult {
    pub contest_id: i64,
    pub contest_name: String,
    pub rank: i64,
    pub rating_update_time_seconds: i64,
    pub old_rating: i64,
    pub new_rating: i64,
}

impl From<CfRatingChange> for ContestResult {
    fn from(change: CfRatingChange) -> Self {
        Self {
            contest_id: change.contest_id,
            contest_name: change.contest_name,
            rank: change.rank,
            rating_update_time_seconds: change.rating_update_time_seconds,
            old_rating: change.old_rating,
            new_rating: change.new_rating,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
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
    pub solved_count: usize,
    pub submission_stats: SubmissionStats,
    pub problems_by_tag: BTreeMap<String, u64>,
    pub problems_by_rating: BTreeMap<i64, u64>,
    pub rating_history: Vec<ContestResult>,
    pub heatmap_data: Vec<HeatmapEntry>,
    pub solved_problems: Vec<SolvedProblem>,
}

impl UserProfile {
    /// Cap the solved-problem sample for payload-size control. The count
    /// and histogram fields keep reflecting the full deduplicated set.
    pub fn truncate_solved_sample(mut self) -> Self {
        self.solved_problems.truncate(SOLVED_SAMPLE_LIMIT);
        self
    }
}

/// Lighter per-user record used by team member validation and the
/// leaderboard; skips the rating history fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
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
}

pub struct SolvedSet {
    pub problems: Vec<SolvedProblem>,
    pub by_tag: BTreeMap<String, u64>,
    pub by_rating: BTreeMap<i64, u64>,
}

/// Deduplicate accepted submissions by problem identity.
///
/// The first accepted submission encountered in upstream order becomes the
/// representative solve. Tag counters and rating-bucket counters (rating
/// floored to the nearest 100) increment only on first sight, so repeated
/// accepted resubmissions never double-count.
pub fn collect_solved(submissions: &[CfSubmission]) -> SolvedSet {
    let mut seen: HashSet<(Option<i64>, String)> = HashSet::new();
    let mut problems = Vec::new();
    let mut by_tag: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_rating: BTreeMap<i64, u64> = BTreeMap::new();

    for submission in submissions {
        if submission.verdict.as_deref() != Some("OK") {
            continue;
        }

        let problem = &submission.problem;
        let index = problem.index.clone().unwrap_or_else(|| String::from("?"));
        if !seen.insert((problem.contest_id, index.clone())) {
            continue;
        }

        for tag in &problem.tags {
            *by_tag.entry(tag.clone()).or_insert(0) += 1;
        }
        if let Some(rating) = problem.rating {
            *by_rating.entry(rating / 100 * 100).or_insert(0) += 1;
        }

        problems.push(SolvedProblem {
            contest_id: problem.contest_id,
            index,
            name: problem.name.clone().unwrap_or_default(),
            rating: problem.rating,
            tags: problem.tags.clone(),
            solved_at: submission.creation_time_seconds,
        });
    }

    SolvedSet {
        problems,
        by_tag,
        by_rating,
    }
}

/// Verdict statistics over ALL submissions, not the deduplicated set.
pub fn verdict_stats(submissions: &[CfSubmission]) -> SubmissionStats {
    let mut stats = SubmissionStats {
        total: submissions.len() as u64,
        ..Default::default()
    };

    for submission in submissions {
        match submission.verdict.as_deref() {
            Some("OK") => stats.accepted += 1,
            Some("WRONG_ANSWER") => stats.wrong_answer += 1,
            Some("TIME_LIMIT_EXCEEDED") => stats.time_limit_exceeded += 1,
            Some("RUNTIME_ERROR") => stats.runtime_error += 1,
            Some("COMPILATION_ERROR") => stats.compilation_error += 1,
            _ => stats.other += 1,
        }
    }

    stats
}

/// Accepted submissions per UTC calendar day, in date order. Repeated
/// solves of the same problem on different days each count.
pub fn activity_heatmap(submissions: &[CfSubmission]) -> Vec<HeatmapEntry> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for submission in submissions {
        if submission.verdict.as_deref() != Some("OK") {
            continue;
        }
        if let Some(timestamp) = Utc.timestamp_opt(submission.creation_time_seconds, 0).single() {
            *days.entry(timestamp.date_naive()).or_insert(0) += 1;
        }
    }

    days.into_iter()
        .map(|(date, count)| HeatmapEntry {
            date: date.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}

/// Fetch and compose the complete profile for a handle.
///
/// The three upstream fetches run in parallel; user info and submission
/// history are hard requirements, while a missing rating history degrades
/// to an empty list (unrated users have none).
pub async fn get_user_profile<C>(api: &C, handle: &str) -> Result<UserProfile, ApiError>
where
    C: CodeforcesApi + Sync,
{
    let (info, status, rating) = tokio::join!(
        api.user_info(handle),
        api.user_status(handle),
        api.user_rating(handle),
    );

    let info = info?;
    let submissions = status?;
    let rating_history = rating.unwrap_or_else(|e| {
        tracing::warn!("no rating history for {}: {}", handle, e);
        Vec::new()
    });

    let solved = collect_solved(&submissions);
    let submission_stats = verdict_stats(&submissions);
    let heatmap_data = activity_heatmap(&submissions);

    Ok(UserProfile {
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
        solved_count: solved.problems.len(),
        submission_stats,
        problems_by_tag: solved.by_tag,
        problems_by_rating: solved.by_rating,
        rating_history: rating_history.into_iter().map(ContestResult::from).collect(),
        heatmap_data,
        solved_problems: solved.problems,
    })
}

/// Fetch the lightweight summary used by the team paths.
pub async fn member_summary<C>(api: &C, handle: &str) -> Result<MemberSummary, ApiError>
where
    C: CodeforcesApi + Sync,
{
    let info = api.user_info(handle).await?;
    let submissions = api.user_status(handle).await?;
    let solved = collect_solved(&submissions);

    Ok(MemberSummary {
        handle: info.handle,
        rating: info.rating.unwrap_or(0),
        max_rating: info.max_rating.unwrap_or(0),
        rank: info.rank.unwrap_or_else(|| String::from("Unrated")),
        max_rank: info.max_rank.unwrap_or_else(|| String::from("Unrated")),
        country: info.country.unwrap_or_else(|| String::from("Unknown")),
        organization: info.organization.unwrap_or_else(|| String::from("Unknown")),
        solved_count: solved.problems.len(),
        avatar: info.avatar.or(info.title_photo).unwrap_or_default(),
        contribution: info.contribution.unwrap_or(0),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use codeforces_insight_libs::codeforces::client::CodeforcesError;
    use codeforces_insight_libs::codeforces::model::{CfProblem, CfUser};

    fn submission(
        id: i64,
        verdict: Option<&str>,
        contest_id: Option<i64>,
        index: &str,
        name: &str,
        rating: Option<i64>,
        tags: &[&str],
        created: i64,
    ) -> CfSubmission {
        CfSubmission {
            id,
            verdict: verdict.map(String::from),
            problem: CfProblem {
                contest_id,
                index: Some(String::from(index)),
                name: Some(String::from(name)),
                rating,
                tags: tags.iter().map(|tag| String::from(*tag)).collect(),
            },
            creation_time_seconds: created,
        }
    }

    fn user(handle: &str) -> CfUser {
        CfUser {
            handle: String::from(handle),
            rating: Some(2100),
            max_rating: Some(2200),
            rank: Some(String::from("master")),
            max_rank: Some(String::from("international master")),
            country: None,
            organization: None,
            avatar: None,
            title_photo: Some(String::from("https://example.com/photo.jpg")),
            contribution: None,
            friend_of_count: None,
            registration_time_seconds: Some(1265987288),
        }
    }

    struct StubApi {
        info: CfUser,
        submissions: Vec<CfSubmission>,
        rating: Result<Vec<CfRatingChange>, ()>,
    }

    #[async_trait]
    impl CodeforcesApi for StubApi {
        async fn user_info(&self, _handle: &str) -> Result<CfUser, CodeforcesError> {
            Ok(self.info.clone())
        }

        async fn user_status(&self, _handle: &str) -> Result<Vec<CfSubmission>, CodeforcesError> {
            Ok(self.submissions.clone())
        }

        async fn user_rating(
            &self,
            _handle: &str,
        ) -> Result<Vec<CfRatingChange>, CodeforcesError> {
            match &self.rating {
                Ok(history) => Ok(history.clone()),
                Err(_) => Err(CodeforcesError::ApiError(String::from("rating unavailable"))),
            }
        }
    }

    // DAY is 2023-11-14 in UTC
    const DAY: i64 = 1699999200;

    #[test]
    fn resubmissions_count_once() {
        let submissions = vec![
            submission(1, Some("OK"), Some(1), "A", "Task A", Some(800), &["math"], DAY),
            submission(2, Some("OK"), Some(1), "A", "Task A", Some(800), &["math"], DAY + 60),
            submission(3, Some("WRONG_ANSWER"), Some(1), "B", "Task B", Some(900), &[], DAY),
            submission(4, Some("OK"), Some(2), "A", "Other A", Some(1250), &["dp"], DAY + 120),
        ];

        let solved = collect_solved(&submissions);

        assert_eq!(solved.problems.len(), 2);
        assert_eq!(solved.by_tag.get("math"), Some(&1));
        assert_eq!(solved.by_tag.get("dp"), Some(&1));
    }

    #[test]
    fn first_accepted_submission_is_representative() {
        let submissions = vec![
            submission(1, Some("OK"), Some(1), "A", "Task A", Some(800), &[], DAY + 500),
            submission(2, Some("OK"), Some(1), "A", "Task A", Some(800), &[], DAY),
        ];

        let solved = collect_solved(&submissions);

        // upstream order wins, not the earlier timestamp
        assert_eq!(solved.problems[0].solved_at, DAY + 500);
    }

    #[test]
    fn tags_contribute_one_count_each() {
        let submissions = vec![submission(
            1,
            Some("OK"),
            Some(1),
            "C",
            "Task C",
            Some(1500),
            &["graphs", "dfs and similar", "trees"],
            DAY,
        )];

        let solved = collect_solved(&submissions);

        assert_eq!(solved.by_tag.len(), 3);
        assert!(solved.by_tag.values().all(|count| *count == 1));
    }

    #[test]
    fn ratings_bucket_to_lower_hundred() {
        let submissions = vec![
            submission(1, Some("OK"), Some(1), "A", "A", Some(1999), &[], DAY),
            submission(2, Some("OK"), Some(1), "B", "B", Some(1900), &[], DAY),
            submission(3, Some("OK"), Some(1), "C", "C", None, &[], DAY),
        ];

        let solved = collect_solved(&submissions);

        assert_eq!(solved.by_rating.get(&1900), Some(&2));
        // unrated problems are not bucketed at all
        assert_eq!(solved.by_rating.values().sum::<u64>(), 2);
    }

    #[test]
    fn gym_problems_dedup_by_index_within_no_contest() {
        let submissions = vec![
            submission(1, Some("OK"), None, "A", "Gym A", None, &[], DAY),
            submission(2, Some("OK"), None, "A", "Gym A", None, &[], DAY + 60),
            submission(3, Some("OK"), None, "B", "Gym B", None, &[], DAY),
        ];

        let solved = collect_solved(&submissions);

        assert_eq!(solved.problems.len(), 2);
    }

    #[test]
    fn verdict_stats_cover_all_submissions() {
        let submissions = vec![
            submission(1, Some("OK"), Some(1), "A", "A", None, &[], DAY),
            submission(2, Some("OK"), Some(1), "A", "A", None, &[], DAY + 1),
            submission(3, Some("WRONG_ANSWER"), Some(1), "A", "A", None, &[], DAY + 2),
            submission(4, Some("TIME_LIMIT_EXCEEDED"), Some(1), "B", "B", None, &[], DAY),
            submission(5, Some("RUNTIME_ERROR"), Some(1), "B", "B", None, &[], DAY),
            submission(6, Some("COMPILATION_ERROR"), Some(1), "B", "B", None, &[], DAY),
            submission(7, Some("CHALLENGED"), Some(1), "B", "B", None, &[], DAY),
            submission(8, None, Some(1), "B", "B", None, &[], DAY),
        ];

        let stats = verdict_stats(&submissions);

        assert_eq!(
            stats,
            SubmissionStats {
                total: 8,
                accepted: 2,
                wrong_answer: 1,
                time_limit_exceeded: 1,
                runtime_error: 1,
                compilation_error: 1,
                other: 2,
            }
        );
    }

    #[test]
    fn heatmap_counts_accepted_per_utc_day_without_dedup() {
        let submissions = vec![
            submission(1, Some("OK"), Some(1), "A", "A", None, &[], DAY),
            submission(2, Some("OK"), Some(1), "A", "A", None, &[], DAY + 60),
            submission(3, Some("OK"), Some(1), "B", "B", None, &[], DAY + 86_400),
            submission(4, Some("WRONG_ANSWER"), Some(1), "C", "C", None, &[], DAY),
        ];

        let heatmap = activity_heatmap(&submissions);

        assert_eq!(
            heatmap,
            vec![
                HeatmapEntry {
                    date: String::from("2023-11-14"),
                    count: 2,
                },
                HeatmapEntry {
                    date: String::from("2023-11-15"),
                    count: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn profile_composes_counts_and_defaults() {
        let api = StubApi {
            info: user("kaburagi"),
            submissions: vec![
                submission(1, Some("OK"), Some(1), "A", "A", Some(800), &["math"], DAY),
                submission(2, Some("OK"), Some(1), "A", "A", Some(800), &["math"], DAY + 9),
                submission(3, Some("WRONG_ANSWER"), Some(1), "B", "B", None, &[], DAY),
            ],
            rating: Ok(vec![CfRatingChange {
                contest_id: 600,
                contest_name: String::from("Round #600"),
                rank: 42,
                rating_update_time_seconds: DAY,
                old_rating: 2000,
                new_rating: 2100,
            }]),
        };

        let profile = get_user_profile(&api, "kaburagi").await.unwrap();

        assert_eq!(profile.handle, "kaburagi");
        assert_eq!(profile.solved_count, 1);
        assert_eq!(profile.submission_stats.total, 3);
        assert_eq!(profile.rating_history.len(), 1);
        assert_eq!(profile.country, "Unknown");
        assert_eq!(profile.organization, "N/A");
        assert_eq!(profile.avatar, "https://example.com/photo.jpg");
    }

    #[tokio::test]
    async fn missing_rating_history_degrades_to_empty() {
        let api = StubApi {
            info: user("fresh_account"),
            submissions: Vec::new(),
            rating: Err(()),
        };

        let profile = get_user_profile(&api, "fresh_account").await.unwrap();

        assert!(profile.rating_history.is_empty());
        assert_eq!(profile.solved_count, 0);
    }

    #[tokio::test]
    async fn solved_sample_is_capped_but_count_is_not() {
        let submissions: Vec<CfSubmission> = (0..150)
            .map(|i| {
                submission(
                    i,
                    Some("OK"),
                    Some(i),
                    "A",
                    "Task",
                    Some(800),
                    &[],
                    DAY + i,
                )
            })
            .collect();
        let api = StubApi {
            info: user("marathoner"),
            submissions,
            rating: Ok(Vec::new()),
        };

        let profile = get_user_profile(&api, "marathoner")
            .await
            .unwrap()
            .truncate_solved_sample();

        assert_eq!(profile.solved_count, 150);
        assert_eq!(profile.solved_problems.len(), SOLVED_SAMPLE_LIMIT);
    }
}
