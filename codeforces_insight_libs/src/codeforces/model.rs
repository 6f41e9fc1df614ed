use serde::{Deserialize, Serialize};

/// Envelope every Codeforces API method returns.
///
/// `status` is either `"OK"` with `result` populated, or `"FAILED"` with a
/// human-readable `comment`. Failures usually arrive with an HTTP 400.
#[derive(Debug, Deserialize)]
pub struct CodeforcesResponse<T> {
    pub status: String,
    pub result: Option<T>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfUser {
    pub handle: String,
    pub rating: Option<i64>,
    pub max_rating: Option<i64>,
    pub rank: Option<String>,
    pub max_rank: Option<String>,
    pub country: Option<String>,
    pub organization: Option<String>,
    pub avatar: Option<String>,
    pub title_photo: Option<String>,
    pub contribution: Option<i64>,
    pub friend_of_count: Option<i64>,
    pub registration_time_seconds: Option<i64>,
}

/// Gym and problemset-only problems come without a contest id, and very old
/// submissions may lack a rating, so everything but tags is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfProblem {
    pub contest_id: Option<i64>,
    pub index: Option<String>,
    pub name: Option<String>,
    pub rating: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfSubmission {
    pub id: i64,
    // absent while the submission is still in the judging queue
    pub verdict: Option<String>,
    pub problem: CfProblem,
    pub creation_time_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRatingChange {
    pub contest_id: i64,
    pub contest_name: String,
    pub rank: i64,
    pub rating_update_time_seconds: i64,
    pub old_rating: i64,
    pub new_rating: i64,
}
