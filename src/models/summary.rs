use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RepoSummaryResponse {
    pub owner: String,
    pub repo: String,
    pub repo_info: RepoInfo,
    pub issue_stats: IssueStats,
    pub pull_request_stats: PullRequestStats,
    pub last_updated_utc: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RepoInfo {
    pub name: String,
    pub description: Option<String>,
    pub forks: u64,
    pub default_branch: String,
    pub total_branches: usize,
    pub total_commits: usize,
    /// Committer date of the default branch head.
    #[serde(rename = "last_updated_utc")]
    pub latest_commit_date_utc: Option<String>,
    pub size: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IssueStats {
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub avg_time_to_close_issue_hours: f64,
    pub top_commented_issues: Vec<TopCommentedIssue>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TopCommentedIssue {
    pub issue_number: u64,
    pub title: String,
    pub comments_count: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PullRequestStats {
    pub total_prs: usize,
    pub open_prs: usize,
    pub closed_prs: usize,
    pub merged_prs: usize,
    pub avg_time_to_merge_pr_hours: f64,
    pub top_active_reviewers: Vec<TopActiveReviewer>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TopActiveReviewer {
    pub username: String,
    pub reviewed_prs_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PopularRepoResponse {
    pub target_owner: String,
    pub total_public_repos: usize,
    pub popular_repos: Vec<PopularRepo>,
    pub last_updated_utc: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PopularRepo {
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub main_language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfileResponse {
    pub username: String,
    pub profile_url: String,
    pub avatar_url: String,
    pub public_repos: u64,
    pub language_distribution: Vec<LanguageDistribution>,
    pub last_updated_utc: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LanguageDistribution {
    pub language: String,
    pub percentage: f64,
}
