use crate::error::ApiError;
use crate::models::github::{committer_date, IssueRecord, ItemState, PullRequestRecord, RepoRecord};
use crate::models::summary::{
    IssueStats, PullRequestStats, RepoInfo, RepoSummaryResponse, TopActiveReviewer, TopCommentedIssue,
};
use crate::services::github::GitHubClient;
use crate::utils::stats::{elapsed_hours, mean, round_to, top_n_by, FrequencyCounter};
use chrono::Utc;
use log::{info, warn};

const TOP_COMMENTED_ISSUES: usize = 5;
const TOP_ACTIVE_REVIEWERS: usize = 5;

/// Builds the activity summary of a single repository.
pub struct RepoSummarizer;

impl RepoSummarizer {
    pub fn new() -> Self {
        Self
    }

    pub async fn summarize(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        auth: Option<&str>,
    ) -> Result<RepoSummaryResponse, ApiError> {
        let (repo_info, issue_stats, pull_request_stats) = tokio::try_join!(
            self.fetch_repo_info(client, owner, repo, auth),
            self.fetch_issue_stats(client, owner, repo, auth),
            self.fetch_pull_request_stats(client, owner, repo, auth),
        )?;

        Ok(RepoSummaryResponse {
            owner: owner.to_string(),
            repo: repo.to_string(),
            repo_info,
            issue_stats,
            pull_request_stats,
            last_updated_utc: Utc::now(),
        })
    }

    async fn fetch_repo_info(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        auth: Option<&str>,
    ) -> Result<RepoInfo, ApiError> {
        let metadata = RepoRecord::from_value(&client.get_repository(owner, repo, auth).await?);
        let branch = metadata.default_branch.as_str();

        let branches = client.pages(format!("/repos/{}/{}/branches", owner, repo), auth);
        let commits = client
            .pages(format!("/repos/{}/{}/commits", owner, repo), auth)
            .param("sha", branch);

        let (total_branches, total_commits, head) = tokio::try_join!(
            client.count(&branches),
            client.count(&commits),
            client.get_commit(owner, repo, branch, auth),
        )?;

        info!(
            "{}/{}: {} branches, {} commits on {}",
            owner, repo, total_branches, total_commits, branch
        );

        Ok(RepoInfo {
            latest_commit_date_utc: committer_date(&head),
            name: metadata.name,
            description: metadata.description,
            forks: metadata.forks_count,
            default_branch: metadata.default_branch,
            total_branches,
            total_commits,
            size: metadata.size,
        })
    }

    async fn fetch_issue_stats(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        auth: Option<&str>,
    ) -> Result<IssueStats, ApiError> {
        let request = client
            .pages(format!("/repos/{}/{}/issues", owner, repo), auth)
            .param("state", "all");

        let mut acc = IssueAccumulator::default();
        for raw in client.drain(&request).await? {
            if let Some(issue) = IssueRecord::from_value(&raw) {
                acc.add(issue);
            }
        }

        let stats = acc.finish();
        info!(
            "Issue stats for {}/{} - Total: {}, Open: {}, Closed: {}, Avg close time: {}h",
            owner, repo, stats.total_issues, stats.open_issues, stats.closed_issues,
            stats.avg_time_to_close_issue_hours
        );
        Ok(stats)
    }

    async fn fetch_pull_request_stats(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        auth: Option<&str>,
    ) -> Result<PullRequestStats, ApiError> {
        let request = client
            .pages(format!("/repos/{}/{}/pulls", owner, repo), auth)
            .param("state", "all");

        let mut acc = PullRequestAccumulator::default();
        for raw in client.drain(&request).await? {
            acc.add(PullRequestRecord::from_value(&raw));
        }

        let stats = acc.finish();
        info!(
            "PR stats for {}/{} - Total: {}, Open: {}, Closed: {}, Merged: {}, Avg merge time: {}h",
            owner, repo, stats.total_prs, stats.open_prs, stats.closed_prs, stats.merged_prs,
            stats.avg_time_to_merge_pr_hours
        );
        Ok(stats)
    }
}

#[derive(Debug, Default)]
struct IssueAccumulator {
    open: usize,
    closed: usize,
    close_hours: Vec<i64>,
    issues: Vec<TopCommentedIssue>,
}

impl IssueAccumulator {
    fn add(&mut self, issue: IssueRecord) {
        match issue.state {
            ItemState::Open => self.open += 1,
            ItemState::Closed => self.closed += 1,
            ItemState::Other => {}
        }

        if let (Some(created), Some(closed)) = (&issue.created_at, &issue.closed_at) {
            match elapsed_hours(created, closed) {
                Ok(hours) => self.close_hours.push(hours),
                Err(e) => warn!("Error parsing dates for issue #{}: {}", issue.number, e),
            }
        }

        self.issues.push(TopCommentedIssue {
            issue_number: issue.number,
            title: issue.title,
            comments_count: issue.comments_count,
        });
    }

    fn finish(self) -> IssueStats {
        let avg = mean(&self.close_hours).map(|m| round_to(m, 2)).unwrap_or(0.0);

        IssueStats {
            total_issues: self.open + self.closed,
            open_issues: self.open,
            closed_issues: self.closed,
            avg_time_to_close_issue_hours: avg,
            top_commented_issues: top_n_by(self.issues, TOP_COMMENTED_ISSUES, |i| i.comments_count),
        }
    }
}

#[derive(Debug, Default)]
struct PullRequestAccumulator {
    open: usize,
    closed: usize,
    merged: usize,
    merge_hours: Vec<i64>,
    reviewers: FrequencyCounter,
}

impl PullRequestAccumulator {
    fn add(&mut self, pr: PullRequestRecord) {
        match pr.state {
            ItemState::Open => self.open += 1,
            ItemState::Closed => self.closed += 1,
            ItemState::Other => {}
        }

        if pr.is_merged() {
            self.merged += 1;
            match (pr.created_at.as_deref(), pr.merged_at.as_deref()) {
                (Some(created), Some(merged)) => match elapsed_hours(created, merged) {
                    Ok(hours) => self.merge_hours.push(hours),
                    Err(e) => warn!("Failed to parse merge dates for PR #{}: {}", pr.number, e),
                },
                _ => warn!("PR #{} is merged but has no created_at", pr.number),
            }
        }

        for login in &pr.requested_reviewers {
            self.reviewers.increment(login);
        }
    }

    fn finish(self) -> PullRequestStats {
        let avg = mean(&self.merge_hours).map(|m| round_to(m, 1)).unwrap_or(0.0);

        let top_active_reviewers = self
            .reviewers
            .top(TOP_ACTIVE_REVIEWERS)
            .into_iter()
            .map(|(username, reviewed_prs_count)| TopActiveReviewer { username, reviewed_prs_count })
            .collect();

        PullRequestStats {
            total_prs: self.open + self.closed,
            open_prs: self.open,
            closed_prs: self.closed,
            merged_prs: self.merged,
            avg_time_to_merge_pr_hours: avg,
            top_active_reviewers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Mock, ServerGuard};
    use serde_json::json;

    fn issue(number: u64, state: &str, comments: u64) -> IssueRecord {
        IssueRecord::from_value(&json!({
            "number": number,
            "title": format!("Issue {}", number),
            "comments": comments,
            "state": state
        }))
        .unwrap()
    }

    #[test]
    fn test_issue_totals_and_top_commented() {
        let mut acc = IssueAccumulator::default();
        let comments = [4, 9, 1, 9, 0, 7, 3];
        for (i, c) in comments.iter().enumerate() {
            let state = if i % 2 == 0 { "open" } else { "closed" };
            acc.add(issue(i as u64 + 1, state, *c));
        }
        acc.add(issue(99, "weird", 100));

        let stats = acc.finish();
        assert_eq!(stats.open_issues, 4);
        assert_eq!(stats.closed_issues, 3);
        assert_eq!(stats.total_issues, stats.open_issues + stats.closed_issues);
        assert_eq!(stats.avg_time_to_close_issue_hours, 0.0);

        let top: Vec<(u64, u64)> = stats
            .top_commented_issues
            .iter()
            .map(|i| (i.issue_number, i.comments_count))
            .collect();
        assert_eq!(top, vec![(99, 100), (2, 9), (4, 9), (6, 7), (1, 4)]);
    }

    #[test]
    fn test_issue_close_durations() {
        let mut acc = IssueAccumulator::default();

        let mut closed = issue(1, "closed", 0);
        closed.created_at = Some("2024-01-01T00:00:00Z".to_string());
        closed.closed_at = Some("2024-01-01T10:30:00Z".to_string());
        acc.add(closed);

        let mut closed = issue(2, "closed", 0);
        closed.created_at = Some("2024-01-01T00:00:00Z".to_string());
        closed.closed_at = Some("2024-01-01T03:00:00Z".to_string());
        acc.add(closed);

        let mut open = issue(3, "open", 0);
        open.created_at = Some("2024-01-01T00:00:00Z".to_string());
        acc.add(open);

        let mut malformed = issue(4, "closed", 0);
        malformed.created_at = Some("not a date".to_string());
        malformed.closed_at = Some("2024-01-01T03:00:00Z".to_string());
        acc.add(malformed);

        let stats = acc.finish();
        assert_eq!(stats.open_issues, 1);
        assert_eq!(stats.closed_issues, 3);
        // (10 + 3) / 2
        assert_eq!(stats.avg_time_to_close_issue_hours, 6.5);
    }

    #[test]
    fn test_average_rounds_to_two_places() {
        let mut acc = IssueAccumulator::default();
        for hours in ["01", "01", "02"] {
            let mut i = issue(1, "closed", 0);
            i.created_at = Some("2024-01-01T00:00:00Z".to_string());
            i.closed_at = Some(format!("2024-01-01T{}:00:00Z", hours));
            acc.add(i);
        }
        assert_eq!(acc.finish().avg_time_to_close_issue_hours, 1.33);
    }

    #[test]
    fn test_pull_request_stats() {
        let mut acc = PullRequestAccumulator::default();
        let prs = [
            json!({ "number": 1, "state": "closed", "created_at": "2024-01-01T00:00:00Z",
                    "merged_at": "2024-01-01T05:00:00Z",
                    "requested_reviewers": [{ "login": "carol" }, { "login": "alice" }] }),
            json!({ "number": 2, "state": "closed", "created_at": "2024-01-01T00:00:00Z",
                    "merged_at": null, "requested_reviewers": [{ "login": "alice" }] }),
            json!({ "number": 3, "state": "open", "created_at": "2024-01-01T00:00:00Z",
                    "merged_at": "2024-01-01T02:00:00Z",
                    "requested_reviewers": [{ "login": "bob" }, { "login": "carol" }] }),
            json!({ "number": 4, "state": "closed", "created_at": "garbage",
                    "merged_at": "2024-01-01T02:00:00Z", "requested_reviewers": [] }),
        ];
        for pr in &prs {
            acc.add(PullRequestRecord::from_value(pr));
        }

        let stats = acc.finish();
        assert_eq!(stats.open_prs, 1);
        assert_eq!(stats.closed_prs, 3);
        assert_eq!(stats.total_prs, 4);
        // merged is driven by merged_at alone, not by state
        assert_eq!(stats.merged_prs, 3);
        // (5 + 2) / 2, the unparseable PR contributes no sample
        assert_eq!(stats.avg_time_to_merge_pr_hours, 3.5);

        let reviewers: Vec<(&str, usize)> = stats
            .top_active_reviewers
            .iter()
            .map(|r| (r.username.as_str(), r.reviewed_prs_count))
            .collect();
        assert_eq!(reviewers, vec![("carol", 2), ("alice", 2), ("bob", 1)]);
    }

    #[test]
    fn test_empty_pull_requests() {
        let stats = PullRequestAccumulator::default().finish();
        assert_eq!(stats.total_prs, 0);
        assert_eq!(stats.avg_time_to_merge_pr_hours, 0.0);
        assert!(stats.top_active_reviewers.is_empty());
    }

    async fn mock_json(server: &mut ServerGuard, path: &str, body: serde_json::Value) -> Mock {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_summarize_repository() {
        let mut server = mockito::Server::new_async().await;

        let _m1 = mock_json(&mut server, "/repos/acme/widgets", json!({
            "name": "widgets", "description": "Widget factory", "forks_count": 4,
            "default_branch": "main", "size": 321
        })).await;
        let _m2 = mock_json(&mut server, "/repos/acme/widgets/branches", json!([{ "name": "main" }, { "name": "dev" }])).await;
        let _m3 = server
            .mock("GET", "/repos/acme/widgets/commits")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sha".into(), "main".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_body(json!([{ "sha": "a" }, { "sha": "b" }, { "sha": "c" }]).to_string())
            .expect(1)
            .create_async()
            .await;
        let _m4 = mock_json(&mut server, "/repos/acme/widgets/commits/main", json!({
            "commit": { "committer": { "date": "2024-06-01T12:00:00Z" } }
        })).await;
        let _m5 = server
            .mock("GET", "/repos/acme/widgets/issues")
            .match_query(Matcher::UrlEncoded("state".into(), "all".into()))
            .with_body(json!([
                { "number": 1, "title": "Bug", "comments": 2, "state": "open",
                  "created_at": "2024-01-01T00:00:00Z", "closed_at": null },
                { "number": 2, "title": "PR", "comments": 50, "state": "open",
                  "pull_request": {} },
                { "number": 3, "title": "Fixed", "comments": 5, "state": "closed",
                  "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-02T00:00:00Z" }
            ]).to_string())
            .create_async()
            .await;
        let _m6 = mock_json(&mut server, "/repos/acme/widgets/pulls", json!([
            { "number": 2, "state": "closed", "created_at": "2024-01-01T00:00:00Z",
              "merged_at": "2024-01-01T12:00:00Z", "requested_reviewers": [{ "login": "dana" }] }
        ])).await;

        let client = GitHubClient::new(&server.url(), None, 100).unwrap();
        let summary = RepoSummarizer::new()
            .summarize(&client, "acme", "widgets", None)
            .await
            .unwrap();

        assert_eq!(summary.repo_info.name, "widgets");
        assert_eq!(summary.repo_info.description.as_deref(), Some("Widget factory"));
        assert_eq!(summary.repo_info.forks, 4);
        assert_eq!(summary.repo_info.total_branches, 2);
        assert_eq!(summary.repo_info.total_commits, 3);
        assert_eq!(summary.repo_info.latest_commit_date_utc.as_deref(), Some("2024-06-01T12:00:00Z"));
        assert_eq!(summary.repo_info.size, 321);

        assert_eq!(summary.issue_stats.total_issues, 2);
        assert_eq!(summary.issue_stats.open_issues, 1);
        assert_eq!(summary.issue_stats.closed_issues, 1);
        assert_eq!(summary.issue_stats.avg_time_to_close_issue_hours, 24.0);
        assert_eq!(summary.issue_stats.top_commented_issues[0].issue_number, 3);
        assert_eq!(summary.issue_stats.top_commented_issues.len(), 2);

        assert_eq!(summary.pull_request_stats.merged_prs, 1);
        assert_eq!(summary.pull_request_stats.avg_time_to_merge_pr_hours, 12.0);
        assert_eq!(summary.pull_request_stats.top_active_reviewers[0].username, "dana");

        let body = serde_json::to_value(&summary).unwrap();
        assert_eq!(body["repo_info"]["last_updated_utc"], "2024-06-01T12:00:00Z");
        assert_eq!(body["issue_stats"]["top_commented_issues"][0]["comments_count"], 5);
    }

    async fn mock_page(
        server: &mut ServerGuard,
        path: &str,
        filters: &[(&str, &str)],
        page: u32,
        body: serde_json::Value,
    ) -> Mock {
        let mut query: Vec<Matcher> = filters
            .iter()
            .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
            .collect();
        query.push(Matcher::UrlEncoded("per_page".into(), "2".into()));
        query.push(Matcher::UrlEncoded("page".into(), page.to_string()));

        server
            .mock("GET", path)
            .match_query(Matcher::AllOf(query))
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_summarize_across_page_boundaries() {
        let mut server = mockito::Server::new_async().await;
        let issues = "/repos/acme/widgets/issues";
        let pulls = "/repos/acme/widgets/pulls";
        let commits = "/repos/acme/widgets/commits";
        let branches = "/repos/acme/widgets/branches";

        let _m1 = mock_json(&mut server, "/repos/acme/widgets", json!({
            "name": "widgets", "default_branch": "main"
        })).await;
        let _m2 = mock_json(&mut server, "/repos/acme/widgets/commits/main", json!({
            "commit": { "committer": { "date": "2024-06-01T12:00:00Z" } }
        })).await;

        let mut pages = Vec::new();
        pages.push(mock_page(&mut server, branches, &[], 1, json!([{ "name": "main" }, { "name": "dev" }])).await);
        pages.push(mock_page(&mut server, branches, &[], 2, json!([{ "name": "release" }])).await);

        pages.push(mock_page(&mut server, commits, &[("sha", "main")], 1, json!([{ "sha": "a" }, { "sha": "b" }])).await);
        pages.push(mock_page(&mut server, commits, &[("sha", "main")], 2, json!([{ "sha": "c" }, { "sha": "d" }])).await);
        pages.push(mock_page(&mut server, commits, &[("sha", "main")], 3, json!([])).await);

        pages.push(mock_page(&mut server, issues, &[("state", "all")], 1, json!([
            { "number": 1, "title": "One", "comments": 3, "state": "open" },
            { "number": 10, "title": "A PR", "comments": 99, "state": "open", "pull_request": {} }
        ])).await);
        pages.push(mock_page(&mut server, issues, &[("state", "all")], 2, json!([
            { "number": 2, "title": "Two", "comments": 7, "state": "closed",
              "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-01T10:00:00Z" },
            { "number": 3, "title": "Three", "comments": 3, "state": "open" }
        ])).await);
        pages.push(mock_page(&mut server, issues, &[("state", "all")], 3, json!([
            { "number": 4, "title": "Four", "comments": 7, "state": "closed",
              "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-01T20:00:00Z" },
            { "number": 5, "title": "Five", "comments": 1, "state": "open" }
        ])).await);
        pages.push(mock_page(&mut server, issues, &[("state", "all")], 4, json!([
            { "number": 6, "title": "Six", "comments": 3, "state": "open" }
        ])).await);

        pages.push(mock_page(&mut server, pulls, &[("state", "all")], 1, json!([
            { "number": 1, "state": "closed", "created_at": "2024-01-01T00:00:00Z",
              "merged_at": "2024-01-01T04:00:00Z",
              "requested_reviewers": [{ "login": "alice" }, { "login": "bob" }] },
            { "number": 2, "state": "open", "requested_reviewers": [{ "login": "bob" }] }
        ])).await);
        pages.push(mock_page(&mut server, pulls, &[("state", "all")], 2, json!([
            { "number": 3, "state": "closed", "merged_at": null,
              "requested_reviewers": [{ "login": "carol" }] },
            { "number": 4, "state": "closed", "created_at": "2024-01-01T00:00:00Z",
              "merged_at": "2024-01-01T08:00:00Z", "requested_reviewers": [{ "login": "alice" }] }
        ])).await);
        pages.push(mock_page(&mut server, pulls, &[("state", "all")], 3, json!([])).await);

        let client = GitHubClient::new(&server.url(), None, 2).unwrap();
        let summary = RepoSummarizer::new()
            .summarize(&client, "acme", "widgets", None)
            .await
            .unwrap();

        assert_eq!(summary.repo_info.total_branches, 3);
        assert_eq!(summary.repo_info.total_commits, 4);

        let issue_stats = &summary.issue_stats;
        assert_eq!(issue_stats.total_issues, 6);
        assert_eq!(issue_stats.open_issues, 4);
        assert_eq!(issue_stats.closed_issues, 2);
        assert_eq!(issue_stats.avg_time_to_close_issue_hours, 15.0);
        let top: Vec<(u64, u64)> = issue_stats
            .top_commented_issues
            .iter()
            .map(|i| (i.issue_number, i.comments_count))
            .collect();
        assert_eq!(top, vec![(2, 7), (4, 7), (1, 3), (3, 3), (6, 3)]);

        let pr_stats = &summary.pull_request_stats;
        assert_eq!(pr_stats.total_prs, 4);
        assert_eq!(pr_stats.open_prs, 1);
        assert_eq!(pr_stats.closed_prs, 3);
        assert_eq!(pr_stats.merged_prs, 2);
        assert_eq!(pr_stats.avg_time_to_merge_pr_hours, 6.0);
        let reviewers: Vec<(&str, usize)> = pr_stats
            .top_active_reviewers
            .iter()
            .map(|r| (r.username.as_str(), r.reviewed_prs_count))
            .collect();
        assert_eq!(reviewers, vec![("alice", 2), ("bob", 2), ("carol", 1)]);

        for page in &pages {
            page.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_summarize_fails_whole_on_any_error() {
        let mut server = mockito::Server::new_async().await;
        let _m1 = server
            .mock("GET", "/repos/acme/gone")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;
        let _m2 = mock_json(&mut server, "/repos/acme/gone/issues", json!([])).await;
        let _m3 = mock_json(&mut server, "/repos/acme/gone/pulls", json!([])).await;

        let client = GitHubClient::new(&server.url(), None, 100).unwrap();
        let err = RepoSummarizer::new()
            .summarize(&client, "acme", "gone", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
