use crate::error::ApiError;
use crate::models::github::RepoRecord;
use crate::models::summary::{PopularRepo, PopularRepoResponse};
use crate::services::github::GitHubClient;
use crate::utils::stats::top_n_by;
use chrono::Utc;
use log::info;

pub const DEFAULT_LIMIT: i64 = 3;

/// Ranks an organization's public repositories by stars.
pub struct PopularReposRanker;

impl PopularReposRanker {
    pub fn new() -> Self {
        Self
    }

    /// A `limit` of zero or less yields an empty ranking; the total still
    /// counts every public repository.
    pub async fn rank(
        &self,
        client: &GitHubClient,
        owner: &str,
        limit: i64,
        auth: Option<&str>,
    ) -> Result<PopularRepoResponse, ApiError> {
        let request = client
            .pages(format!("/orgs/{}/repos", owner), auth)
            .param("type", "public");

        let repos: Vec<RepoRecord> = client
            .drain(&request)
            .await?
            .iter()
            .map(RepoRecord::from_value)
            .collect();

        let total_public_repos = repos.len();
        let take = usize::try_from(limit).unwrap_or(0);

        let popular_repos = top_n_by(repos, take, |r| r.stars_count)
            .into_iter()
            .map(|repo| PopularRepo {
                name: repo.name,
                description: repo.description,
                stars: repo.stars_count,
                forks: repo.forks_count,
                main_language: repo.language,
            })
            .collect::<Vec<_>>();

        info!(
            "Ranked {} of {} public repos for {}",
            popular_repos.len(), total_public_repos, owner
        );

        Ok(PopularRepoResponse {
            target_owner: owner.to_string(),
            total_public_repos,
            popular_repos,
            last_updated_utc: Utc::now(),
        })
    }
}
