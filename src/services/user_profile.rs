use crate::error::ApiError;
use crate::models::github::{RepoRecord, UserRecord};
use crate::models::summary::{LanguageDistribution, UserProfileResponse};
use crate::services::github::GitHubClient;
use crate::utils::stats::{round_to, FrequencyCounter};
use chrono::Utc;
use log::info;

/// Bucket for repositories GitHub reports no language for.
pub const OTHER_LANGUAGE: &str = "Other";

pub struct UserProfileSummarizer;

impl UserProfileSummarizer {
    pub fn new() -> Self {
        Self
    }

    pub async fn summarize(
        &self,
        client: &GitHubClient,
        username: &str,
        auth: Option<&str>,
    ) -> Result<UserProfileResponse, ApiError> {
        let (profile, language_distribution) = tokio::try_join!(
            client.get_user(username, auth),
            self.fetch_language_distribution(client, username, auth),
        )?;
        let profile = UserRecord::from_value(&profile);

        Ok(UserProfileResponse {
            username: profile.login,
            profile_url: profile.profile_url,
            avatar_url: profile.avatar_url,
            public_repos: profile.public_repos,
            language_distribution,
            last_updated_utc: Utc::now(),
        })
    }

    async fn fetch_language_distribution(
        &self,
        client: &GitHubClient,
        username: &str,
        auth: Option<&str>,
    ) -> Result<Vec<LanguageDistribution>, ApiError> {
        let request = client.pages(format!("/users/{}/repos", username), auth);

        let mut languages = FrequencyCounter::new();
        for raw in client.drain(&request).await? {
            let repo = RepoRecord::from_value(&raw);
            languages.increment(repo.language.as_deref().unwrap_or(OTHER_LANGUAGE));
        }

        info!("Counted {} repos for {}", languages.total(), username);
        Ok(language_distribution(languages))
    }
}

/// Share of repositories per language, highest first. The denominator is the
/// number of repositories counted, not the profile's `public_repos`.
fn language_distribution(languages: FrequencyCounter) -> Vec<LanguageDistribution> {
    if languages.is_empty() {
        return Vec::new();
    }

    let total = languages.total() as f64;
    let mut distribution: Vec<LanguageDistribution> = languages
        .into_entries()
        .into_iter()
        .map(|(language, count)| LanguageDistribution {
            language,
            percentage: round_to(count as f64 * 100.0 / total, 1),
        })
        .collect();

    distribution.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    distribution
}
