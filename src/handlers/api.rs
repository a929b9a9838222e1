use crate::error::ApiError;
use crate::services::github::GitHubClient;
use crate::services::popular_repos::{PopularReposRanker, DEFAULT_LIMIT};
use crate::services::repo_summary::RepoSummarizer;
use crate::services::user_profile::UserProfileSummarizer;
use crate::utils::validation::{validate_login, validate_repo_name};
use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use log::info;

pub struct AppState {
    pub github_client: Arc<GitHubClient>,
    pub repo_summarizer: Arc<RepoSummarizer>,
    pub popular_repos_ranker: Arc<PopularReposRanker>,
    pub user_profile_summarizer: Arc<UserProfileSummarizer>,
}

impl AppState {
    pub fn new(github_client: GitHubClient) -> Self {
        Self {
            github_client: Arc::new(github_client),
            repo_summarizer: Arc::new(RepoSummarizer::new()),
            popular_repos_ranker: Arc::new(PopularReposRanker::new()),
            user_profile_summarizer: Arc::new(UserProfileSummarizer::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PopularReposQuery {
    pub owner: Option<String>,
    pub limit: Option<i64>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::rejected(err.to_string()).into()),
    )
    .route("/health", web::get().to(health_check))
    .service(
        web::scope("/api")
            .route("/repos/{owner}/{repo}/summary", web::get().to(get_repo_summary))
            .route("/users/{username}/profile-summary", web::get().to(get_user_profile_summary))
            .route("/popular-repo", web::get().to(get_popular_repos)),
    );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "github-stats-aggregator"
    }))
}

/// Authorization value of the inbound request, forwarded upstream as-is.
fn forwarded_auth(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}

pub async fn get_repo_summary(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (owner, repo) = path.into_inner();
    validate_login("owner", &owner)?;
    validate_repo_name(&repo)?;

    let request_id = Uuid::new_v4();
    info!("[{}] Repo summary requested for {}/{}", request_id, owner, repo);

    let summary = data
        .repo_summarizer
        .summarize(&data.github_client, &owner, &repo, forwarded_auth(&req))
        .await?;

    info!("[{}] Repo summary for {}/{} complete", request_id, owner, repo);
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn get_user_profile_summary(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();
    validate_login("username", &username)?;

    let request_id = Uuid::new_v4();
    info!("[{}] Profile summary requested for {}", request_id, username);

    let profile = data
        .user_profile_summarizer
        .summarize(&data.github_client, &username, forwarded_auth(&req))
        .await?;

    info!(
        "[{}] Profile summary for {} complete ({} languages)",
        request_id, username, profile.language_distribution.len()
    );
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn get_popular_repos(
    req: HttpRequest,
    query: web::Query<PopularReposQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let owner = query
        .owner
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| ApiError::rejected("Query parameter 'owner' is required"))?;
    validate_login("owner", &owner)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let request_id = Uuid::new_v4();
    info!("[{}] Popular repos requested for {} (limit {})", request_id, owner, limit);

    let ranking = data
        .popular_repos_ranker
        .rank(&data.github_client, &owner, limit, forwarded_auth(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ranking))
}
