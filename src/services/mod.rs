pub mod github;
pub mod pagination;
pub mod popular_repos;
pub mod repo_summary;
pub mod user_profile;
