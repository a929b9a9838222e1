pub mod github;
pub mod summary;
