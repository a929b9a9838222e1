//! Typed views of upstream GitHub documents.
//!
//! Each record has one `from_value` mapping that owns its "absent or null
//! means default" policy, so nothing else reads raw JSON fields.

use serde_json::Value;

/// Open/closed state as GitHub reports it. Anything else is `Other` and is
/// counted under neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Open,
    Closed,
    Other,
}

impl ItemState {
    fn parse(value: &Value) -> Self {
        match value.as_str() {
            Some("open") => Self::Open,
            Some("closed") => Self::Closed,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub comments_count: u64,
    pub state: ItemState,
    pub created_at: Option<String>,
    pub closed_at: Option<String>,
}

impl IssueRecord {
    /// Returns `None` for pull requests, which the issues listing mixes in.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("pull_request").is_some() {
            return None;
        }

        Some(Self {
            number: u64_field(value, "number"),
            title: string_field(value, "title"),
            comments_count: u64_field(value, "comments"),
            state: ItemState::parse(&value["state"]),
            created_at: opt_string_field(value, "created_at"),
            closed_at: opt_string_field(value, "closed_at"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestRecord {
    pub number: u64,
    pub state: ItemState,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    pub requested_reviewers: Vec<String>,
}

impl PullRequestRecord {
    pub fn from_value(value: &Value) -> Self {
        let requested_reviewers = value["requested_reviewers"]
            .as_array()
            .map(|reviewers| {
                reviewers
                    .iter()
                    .map(|r| string_field(r, "login"))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            number: u64_field(value, "number"),
            state: ItemState::parse(&value["state"]),
            created_at: opt_string_field(value, "created_at"),
            merged_at: opt_string_field(value, "merged_at"),
            requested_reviewers,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoRecord {
    pub name: String,
    pub description: Option<String>,
    pub stars_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub default_branch: String,
    pub size: u64,
}

impl RepoRecord {
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: string_field(value, "name"),
            description: opt_string_field(value, "description"),
            stars_count: u64_field(value, "stargazers_count"),
            forks_count: u64_field(value, "forks_count"),
            language: opt_string_field(value, "language").filter(|l| !l.is_empty()),
            default_branch: string_field(value, "default_branch"),
            size: u64_field(value, "size"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub login: String,
    pub profile_url: String,
    pub avatar_url: String,
    pub public_repos: u64,
}

impl UserRecord {
    pub fn from_value(value: &Value) -> Self {
        Self {
            login: string_field(value, "login"),
            profile_url: string_field(value, "html_url"),
            avatar_url: string_field(value, "avatar_url"),
            public_repos: u64_field(value, "public_repos"),
        }
    }
}

/// Committer date of a commit document (`commit.committer.date`).
pub fn committer_date(commit: &Value) -> Option<String> {
    opt_string_field(&commit["commit"]["committer"], "date")
}

fn opt_string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_field(value: &Value, key: &str) -> String {
    opt_string_field(value, key).unwrap_or_default()
}

fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}
