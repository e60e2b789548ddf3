//! Data models for merge requests and their sub-resources.
//!
//! Types prefixed with `Api` are internal deserialisation targets matching
//! GitLab's REST payloads; they convert into the public domain types used by
//! the crawler and aggregator.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::IntakeError;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Contributor username, the aggregation key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    /// Borrow the username.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Merge request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRequestState {
    /// Still open for review.
    Opened,
    /// Closed without merging.
    Closed,
    /// Merged into the target branch.
    Merged,
    /// Transitional state GitLab reports while a merge is in flight.
    Locked,
}

impl MergeRequestState {
    /// Returns the API parameter value for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Merged => "merged",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for MergeRequestState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for MergeRequestState {
    type Err = IntakeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "opened" | "open" => Ok(Self::Opened),
            "closed" => Ok(Self::Closed),
            "merged" => Ok(Self::Merged),
            "locked" => Ok(Self::Locked),
            other => Err(IntakeError::InvalidState(other.to_owned())),
        }
    }
}

/// Merge request summary produced by the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequestSummary {
    /// Instance-wide identifier.
    pub id: u64,
    /// Project-local sequence number.
    pub iid: u64,
    /// Title of the merge request.
    pub title: String,
    /// Lifecycle state.
    pub state: MergeRequestState,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Browser URL.
    pub web_url: String,
    /// Author username.
    pub author: Identity,
    /// Participants in first-seen order, populated only on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Identity>>,
}

impl MergeRequestSummary {
    /// Returns a copy with the given participants attached.
    ///
    /// Duplicate usernames are dropped, keeping the first occurrence.
    #[must_use]
    pub fn with_participants(&self, participants: Vec<Identity>) -> Self {
        let mut unique: Vec<Identity> = Vec::with_capacity(participants.len());
        for participant in participants {
            if !unique.contains(&participant) {
                unique.push(participant);
            }
        }
        Self {
            participants: Some(unique),
            ..self.clone()
        }
    }
}

/// User taking part in a merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// GitLab username.
    pub username: Identity,
    /// Display name shown on the profile.
    pub name: String,
}

/// Commit listed on a merge request.
///
/// Git records a free-form author name and email rather than a GitLab
/// account; [`MergeRequestCommit::author_identity`] maps them back to a
/// username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestCommit {
    /// Commit SHA.
    pub sha: String,
    /// Author name from the commit, e.g. `Alice Liddell`.
    pub author_name: String,
    /// Author email from the commit, if GitLab returned one.
    pub author_email: Option<String>,
}

impl MergeRequestCommit {
    /// Username of the participant who authored this commit.
    ///
    /// A participant matches when their display name equals the author name
    /// (ignoring case), when their username equals the author name, or when
    /// their username equals the local part of the author email. Without a
    /// match the raw author name is used.
    #[must_use]
    pub fn author_identity(&self, participants: &[Participant]) -> Identity {
        let name = self.author_name.trim();
        let email_user = self
            .author_email
            .as_deref()
            .and_then(|email| email.split_once('@'))
            .map(|(local, _)| local);

        participants
            .iter()
            .find(|participant| {
                !name.is_empty() && participant.name.trim().to_lowercase() == name.to_lowercase()
            })
            .or_else(|| {
                participants
                    .iter()
                    .find(|participant| participant.username.as_str() == name)
            })
            .or_else(|| {
                email_user.and_then(|local| {
                    participants
                        .iter()
                        .find(|participant| participant.username.as_str() == local)
                })
            })
            .map_or_else(
                || Identity::new(name),
                |participant| participant.username.clone(),
            )
    }
}

/// Note (comment) on a merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestNote {
    /// Note identifier.
    pub id: u64,
    /// Author username.
    pub author: Identity,
    /// True for notes GitLab generates itself, e.g. state changes.
    pub system: bool,
}

/// Emoji reaction awarded on a merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardEmoji {
    /// Award identifier.
    pub id: u64,
    /// Emoji name, e.g. `thumbsup`.
    pub name: String,
    /// Username of the reacting user.
    pub user: Identity,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiMergeRequest {
    pub(crate) id: u64,
    pub(crate) iid: u64,
    pub(crate) title: String,
    pub(crate) state: MergeRequestState,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) web_url: String,
    pub(crate) author: ApiUser,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommit {
    pub(crate) id: String,
    pub(crate) author_name: String,
    #[serde(default)]
    pub(crate) author_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiNote {
    pub(crate) id: u64,
    pub(crate) author: ApiUser,
    #[serde(default)]
    pub(crate) system: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiAwardEmoji {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) user: ApiUser,
}

impl From<ApiUser> for Identity {
    fn from(value: ApiUser) -> Self {
        Self(value.username)
    }
}

impl From<ApiUser> for Participant {
    fn from(value: ApiUser) -> Self {
        Self {
            username: Identity(value.username),
            name: value.name,
        }
    }
}

impl From<ApiMergeRequest> for MergeRequestSummary {
    fn from(value: ApiMergeRequest) -> Self {
        Self {
            id: value.id,
            iid: value.iid,
            title: value.title,
            state: value.state,
            created_at: value.created_at,
            web_url: value.web_url,
            author: value.author.into(),
            participants: None,
        }
    }
}

impl From<ApiCommit> for MergeRequestCommit {
    fn from(value: ApiCommit) -> Self {
        Self {
            sha: value.id,
            author_name: value.author_name,
            author_email: value.author_email.filter(|email| !email.trim().is_empty()),
        }
    }
}

impl From<ApiNote> for MergeRequestNote {
    fn from(value: ApiNote) -> Self {
        Self {
            id: value.id,
            author: value.author.into(),
            system: value.system,
        }
    }
}

impl From<ApiAwardEmoji> for AwardEmoji {
    fn from(value: ApiAwardEmoji) -> Self {
        Self {
            id: value.id,
            name: value.name,
            user: value.user.into(),
        }
    }
}
