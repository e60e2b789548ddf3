//! Builders for merge request fixtures shared by unit and integration tests.
//!
//! # Examples
//!
//! ```ignore
//! use mergescope::gitlab::models::test_support::{merge_request, note};
//!
//! let summary = merge_request(7, "alice");
//! assert_eq!(summary.iid, 7);
//! assert!(!note(1, "carol").system);
//! ```

use chrono::{DateTime, TimeZone, Utc};

use super::{
    AwardEmoji, Identity, MergeRequestCommit, MergeRequestNote, MergeRequestState,
    MergeRequestSummary, Participant,
};

/// Fixed timestamp used for fixtures that do not care about age.
#[must_use]
pub fn fixture_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Constructs an opened merge request authored by `author`.
///
/// The internal id is derived from `iid` so distinct fixtures never collide.
#[must_use]
pub fn merge_request(iid: u64, author: &str) -> MergeRequestSummary {
    merge_request_created_at(iid, author, fixture_epoch())
}

/// Constructs an opened merge request with an explicit creation time.
#[must_use]
pub fn merge_request_created_at(
    iid: u64,
    author: &str,
    created_at: DateTime<Utc>,
) -> MergeRequestSummary {
    MergeRequestSummary {
        id: 1000 + iid,
        iid,
        title: format!("Merge request {iid}"),
        state: MergeRequestState::Opened,
        created_at,
        web_url: format!("https://gitlab.com/group/app/-/merge_requests/{iid}"),
        author: Identity::new(author),
        participants: None,
    }
}

/// Constructs a commit whose git author name is the username `author`.
#[must_use]
pub fn commit(sha: &str, author: &str) -> MergeRequestCommit {
    commit_by(sha, author, &format!("{author}@example.com"))
}

/// Constructs a commit with an explicit git author name and email.
#[must_use]
pub fn commit_by(sha: &str, author_name: &str, author_email: &str) -> MergeRequestCommit {
    MergeRequestCommit {
        sha: sha.to_owned(),
        author_name: author_name.to_owned(),
        author_email: Some(author_email.to_owned()),
    }
}

/// Constructs a participant with a username and display name.
#[must_use]
pub fn participant(username: &str, name: &str) -> Participant {
    Participant {
        username: Identity::new(username),
        name: name.to_owned(),
    }
}

/// Constructs a human-authored note.
#[must_use]
pub fn note(id: u64, author: &str) -> MergeRequestNote {
    MergeRequestNote {
        id,
        author: Identity::new(author),
        system: false,
    }
}

/// Constructs a system-generated note.
#[must_use]
pub fn system_note(id: u64, author: &str) -> MergeRequestNote {
    MergeRequestNote {
        system: true,
        ..note(id, author)
    }
}

/// Constructs a `thumbsup` award given by `user`.
#[must_use]
pub fn award(id: u64, user: &str) -> AwardEmoji {
    AwardEmoji {
        id,
        name: "thumbsup".to_owned(),
        user: Identity::new(user),
    }
}
