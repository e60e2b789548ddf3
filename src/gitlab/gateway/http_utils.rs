//! Shared HTTP utilities for gateway implementations.

/// Header carrying the personal access token.
pub(super) const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Extracts GitLab's error text from a JSON body.
///
/// GitLab answers with `{"message": "..."}` for most failures, sometimes
/// with a nested object in `message` (validation errors) and with
/// `{"error": "...", "error_description": "..."}` for OAuth failures.
pub(super) fn extract_gitlab_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };

    if let Some(message) = value.get("message") {
        return Some(
            message
                .as_str()
                .map_or_else(|| message.to_string(), ToOwned::to_owned),
        );
    }

    let error = value.get("error").and_then(serde_json::Value::as_str)?;
    let description = value
        .get("error_description")
        .and_then(serde_json::Value::as_str);
    Some(description.map_or_else(
        || error.to_owned(),
        |detail| format!("{error}: {detail}"),
    ))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::extract_gitlab_message;

    #[rstest]
    #[case::message(r#"{"message":"401 Unauthorized"}"#, Some("401 Unauthorized"))]
    #[case::nested(r#"{"message":{"state":["is invalid"]}}"#, Some(r#"{"state":["is invalid"]}"#))]
    #[case::oauth(
        r#"{"error":"invalid_token","error_description":"Token was revoked."}"#,
        Some("invalid_token: Token was revoked.")
    )]
    #[case::plain_text("<html>bad gateway</html>", None)]
    fn extracts_messages(#[case] body: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_gitlab_message(body).as_deref(), expected);
    }
}
