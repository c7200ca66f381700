//! Principal identifier formatting.
//!
//! The gateway requires principal ids to be alphanumeric. Each decision gets
//! its own id: the client id (truncated) followed by a fresh UUID, with every
//! other character stripped. Two connections from the same client therefore
//! never share a principal id.

use uuid::Uuid;

/// Characters of the client id kept before the random suffix is appended.
pub const MAX_CLIENT_ID_CHARS: usize = 120;

/// Build a fresh principal id for `client_id`.
pub fn format_principal(client_id: &str) -> String {
    let truncated: String = client_id.chars().take(MAX_CLIENT_ID_CHARS).collect();
    format!("{}:{}", truncated, Uuid::new_v4())
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
