//! Storage key scheme for session data.
//!
//! Every session owns two keys: `session:log:{id}` holds the JSON-encoded
//! message array and `session:summary:{id}` holds the summary text. All
//! known sessions are recovered by a prefix scan over [`LOG_PREFIX`].

/// Prefix of every session log key.
pub const LOG_PREFIX: &str = "session:log:";

/// Prefix of every session summary key.
pub const SUMMARY_PREFIX: &str = "session:summary:";

/// Key holding the message log for `session_id`.
#[must_use]
pub fn log_key(session_id: &str) -> String {
    format!("{LOG_PREFIX}{session_id}")
}

/// Key holding the summary for `session_id`.
#[must_use]
pub fn summary_key(session_id: &str) -> String {
    format!("{SUMMARY_PREFIX}{session_id}")
}

/// Recover the session id from a log key, if it is one.
#[must_use]
pub fn session_id_from_log_key(key: &str) -> Option<&str> {
    key.strip_prefix(LOG_PREFIX)
}
