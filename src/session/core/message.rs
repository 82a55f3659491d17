//! Message model for session logs.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::session::core::errors::{SessionError, SessionResult};

/// Role of a session message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Human contribution.
    User,
    /// Assistant contribution.
    Assistant,
}

impl Role {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(value.to_string()),
        }
    }
}

/// Raw submission as received from a client, before validation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Requested role, checked against [`Role`].
    #[serde(default)]
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub content: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional caller-supplied user id.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Submission {
    /// Validate the submission into an entry ready to append.
    ///
    /// # Errors
    /// Returns [`SessionError::Validation`] for an unknown role or empty content.
    pub fn validate(self) -> SessionResult<MessageEntry> {
        let role = Role::from_str(&self.role)
            .map_err(|role| SessionError::Validation(format!("unknown role `{role}`")))?;
        if self.content.is_empty() {
            return Err(SessionError::Validation(
                "content must not be empty".to_string(),
            ));
        }

        Ok(MessageEntry {
            role,
            content: self.content,
            name: self.name,
            user_id: self.user_id,
        })
    }
}

/// A validated entry waiting for its server timestamp.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageEntry {
    /// Role of the author.
    pub role: Role,
    /// Non-empty message text.
    pub content: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional caller-supplied user id.
    pub user_id: Option<String>,
}

impl MessageEntry {
    /// Build a user entry.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
            user_id: None,
        }
    }

    /// Build an assistant entry.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
            user_id: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stamp the entry with the current time, producing an immutable message.
    #[must_use]
    pub fn stamp(self) -> Message {
        Message {
            role: self.role,
            content: self.content,
            name: self.name,
            user_id: self.user_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// A message as persisted in a session log.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Role of the author.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional caller-supplied user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// ISO-8601 timestamp assigned at append time.
    pub timestamp: String,
}
