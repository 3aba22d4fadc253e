// Queue Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Member identifier (opaque platform user id)
pub type MemberId = String;

/// Admission rank (strictly increasing within one queue)
pub type Rank = i64;

/// Maximum accepted length for team, channel and member ids
pub const MAX_ID_LEN: usize = 64;

/// Identifies one independent queue: (team, channel)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueKey {
    pub team_id: String,
    pub channel_id: String,
}

impl QueueKey {
    pub fn new(team_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            channel_id: channel_id.into(),
        }
    }

    /// Build a key, rejecting empty or oversized ids
    pub fn parse(team_id: &str, channel_id: &str) -> Result<Self> {
        validate_id("team_id", team_id)?;
        validate_id("channel_id", channel_id)?;
        Ok(Self::new(team_id, channel_id))
    }
}

impl std::fmt::Display for QueueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.team_id, self.channel_id)
    }
}

/// Validate an opaque identifier coming from the dispatch layer
pub fn validate_id(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DomainError::InvalidId {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.len() > MAX_ID_LEN {
        return Err(DomainError::InvalidId {
            field,
            reason: format!("too long ({} > {} chars)", value.len(), MAX_ID_LEN),
        });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidId {
            field,
            reason: "must not contain whitespace".to_string(),
        });
    }
    Ok(())
}

/// One queued member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub member_id: MemberId,
    pub rank: Rank,
}

impl QueueEntry {
    pub fn new(member_id: impl Into<String>, rank: Rank) -> Self {
        Self {
            member_id: member_id.into(),
            rank,
        }
    }
}

/// Result of a join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinOutcome {
    Admitted,
    AlreadyQueued,
}

impl JoinOutcome {
    pub fn admitted(self) -> bool {
        matches!(self, JoinOutcome::Admitted)
    }
}

/// Result of a leave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveOutcome {
    Removed,
    NotInQueue,
}

impl LeaveOutcome {
    pub fn removed(self) -> bool {
        matches!(self, LeaveOutcome::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_key() {
        let key = QueueKey::parse("T01", "C42").unwrap();
        assert_eq!(key.team_id, "T01");
        assert_eq!(key.channel_id, "C42");
        assert_eq!(key.to_string(), "T01/C42");
    }

    #[test]
    fn test_parse_rejects_empty_channel() {
        let err = QueueKey::parse("T01", "").unwrap_err();
        assert!(err.to_string().contains("channel_id"));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_id_too_long() {
        let err = validate_id("member_id", &"U".repeat(MAX_ID_LEN + 1)).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_validate_id_whitespace() {
        assert!(validate_id("member_id", "U1 U2").is_err());
    }
}
