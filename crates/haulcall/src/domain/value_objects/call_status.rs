//! CallStatus - Server-owned progress of a call

use serde::{Deserialize, Serialize};

/// Call status as reported by the backend
///
/// Advances `initiated -> in_progress -> completed`; any state may move
/// to `failed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    Initiated,
    InProgress,
    Completed,
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Initiated => "initiated",
            CallStatus::InProgress => "in_progress",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
        }
    }

    /// No further server-side changes are expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            CallStatus::Initiated => 0,
            CallStatus::InProgress => 1,
            CallStatus::Completed => 2,
            CallStatus::Failed => 3,
        }
    }

    /// Whether the backend may move a call from `self` to `next`
    pub fn can_transition_to(&self, next: CallStatus) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        next == CallStatus::Failed || next.rank() >= self.rank()
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initiated" => Ok(CallStatus::Initiated),
            "in_progress" => Ok(CallStatus::InProgress),
            "completed" => Ok(CallStatus::Completed),
            "failed" => Ok(CallStatus::Failed),
            _ => Err(format!("Unknown call status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!CallStatus::Initiated.is_terminal());
        assert!(!CallStatus::InProgress.is_terminal());
        assert!(CallStatus::Completed.is_terminal());
        assert!(CallStatus::Failed.is_terminal());
    }

    #[test]
    fn test_transitions_are_monotone_except_failure() {
        assert!(CallStatus::Initiated.can_transition_to(CallStatus::InProgress));
        assert!(CallStatus::Initiated.can_transition_to(CallStatus::Completed));
        assert!(CallStatus::InProgress.can_transition_to(CallStatus::Failed));
        assert!(!CallStatus::InProgress.can_transition_to(CallStatus::Initiated));
        assert!(!CallStatus::Completed.can_transition_to(CallStatus::Failed));
        assert!(!CallStatus::Failed.can_transition_to(CallStatus::Completed));
    }

    #[test]
    fn test_wire_names() {
        let status: CallStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, CallStatus::InProgress);
        assert_eq!("completed".parse::<CallStatus>(), Ok(CallStatus::Completed));
        assert!("ringing".parse::<CallStatus>().is_err());
    }
}
