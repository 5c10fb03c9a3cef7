//! Session lifecycle states

use std::fmt;

/// Lifecycle of a [`super::SessionController`]:
/// `Uninitialized -> Initialized -> Triggered* -> Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initialized,
    /// At least one trigger completed successfully
    Triggered,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "Uninitialized",
            SessionState::Initialized => "Initialized",
            SessionState::Triggered => "Triggered",
            SessionState::Closed => "Closed",
        }
    }

    /// Whether headers may be added and triggers run
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Initialized | SessionState::Triggered)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_states() {
        assert!(!SessionState::Uninitialized.is_active());
        assert!(SessionState::Initialized.is_active());
        assert!(SessionState::Triggered.is_active());
        assert!(!SessionState::Closed.is_active());
    }

    #[test]
    fn test_default_and_display() {
        assert_eq!(SessionState::default(), SessionState::Uninitialized);
        assert_eq!(SessionState::Triggered.to_string(), "Triggered");
    }
}
