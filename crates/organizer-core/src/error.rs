use std::fmt;

/// Machine-readable error codes surfaced by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TaskNotFound,
    AmbiguousId,
    EmptyTitle,
    ChecklistItemNotFound,
    InvalidMove,
    InvalidEnumValue,
    InvalidDate,
    StoreUnavailable,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::AmbiguousId => "E2004",
            Self::InvalidEnumValue => "E2005",
            Self::EmptyTitle => "E2006",
            Self::ChecklistItemNotFound => "E2007",
            Self::InvalidMove => "E2008",
            Self::InvalidDate => "E2009",
            Self::StoreUnavailable => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::AmbiguousId => "Ambiguous task ID",
            Self::InvalidEnumValue => "Invalid recurrence or tab value",
            Self::EmptyTitle => "Task title is empty",
            Self::ChecklistItemNotFound => "Checklist item not found",
            Self::InvalidMove => "Invalid reorder",
            Self::InvalidDate => "Invalid date",
            Self::StoreUnavailable => "Task store unavailable",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in organizer/config.toml and retry."),
            Self::TaskNotFound => Some("Use `org list` to see available tasks."),
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::InvalidEnumValue => {
                Some("Recurrence: simple|progressive, interval: daily|weekly|monthly.")
            }
            Self::EmptyTitle => Some("Please enter a task title."),
            Self::ChecklistItemNotFound => Some("Use `org show <task>` to list checklist items."),
            Self::InvalidMove => Some("Pinned tasks keep their place; move only regular tasks."),
            Self::InvalidDate => Some("Use YYYY-MM-DD or YYYY-MM-DDTHH:MM."),
            Self::StoreUnavailable => Some("Check the database path and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Domain failures from task lookups and transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task '{0}' not found")]
    NotFound(String),

    #[error("task id '{prefix}' is ambiguous ({} matches)", .matches.len())]
    AmbiguousId { prefix: String, matches: Vec<String> },

    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("checklist item '{0}' not found")]
    ChecklistItemNotFound(String),

    #[error("cannot move: {0}")]
    InvalidMove(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),
}

impl TaskError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::TaskNotFound,
            Self::AmbiguousId { .. } => ErrorCode::AmbiguousId,
            Self::EmptyTitle => ErrorCode::EmptyTitle,
            Self::ChecklistItemNotFound(_) => ErrorCode::ChecklistItemNotFound,
            Self::InvalidMove(_) => ErrorCode::InvalidMove,
            Self::InvalidDate(_) => ErrorCode::InvalidDate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, TaskError};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::TaskNotFound,
            ErrorCode::AmbiguousId,
            ErrorCode::EmptyTitle,
            ErrorCode::ChecklistItemNotFound,
            ErrorCode::InvalidMove,
            ErrorCode::InvalidEnumValue,
            ErrorCode::InvalidDate,
            ErrorCode::StoreUnavailable,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::AmbiguousId.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn task_error_maps_to_code() {
        let err = TaskError::AmbiguousId {
            prefix: "a".into(),
            matches: vec!["tk-a1".into(), "tk-a2".into()],
        };
        assert_eq!(err.code(), ErrorCode::AmbiguousId);
        assert_eq!(err.to_string(), "task id 'a' is ambiguous (2 matches)");
    }
}
