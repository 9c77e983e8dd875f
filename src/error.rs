use thiserror::Error;

/// Failures surfaced to the teacher. None of these end the program; every
/// one of them returns the UI to a state where the action can be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("Invalid login ID or password")]
    AuthFailure,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Class '{class_id}' not found")]
    NotFound { class_id: String },

    #[error("{0}")]
    Fetch(String),

    #[error("Store rejected the submission: {0}")]
    Rejected(String),

    #[error("{unmarked} student(s) don't have attendance marked yet")]
    IncompleteMarking { unmarked: usize },

    #[error("Invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate { input: String },
}

impl AttendanceError {
    /// Wrap a remote failure, keeping the whole context chain in the message.
    pub fn fetch(err: anyhow::Error) -> Self {
        AttendanceError::Fetch(format!("{:#}", err))
    }

    /// Title used by the notice popup.
    pub fn title(&self) -> &'static str {
        match self {
            AttendanceError::AuthFailure | AttendanceError::NotAuthenticated => "Login Failed",
            AttendanceError::NotFound { .. } => "Class Not Found",
            AttendanceError::Fetch(_) | AttendanceError::Rejected(_) => "Network Error",
            AttendanceError::IncompleteMarking { .. } => "Incomplete Attendance",
            AttendanceError::InvalidDate { .. } => "Invalid Date",
        }
    }
}
