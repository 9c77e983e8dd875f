use crate::models::{AppendResponse, AttendanceRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Remote store holding teachers, class rosters and the attendance log.
///
/// Rows are returned as read from the sheet: ordered, with trailing empty
/// cells possibly missing.
#[async_trait]
pub trait RosterStore: Send + Sync + 'static {
    /// Rows of `[id, name, loginId, password]`.
    async fn teacher_rows(&self) -> Result<Vec<Vec<String>>>;

    /// Rows of `[name, ...]` for one class roster.
    async fn student_rows(&self, sheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;

    /// Append a whole batch in one call.
    async fn append_attendance(&self, records: &[AttendanceRecord]) -> Result<AppendResponse>;
}
