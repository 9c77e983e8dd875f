use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Roster Store Models
// ============================================================================

/// A teacher provisioned in the roster store.
///
/// The password is kept in plaintext because that is how the store holds it;
/// authentication is an exact string comparison against the fetched rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub login_id: String,
    pub password: String,
}

impl Teacher {
    /// Build a teacher from a `[id, name, loginId, password]` row.
    /// Missing trailing cells read as empty strings.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        Self {
            id: cell(0),
            name: cell(1),
            login_id: cell(2),
            password: cell(3),
        }
    }

    pub fn matches(&self, login_id: &str, password: &str) -> bool {
        self.login_id == login_id && self.password == password
    }
}

/// A student as returned by one roster load.
///
/// `id` is the 1-based position in that load's filtered result and is only
/// meaningful while that roster is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: u32,
    pub name: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassDescriptor {
    pub id: String,
    pub name: String,
    pub sheet_id: String,
}

impl ClassDescriptor {
    /// Range of the class roster sheet holding student names (column A).
    pub fn roster_range(&self) -> String {
        format!("{}!A2:B", self.name)
    }
}

// ============================================================================
// Attendance Log Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum AttendanceStatus {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "Present"),
            AttendanceStatus::Absent => write!(f, "Absent"),
        }
    }
}

/// One row appended to the remote attendance log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_name: String,
    pub class_name: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub teacher_id: String,
    pub teacher_name: String,
}

// ============================================================================
// Wire Models
// ============================================================================

/// Body of a spreadsheet values read. Empty ranges omit `values` entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppendRequest<'a> {
    pub action: &'static str,
    pub records: &'a [AttendanceRecord],
}

impl<'a> AppendRequest<'a> {
    pub fn submit_attendance(records: &'a [AttendanceRecord]) -> Self {
        Self {
            action: "submitAttendance",
            records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppendResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
