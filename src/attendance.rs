use crate::api::RosterStore;
use crate::error::AttendanceError;
use crate::models::{AttendanceRecord, AttendanceStatus, ClassDescriptor, Student, Teacher};
use crate::session::Session;
use chrono::{Local, NaiveDate};
use indexmap::IndexMap;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Marks
// ============================================================================

/// What the form currently shows for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceMark {
    Present,
    Absent,
    Unmarked,
}

impl From<Option<AttendanceStatus>> for AttendanceMark {
    fn from(status: Option<AttendanceStatus>) -> Self {
        match status {
            Some(AttendanceStatus::Present) => AttendanceMark::Present,
            Some(AttendanceStatus::Absent) => AttendanceMark::Absent,
            None => AttendanceMark::Unmarked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkEvent {
    /// Set a status; setting the status a student already has clears it.
    Toggle {
        student_id: u32,
        status: AttendanceStatus,
    },
    Clear,
}

/// Marked students keyed by roster id. A student with no entry is unmarked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks(IndexMap<u32, AttendanceStatus>);

impl Marks {
    pub fn get(&self, student_id: u32) -> AttendanceMark {
        self.0.get(&student_id).copied().into()
    }

    pub fn status(&self, student_id: u32) -> Option<AttendanceStatus> {
        self.0.get(&student_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Apply one event to a mark set.
pub fn reduce(mut marks: Marks, event: MarkEvent) -> Marks {
    match event {
        MarkEvent::Toggle { student_id, status } => {
            if marks.0.get(&student_id) == Some(&status) {
                marks.0.shift_remove(&student_id);
            } else {
                marks.0.insert(student_id, status);
            }
        }
        MarkEvent::Clear => marks.0.clear(),
    }
    marks
}

// ============================================================================
// Date
// ============================================================================

/// Calendar date attendance is recorded for. Always a real date, written to
/// the log as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AttendanceDate(NaiveDate);

impl AttendanceDate {
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn parse(input: &str) -> Result<Self, AttendanceError> {
        NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| AttendanceError::InvalidDate {
                input: input.to_string(),
            })
    }
}

impl fmt::Display for AttendanceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

// ============================================================================
// Form
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub present: usize,
    pub absent: usize,
    pub unmarked: usize,
}

/// One in-progress attendance sheet: a class roster, the marks entered so
/// far and the date they apply to.
#[derive(Debug, Clone)]
pub struct AttendanceForm {
    class: ClassDescriptor,
    roster: Vec<Student>,
    marks: Marks,
    date: AttendanceDate,
}

impl AttendanceForm {
    pub fn new(class: ClassDescriptor, roster: Vec<Student>, date: AttendanceDate) -> Self {
        Self {
            class,
            roster,
            marks: Marks::default(),
            date,
        }
    }

    pub fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    pub fn roster(&self) -> &[Student] {
        &self.roster
    }

    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    pub fn mark(&self, student_id: u32) -> AttendanceMark {
        self.marks.get(student_id)
    }

    pub fn date(&self) -> AttendanceDate {
        self.date
    }

    /// Toggle `status` for a student on the roster. Ids not on the roster
    /// are ignored.
    pub fn set_mark(&mut self, student_id: u32, status: AttendanceStatus) {
        if !self.roster.iter().any(|s| s.id == student_id) {
            log::warn!("Ignoring mark for unknown student id {}", student_id);
            return;
        }
        let marks = std::mem::take(&mut self.marks);
        self.marks = reduce(marks, MarkEvent::Toggle { student_id, status });
    }

    /// Replace the attendance date. Rejected input leaves the date unchanged.
    pub fn set_date(&mut self, input: &str) -> Result<(), AttendanceError> {
        self.date = AttendanceDate::parse(input)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        let marks = std::mem::take(&mut self.marks);
        self.marks = reduce(marks, MarkEvent::Clear);
    }

    pub fn tally(&self) -> Tally {
        self.roster
            .iter()
            .fold(Tally::default(), |mut tally, student| {
                match self.marks.get(student.id) {
                    AttendanceMark::Present => tally.present += 1,
                    AttendanceMark::Absent => tally.absent += 1,
                    AttendanceMark::Unmarked => tally.unmarked += 1,
                }
                tally
            })
    }

    /// One record per roster student, or `IncompleteMarking` if anyone is
    /// still unmarked.
    pub fn build_batch(&self, teacher: &Teacher) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let unmarked = self.tally().unmarked;
        if unmarked > 0 {
            return Err(AttendanceError::IncompleteMarking { unmarked });
        }

        let date = self.date.to_string();
        let records = self
            .roster
            .iter()
            .filter_map(|student| {
                self.marks.status(student.id).map(|status| AttendanceRecord {
                    student_name: student.name.clone(),
                    class_name: student.class.clone(),
                    date: date.clone(),
                    status,
                    teacher_id: teacher.id.clone(),
                    teacher_name: teacher.name.clone(),
                })
            })
            .collect();

        Ok(records)
    }

    /// Validate and send the whole batch in one append call.
    ///
    /// On success the marks are cleared and the number of records written is
    /// returned. On any failure the marks are left exactly as they were so
    /// the teacher can retry.
    pub async fn submit<S: RosterStore>(
        &mut self,
        session: &Session,
        store: &S,
    ) -> Result<usize, AttendanceError> {
        let batch = self.checked_batch(session).map_err(|e| {
            log::warn!("Attendance for {} not submitted: {}", self.class.name, e);
            e
        })?;

        let response = store.append_attendance(&batch).await.map_err(|e| {
            log::error!("Attendance submission for {} failed: {:#}", self.class.name, e);
            AttendanceError::fetch(e)
        })?;

        if !response.success {
            let message = if response.message.is_empty() {
                "Unknown error".to_string()
            } else {
                response.message
            };
            log::error!("Attendance submission for {} rejected: {}", self.class.name, message);
            return Err(AttendanceError::Rejected(message));
        }

        log::info!(
            "Submitted {} record(s) for {} on {}: {}",
            batch.len(),
            self.class.name,
            self.date,
            response.message
        );
        self.reset();
        Ok(batch.len())
    }

    fn checked_batch(&self, session: &Session) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let teacher = session.teacher().ok_or(AttendanceError::NotAuthenticated)?;
        self.build_batch(teacher)
    }
}
