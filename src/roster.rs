use crate::api::RosterStore;
use crate::catalog::ClassCatalog;
use crate::error::AttendanceError;
use crate::models::{ClassDescriptor, Student};

/// Fetch the current roster for `class_id`.
///
/// Rows with an empty name are dropped, and ids are the 1-based position in
/// what remains. No retries; the caller decides whether to try again.
pub async fn load_roster<S: RosterStore>(
    store: &S,
    catalog: &ClassCatalog,
    class_id: &str,
) -> Result<(ClassDescriptor, Vec<Student>), AttendanceError> {
    let class = catalog.find(class_id).map_err(|e| {
        log::warn!("Roster requested for unknown class '{}'", class_id);
        e
    })?;

    let rows = store
        .student_rows(&class.sheet_id, &class.roster_range())
        .await
        .map_err(|e| {
            log::error!("Failed to load roster for {}: {:#}", class.name, e);
            AttendanceError::fetch(e)
        })?;

    let students = students_from_rows(&class.name, &rows);
    log::info!("Loaded {} student(s) for {}", students.len(), class.name);

    Ok((class.clone(), students))
}

fn students_from_rows(class_name: &str, rows: &[Vec<String>]) -> Vec<Student> {
    rows.iter()
        .filter_map(|row| row.first())
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .enumerate()
        .map(|(index, name)| Student {
            id: index as u32 + 1,
            name: name.to_string(),
            class: class_name.to_string(),
        })
        .collect()
}

/// Identifies one roster request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Tracks which roster request the UI is still waiting for, so a response
/// that arrives after the teacher moved on is dropped instead of applied.
#[derive(Debug, Default)]
pub struct RosterRequests {
    next: u64,
    current: Option<LoadTicket>,
}

impl RosterRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any outstanding one.
    pub fn begin(&mut self) -> LoadTicket {
        self.next += 1;
        let ticket = LoadTicket(self.next);
        self.current = Some(ticket);
        ticket
    }

    pub fn cancel(&mut self) {
        self.current = None;
    }

    /// Consume `ticket` if it is the outstanding request.
    pub fn complete(&mut self, ticket: LoadTicket) -> bool {
        if self.current == Some(ticket) {
            self.current = None;
            true
        } else {
            log::debug!("Discarding stale roster response {:?}", ticket);
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeStore;

    fn catalog() -> ClassCatalog {
        ClassCatalog::from_yaml(
            r#"
- id: "1"
  name: Class1
  sheet_id: sheet-1
- id: "2"
  name: Class2
  sheet_id: sheet-2
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_roster_filters_empty_names() {
        let store = FakeStore::new().with_roster("sheet-1", &["Asha", "", "Ben", "  ", "Chen"]);

        let (class, students) = load_roster(&store, &catalog(), "1").await.unwrap();
        assert_eq!(class.name, "Class1");
        assert_eq!(students.len(), 3);
        assert!(students.iter().all(|s| !s.name.is_empty()));

        let ids: Vec<u32> = students.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(students[2].name, "Chen");
        assert_eq!(students[2].class, "Class1");
    }

    #[test]
    fn test_rows_without_cells_skipped() {
        let rows = vec![vec![], vec!["Dana".to_string(), "extra".to_string()]];
        let students = students_from_rows("Class2", &rows);
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, 1);
        assert_eq!(students[0].name, "Dana");
    }

    #[tokio::test]
    async fn test_unknown_class_is_not_found() {
        let store = FakeStore::new();
        let err = load_roster(&store, &catalog(), "42").await.unwrap_err();
        assert_eq!(
            err,
            AttendanceError::NotFound {
                class_id: "42".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_fetch_error() {
        let store = FakeStore::new().with_roster("sheet-2", &["Eve"]);
        store.fail_reads(true);

        let err = load_roster(&store, &catalog(), "2").await.unwrap_err();
        assert!(matches!(err, AttendanceError::Fetch(msg) if msg.contains("unreachable")));
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut requests = RosterRequests::new();
        let first = requests.begin();
        let second = requests.begin();

        assert!(!requests.complete(first));
        assert!(requests.is_pending());
        assert!(requests.complete(second));
        assert!(!requests.is_pending());
    }

    #[test]
    fn test_cancelled_ticket_discarded() {
        let mut requests = RosterRequests::new();
        let ticket = requests.begin();
        requests.cancel();

        assert!(!requests.complete(ticket));
    }
}
