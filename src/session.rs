use crate::api::RosterStore;
use crate::models::Teacher;

/// The logged-in teacher, if any. Owned by the UI and passed by reference
/// to whatever needs the current identity.
///
/// Credentials are compared in plaintext against the teacher sheet. There is
/// no hashing and no expiry; the store is the authority.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<Teacher>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the teacher list and become that teacher on an exact match of
    /// both fields. A store failure is logged and reported as `false`; a
    /// failed attempt leaves any current identity in place.
    pub async fn login<S: RosterStore>(&mut self, store: &S, login_id: &str, password: &str) -> bool {
        let rows = match store.teacher_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("Login for '{}' failed, teacher list unavailable: {:#}", login_id, e);
                return false;
            }
        };

        let teacher = rows
            .iter()
            .map(|row| Teacher::from_row(row))
            .find(|t| t.matches(login_id, password));

        match teacher {
            Some(teacher) => {
                log::info!("Teacher '{}' ({}) logged in", teacher.login_id, teacher.name);
                self.current = Some(teacher);
                true
            }
            None => {
                log::warn!("Rejected login for '{}'", login_id);
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(teacher) = self.current.take() {
            log::info!("Teacher '{}' logged out", teacher.login_id);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn teacher(&self) -> Option<&Teacher> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeStore;

    fn store() -> FakeStore {
        FakeStore::new()
            .with_teacher("1", "Bob", "bob", "hunter2")
            .with_teacher("2", "Alice", "alice", "secret")
    }

    #[tokio::test]
    async fn test_login_exact_match() {
        let store = store();
        let mut session = Session::new();

        assert!(session.login(&store, "alice", "secret").await);
        assert!(session.is_authenticated());
        let teacher = session.teacher().unwrap();
        assert_eq!(teacher.id, "2");
        assert_eq!(teacher.name, "Alice");
    }

    #[tokio::test]
    async fn test_wrong_password_is_false() {
        let store = store();
        let mut session = Session::new();

        assert!(!session.login(&store, "alice", "Secret").await);
        assert!(!session.login(&store, "alice", "hunter2").await);
        assert!(!session.login(&store, "Alice", "secret").await);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_store_failure_is_false() {
        let store = store();
        store.fail_reads(true);
        let mut session = Session::new();

        assert!(!session.login(&store, "alice", "secret").await);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_identity() {
        let store = store();
        let mut session = Session::new();
        assert!(session.login(&store, "bob", "hunter2").await);

        assert!(!session.login(&store, "alice", "wrong").await);
        assert_eq!(session.teacher().unwrap().login_id, "bob");
    }

    #[tokio::test]
    async fn test_logout_clears_identity() {
        let store = store();
        let mut session = Session::new();
        assert!(session.login(&store, "bob", "hunter2").await);

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.teacher().is_none());

        // Logging out twice is harmless
        session.logout();
        assert!(!session.is_authenticated());
    }
}
