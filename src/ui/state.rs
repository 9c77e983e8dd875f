use crate::attendance::AttendanceForm;
use crate::error::AttendanceError;
use crate::models::ClassDescriptor;

#[derive(Debug, Clone)]
pub enum AppState {
    Login {
        login_id: String,
        password: String,
        focused_field: LoginField,
    },
    ClassSelection {
        teacher_name: String,
        classes: Vec<ClassDescriptor>,
        selected_index: usize,
    },
    LoadingRoster {
        class: ClassDescriptor,
    },
    Attendance {
        form: AttendanceForm,
        selected_index: usize,
        /// Date being typed; `None` when the date field is not being edited.
        date_input: Option<String>,
    },
}

impl AppState {
    pub fn login() -> Self {
        AppState::Login {
            login_id: String::new(),
            password: String::new(),
            focused_field: LoginField::LoginId,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginField {
    LoginId,
    Password,
}

impl LoginField {
    pub fn toggle(self) -> Self {
        match self {
            LoginField::LoginId => LoginField::Password,
            LoginField::Password => LoginField::LoginId,
        }
    }
}

/// Remote work run by the event loop after the screen shows it is busy.
#[derive(Debug, Clone)]
pub enum PendingAction {
    Login { login_id: String, password: String },
    SubmitAttendance,
}

impl PendingAction {
    pub fn busy_message(&self) -> &'static str {
        match self {
            PendingAction::Login { .. } => "Logging in...",
            PendingAction::SubmitAttendance => "Submitting attendance...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Dismissible message shown on top of the current view.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Done".to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl From<&AttendanceError> for Notice {
    fn from(err: &AttendanceError) -> Self {
        Notice::error(err.title(), err.to_string())
    }
}
