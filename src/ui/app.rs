use crate::api::RosterStore;
use crate::attendance::{AttendanceDate, AttendanceForm};
use crate::catalog::ClassCatalog;
use crate::error::AttendanceError;
use crate::models::{AttendanceStatus, ClassDescriptor, Student};
use crate::roster::{self, LoadTicket, RosterRequests};
use crate::session::Session;
use crate::ui::render::render_ui;
use crate::ui::state::{AppState, LoginField, Notice, PendingAction};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tokio::sync::mpsc;

type RosterResult = Result<(ClassDescriptor, Vec<Student>), AttendanceError>;

const DATE_INPUT_LEN: usize = 10;

pub struct App<S> {
    store: S,
    catalog: ClassCatalog,
    session: Session,
    requests: RosterRequests,
    roster_tx: mpsc::UnboundedSender<(LoadTicket, RosterResult)>,
    roster_rx: mpsc::UnboundedReceiver<(LoadTicket, RosterResult)>,
    state: AppState,
    notice: Option<Notice>,
    pending: Option<PendingAction>,
}

impl<S> App<S>
where
    S: RosterStore + Clone,
{
    pub fn new(store: S, catalog: ClassCatalog) -> Self {
        let (roster_tx, roster_rx) = mpsc::unbounded_channel();
        Self {
            store,
            catalog,
            session: Session::new(),
            requests: RosterRequests::new(),
            roster_tx,
            roster_rx,
            state: AppState::login(),
            notice: None,
            pending: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            let busy = self.pending.as_ref().map(PendingAction::busy_message);
            terminal.draw(|f| render_ui(f, &self.state, self.notice.as_ref(), busy))?;

            // The busy screen is on display; now do the remote call
            if let Some(action) = self.pending.take() {
                self.run_action(action).await;
                continue;
            }

            while let Ok((ticket, result)) = self.roster_rx.try_recv() {
                self.apply_roster(ticket, result);
            }

            if event::poll(std::time::Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key_event(key) {
                        break; // User quit
                    }
                }
            }

            // Small yield so roster loads can make progress
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        Ok(())
    }

    fn class_selection(&self) -> AppState {
        if !self.session.is_authenticated() {
            return AppState::login();
        }
        AppState::ClassSelection {
            teacher_name: self
                .session
                .teacher()
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            classes: self.catalog.classes().to_vec(),
            selected_index: 0,
        }
    }

    fn show_error(&mut self, err: &AttendanceError) {
        self.notice = Some(Notice::from(err));
    }

    async fn run_action(&mut self, action: PendingAction) {
        match action {
            PendingAction::Login { login_id, password } => {
                if self.session.login(&self.store, &login_id, &password).await {
                    self.notice = Some(Notice::success("Login successful!"));
                    self.state = self.class_selection();
                } else {
                    self.show_error(&AttendanceError::AuthFailure);
                }
            }
            PendingAction::SubmitAttendance => {
                let AppState::Attendance { form, .. } = &mut self.state else {
                    return;
                };
                match form.submit(&self.session, &self.store).await {
                    Ok(count) => {
                        self.notice = Some(Notice::success(format!(
                            "Attendance submitted for {} student(s) in {} on {}",
                            count,
                            form.class().name,
                            form.date()
                        )));
                        self.state = self.class_selection();
                    }
                    Err(e) => self.show_error(&e),
                }
            }
        }
    }

    fn start_roster_load(&mut self, class: ClassDescriptor) {
        let ticket = self.requests.begin();
        let store = self.store.clone();
        let catalog = self.catalog.clone();
        let class_id = class.id.clone();
        let tx = self.roster_tx.clone();

        log::info!("Loading roster for {}", class.name);
        self.state = AppState::LoadingRoster { class };

        tokio::spawn(async move {
            let result = roster::load_roster(&store, &catalog, &class_id).await;
            // The receiver only goes away when the app is shutting down
            let _ = tx.send((ticket, result));
        });
    }

    fn apply_roster(&mut self, ticket: LoadTicket, result: RosterResult) {
        if !self.requests.complete(ticket) {
            return;
        }

        match result {
            Ok((class, students)) if students.is_empty() => {
                log::warn!("Roster for {} is empty", class.name);
                self.notice = Some(Notice::error(
                    "Empty Roster",
                    format!("No students found for {}", class.name),
                ));
                self.state = self.class_selection();
            }
            Ok((class, students)) => {
                self.state = AppState::Attendance {
                    form: AttendanceForm::new(class, students, AttendanceDate::today()),
                    selected_index: 0,
                    date_input: None,
                };
            }
            Err(e) => {
                self.show_error(&e);
                self.state = self.class_selection();
            }
        }
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        // Any key dismisses a notice
        if self.notice.take().is_some() {
            return false;
        }

        let current_state = std::mem::replace(&mut self.state, AppState::login());

        match current_state {
            AppState::Login {
                mut login_id,
                mut password,
                mut focused_field,
            } => match key.code {
                KeyCode::Esc => return true,
                KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                    focused_field = focused_field.toggle();
                    self.state = AppState::Login {
                        login_id,
                        password,
                        focused_field,
                    };
                }
                KeyCode::Char(c) => {
                    match focused_field {
                        LoginField::LoginId => login_id.push(c),
                        LoginField::Password => password.push(c),
                    }
                    self.state = AppState::Login {
                        login_id,
                        password,
                        focused_field,
                    };
                }
                KeyCode::Backspace => {
                    match focused_field {
                        LoginField::LoginId => login_id.pop(),
                        LoginField::Password => password.pop(),
                    };
                    self.state = AppState::Login {
                        login_id,
                        password,
                        focused_field,
                    };
                }
                KeyCode::Enter => {
                    if login_id.trim().is_empty() || password.is_empty() {
                        self.notice = Some(Notice::error(
                            "Login Failed",
                            "Please enter both login ID and password",
                        ));
                    } else {
                        self.pending = Some(PendingAction::Login {
                            login_id: login_id.clone(),
                            password: password.clone(),
                        });
                    }
                    self.state = AppState::Login {
                        login_id,
                        password,
                        focused_field,
                    };
                }
                _ => {
                    self.state = AppState::Login {
                        login_id,
                        password,
                        focused_field,
                    };
                }
            },
            AppState::ClassSelection {
                teacher_name,
                classes,
                mut selected_index,
            } => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('l') => {
                    self.session.logout();
                    self.state = AppState::login();
                }
                KeyCode::Up => {
                    selected_index = selected_index.saturating_sub(1);
                    self.state = AppState::ClassSelection {
                        teacher_name,
                        classes,
                        selected_index,
                    };
                }
                KeyCode::Down => {
                    if selected_index < classes.len().saturating_sub(1) {
                        selected_index += 1;
                    }
                    self.state = AppState::ClassSelection {
                        teacher_name,
                        classes,
                        selected_index,
                    };
                }
                KeyCode::Enter if selected_index < classes.len() => {
                    let class = classes[selected_index].clone();
                    self.start_roster_load(class);
                }
                _ => {
                    self.state = AppState::ClassSelection {
                        teacher_name,
                        classes,
                        selected_index,
                    };
                }
            },
            AppState::LoadingRoster { class } => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => {
                    if self.requests.is_pending() {
                        log::info!("Roster load for {} cancelled", class.name);
                        self.requests.cancel();
                    }
                    self.state = self.class_selection();
                }
                _ => self.state = AppState::LoadingRoster { class },
            },
            AppState::Attendance {
                mut form,
                selected_index,
                date_input: Some(mut date_input),
            } => {
                let mut editing = true;
                match key.code {
                    KeyCode::Esc => editing = false,
                    KeyCode::Backspace => {
                        date_input.pop();
                    }
                    KeyCode::Char(c) => {
                        if date_input.len() < DATE_INPUT_LEN {
                            date_input.push(c);
                        }
                    }
                    KeyCode::Enter => match form.set_date(&date_input) {
                        Ok(()) => editing = false,
                        Err(e) => {
                            log::warn!("{}", e);
                            self.show_error(&e);
                        }
                    },
                    _ => {}
                }
                self.state = AppState::Attendance {
                    form,
                    selected_index,
                    date_input: editing.then_some(date_input),
                };
            }
            AppState::Attendance {
                mut form,
                mut selected_index,
                date_input: None,
            } => {
                let selected_id = form.roster().get(selected_index).map(|s| s.id);
                match key.code {
                    KeyCode::Char('q') => return true,
                    KeyCode::Esc => {
                        // Leaving the form discards its marks
                        if !form.marks().is_empty() {
                            log::info!(
                                "Discarded {} unsubmitted mark(s) for {}",
                                form.marks().len(),
                                form.class().name
                            );
                        }
                        self.state = self.class_selection();
                        return false;
                    }
                    KeyCode::Up => selected_index = selected_index.saturating_sub(1),
                    KeyCode::Down => {
                        if selected_index < form.roster().len().saturating_sub(1) {
                            selected_index += 1;
                        }
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        if let Some(id) = selected_id {
                            form.set_mark(id, AttendanceStatus::Present);
                        }
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        if let Some(id) = selected_id {
                            form.set_mark(id, AttendanceStatus::Absent);
                        }
                    }
                    KeyCode::Char('d') => {
                        self.state = AppState::Attendance {
                            date_input: Some(form.date().to_string()),
                            form,
                            selected_index,
                        };
                        return false;
                    }
                    KeyCode::Enter | KeyCode::Char('s') => {
                        self.pending = Some(PendingAction::SubmitAttendance);
                    }
                    _ => {}
                }
                self.state = AppState::Attendance {
                    form,
                    selected_index,
                    date_input: None,
                };
            }
        }

        false
    }
}
