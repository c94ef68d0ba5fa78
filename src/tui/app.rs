use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;

use crate::models::{DueTime, Task, TaskId};
use crate::notify::OverlaySurface;
use crate::session::Session;

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

/// Whether the event loop keeps going after a key.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// State for the two-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub description: String,
    pub step: usize, // 0: Description, 1: Due time
}

pub struct App {
    pub session: Session<OverlaySurface>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub show_completed: bool,
    /// One-line feedback shown in the help bar (rejected input and such).
    pub message: Option<String>,
}

impl App {
    pub fn new(session: Session<OverlaySurface>) -> App {
        App {
            session,
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            show_completed: true,
            message: None,
        }
    }

    /// Tasks currently shown, in list order.
    pub fn visible_tasks(&self) -> Vec<Task> {
        self.session
            .tasks()
            .iter()
            .filter(|t| self.show_completed || !t.complete)
            .cloned()
            .collect()
    }

    /// Keeps the selection inside the list after it changed underneath us.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    /// Selects the next task.
    pub fn next(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous task.
    pub fn previous(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn selected_id(&self) -> Option<TaskId> {
        let i = self.state.selected()?;
        self.visible_tasks().get(i).map(|t| t.id.clone())
    }

    /// Toggles completion of the selected task.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Err(e) = self.session.toggle(&id) {
                self.message = Some(e.to_string());
            }
            self.clamp_selection();
        }
    }

    /// Deletes the selected task.
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Err(e) = self.session.remove(&id) {
                self.message = Some(e.to_string());
            }
            self.clamp_selection();
        }
    }

    /// Toggles the visibility of completed tasks.
    pub fn toggle_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.clamp_selection();
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.message = None;
    }

    /// Handles Enter in the "Add Task" wizard.
    pub fn handle_input(&mut self) {
        match self.add_state.step {
            0 => {
                // Description
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.description = self.input_buffer.trim().to_string();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => {
                // Due time, optional
                let due = if self.input_buffer.trim().is_empty() {
                    None
                } else {
                    match DueTime::parse(&self.input_buffer) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            self.message = Some(e.to_string());
                            return;
                        }
                    }
                };
                self.message = self
                    .session
                    .create(&self.add_state.description, due)
                    .err()
                    .map(|e| e.to_string());
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match self.input_mode {
            InputMode::Normal => {
                // feedback lasts until the next key
                self.message = None;
                match key.code {
                    KeyCode::Char('q') => return Flow::Quit,
                    KeyCode::Down | KeyCode::Char('j') => self.next(),
                    KeyCode::Up | KeyCode::Char('k') => self.previous(),
                    KeyCode::Char(' ') => self.toggle_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
                    KeyCode::Char('a') => self.start_add(),
                    KeyCode::Char('c') => self.toggle_completed(),
                    KeyCode::Char('s') => {
                        self.session.push_snapshot();
                        self.message = Some("Pushing list to backend".into());
                    }
                    KeyCode::Char('x') => {
                        self.session.dismiss_toast();
                    }
                    KeyCode::Char('z') => {
                        self.session.hold_toast();
                    }
                    _ => {}
                }
            }
            InputMode::Adding => match key.code {
                KeyCode::Enter => self.handle_input(),
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    self.input_buffer.clear();
                }
                KeyCode::Char(c) => self.input_buffer.push(c),
                KeyCode::Backspace => {
                    self.input_buffer.pop();
                }
                _ => {}
            },
        }
        Flow::Continue
    }
}
