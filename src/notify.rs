//! Turns "task became due" into something the user notices: a transient
//! toast, an audible cue, and a focus request when the toast is dismissed.

use std::collections::VecDeque;
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::{execute, style::Print};
use tracing::{debug, info};

use crate::config::AlertSettings;
use crate::error::AlertError;
use crate::models::{Task, TaskId};

/// How long a toast stays up unless the user holds it.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

/// BEL; terminals turn it into their configured sound.
const BELL: &str = "\x07";
/// xterm "raise window" control sequence.
const RAISE_WINDOW: &str = "\x1b[5t";

/// Permission to show notifications, asked for once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

/// Host capabilities the dispatcher drives.
pub trait AlertSurface {
    fn request_permission(&mut self) -> Permission;
    fn show_toast(&mut self, task: &Task) -> Result<(), AlertError>;
    fn play_cue(&mut self) -> Result<(), AlertError>;
    fn focus_window(&mut self) -> Result<(), AlertError>;
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub task_id: TaskId,
    pub message: String,
    pub shown_at: Instant,
    /// Set once the user interacted with it; held toasts never auto-close.
    pub held: bool,
}

impl Toast {
    pub fn expired(&self, now: Instant) -> bool {
        !self.held && now.saturating_duration_since(self.shown_at) >= TOAST_LIFETIME
    }
}

/// Visible toasts, oldest first.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, task_id: TaskId, message: impl Into<String>, now: Instant) {
        self.toasts.push_back(Toast {
            task_id,
            message: message.into(),
            shown_at: now,
            held: false,
        });
    }

    /// Drops toasts past their lifetime; returns how many went away.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.expired(now));
        before - self.toasts.len()
    }

    /// Pins the oldest toast on screen.
    pub fn hold_front(&mut self) -> bool {
        match self.toasts.front_mut() {
            Some(t) => {
                t.held = true;
                true
            }
            None => false,
        }
    }

    pub fn dismiss_front(&mut self) -> Option<Toast> {
        self.toasts.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Presents reminders through an [`AlertSurface`]. Every failure is swallowed:
/// a missed reminder is not retried.
#[derive(Debug)]
pub struct Dispatcher<S> {
    surface: S,
    permission: Permission,
    sound: bool,
    dispatched: u64,
}

impl<S: AlertSurface> Dispatcher<S> {
    pub fn new(surface: S, settings: &AlertSettings) -> Self {
        Dispatcher {
            surface,
            permission: if settings.notifications {
                Permission::Default
            } else {
                Permission::Denied
            },
            sound: settings.sound,
            dispatched: 0,
        }
    }

    /// Asks for notification permission unless it was already decided.
    pub fn init(&mut self) {
        if self.permission == Permission::Default {
            self.permission = self.surface.request_permission();
            info!(permission = ?self.permission, "notification permission");
        }
    }

    pub fn dispatch(&mut self, task: &Task) {
        self.dispatched += 1;
        if self.permission == Permission::Granted {
            if let Err(e) = self.surface.show_toast(task) {
                debug!(id = %task.id, error = %e, "toast failed");
            }
        } else {
            debug!(id = %task.id, "toast suppressed, no permission");
        }
        if self.sound {
            if let Err(e) = self.surface.play_cue() {
                debug!(error = %e, "cue failed");
            }
        }
    }

    /// The user explicitly closed a toast.
    pub fn dismissed(&mut self) {
        if let Err(e) = self.surface.focus_window() {
            debug!(error = %e, "focus request failed");
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Reminders handed to the dispatcher so far, shown or not.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

fn write_control(seq: &str) -> Result<(), AlertError> {
    let mut out = io::stdout();
    if !out.is_terminal() {
        return Err(AlertError::NoTerminal);
    }
    execute!(out, Print(seq))?;
    Ok(())
}

/// Line-oriented surface for the headless `watch` loop.
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl AlertSurface for TerminalSurface {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn show_toast(&mut self, task: &Task) -> Result<(), AlertError> {
        let mut out = io::stdout().lock();
        let due = task.due_time.map(|d| d.to_string()).unwrap_or_default();
        writeln!(
            out,
            "[{}] Reminder: {} (due {})",
            Local::now().format("%H:%M:%S"),
            task.description,
            due
        )?;
        out.flush()?;
        Ok(())
    }

    fn play_cue(&mut self) -> Result<(), AlertError> {
        write_control(BELL)
    }

    fn focus_window(&mut self) -> Result<(), AlertError> {
        write_control(RAISE_WINDOW)
    }
}

/// Surface for the TUI: toasts go into a queue the UI renders as an overlay.
#[derive(Debug, Default)]
pub struct OverlaySurface {
    pub toasts: ToastQueue,
}

impl AlertSurface for OverlaySurface {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn show_toast(&mut self, task: &Task) -> Result<(), AlertError> {
        self.toasts
            .push(task.id.clone(), task.description.clone(), Instant::now());
        Ok(())
    }

    fn play_cue(&mut self) -> Result<(), AlertError> {
        write_control(BELL)
    }

    fn focus_window(&mut self) -> Result<(), AlertError> {
        write_control(RAISE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;

    #[derive(Default)]
    struct Recorder {
        answer: Option<Permission>,
        asked: usize,
        toasts: Vec<String>,
        cues: usize,
        focus: usize,
        fail_cue: bool,
    }

    impl AlertSurface for Recorder {
        fn request_permission(&mut self) -> Permission {
            self.asked += 1;
            self.answer.unwrap_or(Permission::Granted)
        }
        fn show_toast(&mut self, task: &Task) -> Result<(), AlertError> {
            self.toasts.push(task.description.clone());
            Ok(())
        }
        fn play_cue(&mut self) -> Result<(), AlertError> {
            self.cues += 1;
            if self.fail_cue {
                return Err(AlertError::NoTerminal);
            }
            Ok(())
        }
        fn focus_window(&mut self) -> Result<(), AlertError> {
            self.focus += 1;
            Ok(())
        }
    }

    fn settings(notifications: bool, sound: bool) -> AlertSettings {
        AlertSettings { notifications, sound }
    }

    fn task() -> Task {
        NewTask::new("Call Alice", None).with_id(TaskId::Number(1))
    }

    #[test]
    fn permission_requested_once() {
        let mut d = Dispatcher::new(Recorder::default(), &settings(true, true));
        d.init();
        d.init();
        assert_eq!(d.surface().asked, 1);
        assert_eq!(d.permission(), Permission::Granted);
    }

    #[test]
    fn disabled_notifications_never_ask() {
        let mut d = Dispatcher::new(Recorder::default(), &settings(false, true));
        d.init();
        d.dispatch(&task());
        assert_eq!(d.surface().asked, 0);
        assert!(d.surface().toasts.is_empty());
        assert_eq!(d.surface().cues, 1);
    }

    #[test]
    fn denied_permission_still_counts_dispatch() {
        let recorder = Recorder {
            answer: Some(Permission::Denied),
            ..Default::default()
        };
        let mut d = Dispatcher::new(recorder, &settings(true, false));
        d.init();
        d.dispatch(&task());
        assert!(d.surface().toasts.is_empty());
        assert_eq!(d.surface().cues, 0);
        assert_eq!(d.dispatched(), 1);
    }

    #[test]
    fn cue_failure_is_swallowed() {
        let recorder = Recorder {
            fail_cue: true,
            ..Default::default()
        };
        let mut d = Dispatcher::new(recorder, &settings(true, true));
        d.init();
        d.dispatch(&task());
        assert_eq!(d.surface().toasts, vec!["Call Alice".to_string()]);
        d.dismissed();
        assert_eq!(d.surface().focus, 1);
    }

    #[test]
    fn toasts_expire_unless_held() {
        let start = Instant::now();
        let mut q = ToastQueue::default();
        q.push(TaskId::Number(1), "a", start);
        q.push(TaskId::Number(2), "b", start);
        assert!(q.hold_front());
        assert_eq!(q.expire(start + Duration::from_secs(4)), 0);
        assert_eq!(q.expire(start + TOAST_LIFETIME), 1);
        assert_eq!(q.iter().map(|t| t.message.as_str()).collect::<Vec<_>>(), vec!["a"]);
        assert!(q.dismiss_front().is_some());
        assert!(q.is_empty());
    }
}
