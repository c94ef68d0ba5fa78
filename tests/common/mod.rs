#![allow(dead_code)]

use std::time::Duration;

use remindust::backend::{self, BackendState};
use remindust::error::AlertError;
use remindust::models::Task;
use remindust::notify::{AlertSurface, Permission};
use remindust::session::Session;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Starts the reference backend on an ephemeral port. Keep the `TempDir` alive.
pub async fn start_backend() -> (String, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = BackendState::open(dir.path().join("todos.json"));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(backend::serve(listener, state));
    (format!("http://{addr}"), dir)
}

/// A URL nothing listens on.
pub async fn dead_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Applies outcomes until no call is outstanding.
pub async fn settle<S: AlertSurface>(session: &mut Session<S>) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while session.in_flight() > 0 {
            let outcome = session.next_outcome().await.unwrap();
            session.apply(outcome);
        }
    })
    .await
    .expect("sync calls did not finish");
}

/// Remembers everything the dispatcher asked for.
#[derive(Default)]
pub struct RecordingSurface {
    pub toasts: Vec<String>,
    pub cues: usize,
    pub focus_requests: usize,
}

impl AlertSurface for RecordingSurface {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn show_toast(&mut self, task: &Task) -> Result<(), AlertError> {
        self.toasts.push(task.description.clone());
        Ok(())
    }

    fn play_cue(&mut self) -> Result<(), AlertError> {
        self.cues += 1;
        Ok(())
    }

    fn focus_window(&mut self) -> Result<(), AlertError> {
        self.focus_requests += 1;
        Ok(())
    }
}
