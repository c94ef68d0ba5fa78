//! # Remindust
//!
//! A terminal task list that reminds you at a clock time.
//!
//! The list lives on a small REST backend. The client keeps a local copy,
//! sends each change back as a single call and rings once when an open
//! task's reminder time is reached.
//!
//! *   [`store`]: the in-memory list, replaced snapshot by snapshot.
//! *   [`sync`]: fire-and-forget calls that keep the backend in step.
//! *   [`scheduler`]: the once-a-second check deciding which tasks just became due.
//! *   [`notify`]: toast, bell and focus request for a due task.
//! *   [`session`]: ties the four together for a front end to drive.
//! *   [`backend`]: a reference backend serving the list from a JSON file.

pub mod backend;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod sync;
pub mod tui;
pub mod watch;
