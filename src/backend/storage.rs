use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::models::Task;

/// Returns the path to the backend's database file (`todos.json`).
///
/// The path is determined in the following order:
/// 1. `REMINDUST_DB` environment variable.
/// 2. `~/.local/share/remindust/todos.json` (on Linux).
/// 3. `./todos.json` (fallback).
pub fn db_path() -> PathBuf {
    std::env::var("REMINDUST_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("remindust");
        p.push("todos.json");
        p
    })
}

/// Loads all tasks from `path`.
///
/// Returns an empty vector if the file does not exist or cannot be read.
pub fn load_tasks(path: &Path) -> Vec<Task> {
    if !path.exists() {
        return Vec::new();
    }
    let mut f = match OpenOptions::new().read(true).open(path) {
        Ok(f) => f,
        Err(_) => return Vec::new(),
    };
    let mut s = String::new();
    if f.read_to_string(&mut s).is_err() {
        return Vec::new();
    }
    serde_json::from_str(&s).unwrap_or_else(|_| Vec::new())
}

/// Saves the given list of tasks to `path`.
///
/// Overwrites the existing file, creating its directory if needed.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let s = serde_json::to_string_pretty(tasks).map_err(io::Error::other)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
