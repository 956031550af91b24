use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rusqlite::Connection;

use crate::state::AppState;
use crate::store::{self, StoreError};

/// Quiet period that must elapse after the last state change before
/// the aggregate is written out. A change inside the window replaces
/// the pending snapshot and restarts the clock (trailing debounce).
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

enum Command {
    Save(Box<AppState>),
    Flush(Sender<Result<(), StoreError>>),
    Shutdown,
}

/// Background persister owning the storage connection. At most one
/// snapshot is pending at a time; dropping the handle cancels it.
pub struct StateWriter {
    tx: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl StateWriter {
    pub fn spawn(conn: Connection) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || run_loop(&conn, &rx));
        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Queue a snapshot for the debounced write. Fire-and-forget: a
    /// stopped writer thread is reported on stderr, never to callers.
    pub fn schedule(&self, state: &AppState) {
        if self.tx.send(Command::Save(Box::new(state.clone()))).is_err() {
            eprintln!("warning: persistence worker is not running; state change not scheduled");
        }
    }

    /// Write any pending snapshot now and report the outcome. Used on
    /// process exit, where silent loss is not acceptable.
    pub fn flush(&self) -> Result<(), StoreError> {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return Err(worker_gone());
        }
        ack_rx.recv().unwrap_or_else(|_| Err(worker_gone()))
    }
}

impl Drop for StateWriter {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_gone() -> StoreError {
    StoreError::Io(std::io::Error::other("persistence worker stopped"))
}

fn run_loop(conn: &Connection, rx: &Receiver<Command>) {
    let mut pending: Option<Box<AppState>> = None;
    loop {
        let command = if pending.is_some() {
            match rx.recv_timeout(DEBOUNCE_WINDOW) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        match command {
            None => {
                if let Some(state) = pending.take() {
                    if let Err(err) = store::save_state(conn, &state) {
                        eprintln!("warning: state write failed: {}", err);
                    }
                }
            }
            Some(Command::Save(state)) => pending = Some(state),
            Some(Command::Flush(ack)) => {
                let result = match pending.take() {
                    Some(state) => store::save_state(conn, &state),
                    None => Ok(()),
                };
                let _ = ack.send(result);
            }
            Some(Command::Shutdown) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::thread;
    use std::time::Duration;

    use uuid::Uuid;

    use super::StateWriter;
    use crate::seed;
    use crate::state::AppState;
    use crate::store::{load_raw, open_connection};

    fn unique_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("projecthub-writer-test-{}.sqlite", Uuid::new_v4()))
    }

    fn titled(title: &str) -> AppState {
        let mut state = seed::demo_state();
        state.projects[0].title = title.to_string();
        state
    }

    #[test]
    fn rapid_changes_coalesce_into_one_trailing_write() {
        let path = unique_db_path();
        let db = path.to_str().expect("utf8 path");
        let writer = StateWriter::spawn(open_connection(db).expect("db should open"));

        writer.schedule(&titled("one"));
        thread::sleep(Duration::from_millis(60));
        writer.schedule(&titled("two"));
        thread::sleep(Duration::from_millis(60));
        writer.schedule(&titled("three"));

        // Still inside the debounce window: nothing persisted yet.
        thread::sleep(Duration::from_millis(60));
        let probe = open_connection(db).expect("db should open");
        assert!(load_raw(&probe).is_none());

        thread::sleep(Duration::from_millis(400));
        let raw = load_raw(&probe).expect("trailing write should have landed");
        assert_eq!(raw["projects"][0]["title"], "three");
        drop(writer);
        drop(probe);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn flush_writes_the_pending_snapshot_immediately() {
        let path = unique_db_path();
        let db = path.to_str().expect("utf8 path");
        let writer = StateWriter::spawn(open_connection(db).expect("db should open"));

        writer.schedule(&titled("flushed"));
        writer.flush().expect("flush should succeed");

        let probe = open_connection(db).expect("db should open");
        let raw = load_raw(&probe).expect("flushed state should be stored");
        assert_eq!(raw["projects"][0]["title"], "flushed");
        drop(writer);
        drop(probe);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn flush_without_pending_changes_is_a_no_op() {
        let path = unique_db_path();
        let db = path.to_str().expect("utf8 path");
        let writer = StateWriter::spawn(open_connection(db).expect("db should open"));
        writer.flush().expect("flush should succeed");

        let probe = open_connection(db).expect("db should open");
        assert!(load_raw(&probe).is_none());
        drop(writer);
        drop(probe);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn dropping_the_writer_cancels_the_pending_write() {
        let path = unique_db_path();
        let db = path.to_str().expect("utf8 path");
        let writer = StateWriter::spawn(open_connection(db).expect("db should open"));

        writer.schedule(&titled("never written"));
        drop(writer);

        thread::sleep(Duration::from_millis(350));
        let probe = open_connection(db).expect("db should open");
        assert!(load_raw(&probe).is_none());
        drop(probe);
        let _ = std::fs::remove_file(path);
    }
}
