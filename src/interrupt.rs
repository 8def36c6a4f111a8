//! Process-wide Ctrl-C handling.
//!
//! One watcher per process, armed by the first spinner start that asks for
//! it. On interrupt the most recently started spinner writes its abort line
//! and the process exits.

use std::io;
use std::process;
use std::sync::{Arc, Mutex, Once, PoisonError, Weak};
use std::thread;

use tokio::runtime;
use tracing::{info, warn};

use crate::spinner::Inner;

pub const ABORT_EXIT_CODE: i32 = 1;

static ARMED: Once = Once::new();
static TARGET: Mutex<Option<Weak<Inner>>> = Mutex::new(None);

/// Make `inner` the abort target, arming the watcher if it is not yet.
pub(crate) fn watch(inner: &Arc<Inner>) {
    *TARGET.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::downgrade(inner));
    ARMED.call_once(|| {
        if let Err(err) = spawn_watcher() {
            warn!(%err, "interrupt watcher unavailable");
        }
    });
}

fn spawn_watcher() -> io::Result<()> {
    let runtime = runtime::Builder::new_current_thread().enable_all().build()?;
    thread::Builder::new()
        .name("busyline-interrupt".into())
        .spawn(move || match runtime.block_on(tokio::signal::ctrl_c()) {
            Ok(()) => on_interrupt(),
            Err(err) => warn!(%err, "failed to listen for Ctrl-C"),
        })?;
    Ok(())
}

/// Claim the current abort target, if it is still alive.
fn take_target() -> Option<Arc<Inner>> {
    TARGET
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .and_then(|weak| weak.upgrade())
}

fn on_interrupt() {
    match take_target() {
        Some(inner) => {
            info!("interrupted, aborting spinner");
            inner.abort_with(|| process::exit(ABORT_EXIT_CODE));
        }
        None => {
            info!("interrupted with no live spinner");
            process::exit(ABORT_EXIT_CODE);
        }
    }
}
