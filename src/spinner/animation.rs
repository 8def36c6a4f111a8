//! The background loop that draws frames.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::runtime;
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{Shared, report};

/// A live animation loop running on its own thread.
pub(crate) struct Animation {
    cancel: CancellationToken,
    thread: JoinHandle<()>,
}

impl Animation {
    pub fn spawn(shared: Arc<Shared>) -> io::Result<Self> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let thread = thread::Builder::new()
            .name("busyline-animation".into())
            .spawn(move || runtime.block_on(animate(shared, token)))?;
        Ok(Self { cancel, thread })
    }

    /// Signal the loop to exit without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Signal the loop and wait until it has exited.
    pub fn stop(self) {
        self.cancel.cancel();
        if self.thread.join().is_err() {
            warn!("animation thread panicked");
        }
    }
}

fn arm(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Draw a frame every tick until `cancel` fires.
///
/// Never renders after cancellation has been observed; the final line is left
/// to whoever cancelled.
pub(crate) async fn animate(shared: Arc<Shared>, cancel: CancellationToken) {
    let period = shared.state().interval();
    debug!(?period, "animation started");
    let mut ticker = arm(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let frame = shared.state().next_frame();
                {
                    let mut renderer = shared.renderer();
                    if cancel.is_cancelled() {
                        break;
                    }
                    // No full clear here; it flickers.
                    report(renderer.write_line(&frame.text), "draw frame");
                }
                if let Some(period) = frame.new_interval {
                    debug!(?period, "tick interval changed");
                    ticker = arm(period);
                }
            }
        }
    }

    debug!("animation stopped");
}
