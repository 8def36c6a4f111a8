mod animation;
pub(crate) mod state;

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::SpinnerError;
use crate::interrupt;
use crate::platform::{self, Platform};
use crate::render::{LineRenderer, TerminalRenderer};
use animation::Animation;
pub use state::Outcome;
use state::SpinnerState;

const START_RETRIES: usize = 10;
const START_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Appended to the final line when a spinner is stopped without running.
pub const NOT_RUNNING_NOTE: &str = " (spinner was not running)";

/// State and output shared between the caller and the animation thread.
pub(crate) struct Shared {
    state: Mutex<SpinnerState>,
    renderer: Mutex<Box<dyn LineRenderer>>,
}

impl Shared {
    pub fn new(state: SpinnerState, renderer: Box<dyn LineRenderer>) -> Self {
        Self {
            state: Mutex::new(state),
            renderer: Mutex::new(renderer),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, SpinnerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn renderer(&self) -> MutexGuard<'_, Box<dyn LineRenderer>> {
        self.renderer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Terminal trouble never interrupts the caller; note it and move on.
pub(crate) fn report(result: io::Result<()>, action: &str) {
    if let Err(err) = result {
        debug!(%err, action, "render failed");
    }
}

pub(crate) struct Inner {
    shared: Arc<Shared>,
    animation: Mutex<Option<Animation>>,
    handle_interrupts: bool,
}

impl Inner {
    fn animation(&self) -> MutexGuard<'_, Option<Animation>> {
        self.animation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel the loop, write the abort line and hand over to `exit` while
    /// the renderer is still locked, so nothing can be drawn after it.
    pub(crate) fn abort_with<R>(&self, exit: impl FnOnce() -> R) -> R {
        if let Some(animation) = self.animation().take() {
            animation.cancel();
        }
        let mut renderer = self.shared.renderer();
        let line = {
            let mut state = self.shared.state();
            state.running = false;
            format!("{} {}", state.error_symbol, state.abort_message)
        };
        report(renderer.line_break(), "break line");
        report(renderer.finish_line(Outcome::Error, &line), "write abort line");
        report(renderer.show_cursor(), "show cursor");
        exit()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let animation = self
            .animation
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(animation) = animation {
            debug!("spinner dropped while running");
            animation.stop();
            report(self.shared.renderer().show_cursor(), "show cursor");
            self.shared.state().running = false;
        }
    }
}

/// Construction settings for a [`Spinner`].
#[derive(Debug, Clone)]
pub struct SpinnerOptions {
    pub message: String,
    pub glyphs: Vec<String>,
    pub interval: Duration,
    pub success_symbol: String,
    pub error_symbol: String,
    pub abort_message: String,
    /// Arm the process-wide Ctrl-C watcher on first start.
    pub handle_interrupts: bool,
    pub is_terminal: bool,
}

impl Default for SpinnerOptions {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

impl SpinnerOptions {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            message: String::new(),
            glyphs: platform::default_glyphs(platform),
            interval: platform::DEFAULT_INTERVAL,
            success_symbol: platform::default_success_symbol(platform).to_string(),
            error_symbol: platform::default_error_symbol(platform).to_string(),
            abort_message: platform::DEFAULT_ABORT_MESSAGE.to_string(),
            handle_interrupts: true,
            is_terminal: platform::is_terminal_output(),
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn glyphs<I, S>(mut self, glyphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glyphs = glyphs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn success_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.success_symbol = symbol.into();
        self
    }

    #[must_use]
    pub fn error_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.error_symbol = symbol.into();
        self
    }

    #[must_use]
    pub fn abort_message(mut self, message: impl Into<String>) -> Self {
        self.abort_message = message.into();
        self
    }

    #[must_use]
    pub const fn handle_interrupts(mut self, enabled: bool) -> Self {
        self.handle_interrupts = enabled;
        self
    }

    #[must_use]
    pub const fn terminal(mut self, is_terminal: bool) -> Self {
        self.is_terminal = is_terminal;
        self
    }

    /// Build a spinner drawing to stdout.
    pub fn build(self) -> Result<Spinner, SpinnerError> {
        let renderer = TerminalRenderer::stdout(self.is_terminal);
        self.build_with(renderer)
    }

    /// Build a spinner drawing through `renderer`.
    pub fn build_with(
        self,
        renderer: impl LineRenderer + 'static,
    ) -> Result<Spinner, SpinnerError> {
        if self.glyphs.is_empty() {
            return Err(SpinnerError::EmptyGlyphs);
        }
        Ok(self.assemble(Box::new(renderer)))
    }

    fn assemble(self, renderer: Box<dyn LineRenderer>) -> Spinner {
        let state = SpinnerState::new(
            self.message,
            self.glyphs,
            self.interval,
            self.success_symbol,
            self.error_symbol,
            self.abort_message,
        );
        let inner = Inner {
            shared: Arc::new(Shared::new(state, renderer)),
            animation: Mutex::new(None),
            handle_interrupts: self.handle_interrupts,
        };
        Spinner {
            inner: Arc::new(inner),
        }
    }
}

/// An animated busy indicator on a single terminal line.
///
/// Cloning yields another handle to the same spinner. At most one animation
/// loop runs per spinner; dropping the last handle stops it.
///
/// ```no_run
/// let spinner = busyline::Spinner::new("Building");
/// spinner.start().ok();
/// // ... work ...
/// spinner.success_with("Built");
/// ```
#[derive(Clone)]
pub struct Spinner {
    inner: Arc<Inner>,
}

impl Spinner {
    /// A spinner with this platform's defaults, drawing to stdout.
    pub fn new(message: impl Into<String>) -> Self {
        let options = SpinnerOptions::default().message(message);
        let renderer = TerminalRenderer::stdout(options.is_terminal);
        options.assemble(Box::new(renderer))
    }

    pub fn options() -> SpinnerOptions {
        SpinnerOptions::default()
    }

    #[cfg(test)]
    pub(crate) const fn inner(&self) -> &Arc<Inner> {
        &self.inner
    }

    fn shared(&self) -> &Shared {
        &self.inner.shared
    }

    pub fn is_running(&self) -> bool {
        self.shared().state().running
    }

    pub fn message(&self) -> String {
        self.shared().state().message.clone()
    }

    /// Start animating with the current message.
    ///
    /// If the spinner is already running this waits briefly for a stop in
    /// progress elsewhere to finish. When it never does, the running spinner
    /// is stopped with an error line and [`SpinnerError::AlreadyRunning`] is
    /// returned.
    pub fn start(&self) -> Result<(), SpinnerError> {
        self.launch(None)
    }

    /// Start animating with `message`.
    pub fn start_with(&self, message: impl Into<String>) -> Result<(), SpinnerError> {
        self.launch(Some(message.into()))
    }

    fn launch(&self, mut message: Option<String>) -> Result<(), SpinnerError> {
        for attempt in 0..=START_RETRIES {
            if attempt > 0 {
                thread::sleep(START_RETRY_DELAY);
            }

            let mut animation = self.inner.animation();
            {
                let mut state = self.shared().state();
                if state.running {
                    continue;
                }
                state.running = true;
                if let Some(message) = message.take() {
                    state.message = message;
                }
            }

            report(self.shared().renderer().hide_cursor(), "hide cursor");
            match Animation::spawn(Arc::clone(&self.inner.shared)) {
                Ok(spawned) => *animation = Some(spawned),
                Err(err) => {
                    drop(animation);
                    warn!(%err, "could not launch animation");
                    self.finish(
                        Outcome::Error,
                        Some(format!("Could not start spinner: {err}")),
                        false,
                    );
                    return Err(SpinnerError::Spawn(err));
                }
            }
            drop(animation);

            debug!(attempt, "spinner started");
            if self.inner.handle_interrupts {
                interrupt::watch(&self.inner);
            }
            return Ok(());
        }

        let message = self.message();
        warn!(%message, "start timed out waiting for a running spinner");
        self.error_with(format!(
            "Tried to start a running spinner with message: {message}"
        ));
        Err(SpinnerError::AlreadyRunning { message })
    }

    /// Stop the loop if there is one, then write the final line.
    fn stop(&self, outcome: Outcome, message: Option<String>) {
        let animation = self.inner.animation().take();
        let was_running = animation.is_some();
        if let Some(animation) = animation {
            animation.stop();
            debug!(?outcome, "spinner stopped");
        } else {
            warn!(?outcome, "stopping a spinner that is not running");
        }
        self.finish(outcome, message, !was_running);
    }

    fn finish(&self, outcome: Outcome, message: Option<String>, not_running: bool) {
        let shared = self.shared();
        let mut renderer = shared.renderer();
        let line = {
            let state = shared.state();
            let mut text = message.unwrap_or_else(|| state.message.clone());
            if not_running {
                text.push_str(NOT_RUNNING_NOTE);
            }
            format!("{} {}", state.symbol(outcome), text)
        };
        report(renderer.blank_line(), "blank line");
        report(renderer.finish_line(outcome, &line), "write final line");
        report(renderer.show_cursor(), "show cursor");
        shared.state().running = false;
    }

    /// Stop and print the current message with the success symbol.
    pub fn success(&self) {
        self.stop(Outcome::Success, None);
    }

    pub fn success_with(&self, message: impl Into<String>) {
        self.stop(Outcome::Success, Some(message.into()));
    }

    /// `spinner.successf(format_args!("{count} files"))`
    pub fn successf(&self, args: fmt::Arguments<'_>) {
        self.stop(Outcome::Success, Some(args.to_string()));
    }

    /// Stop and print the current message with the error symbol.
    pub fn error(&self) {
        self.stop(Outcome::Error, None);
    }

    pub fn error_with(&self, message: impl Into<String>) {
        self.stop(Outcome::Error, Some(message.into()));
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.stop(Outcome::Error, Some(args.to_string()));
    }

    /// Close the current step as a success, if one is running, and start
    /// the next one with `message` on the following line.
    pub fn restart(&self, message: impl Into<String>) -> Result<(), SpinnerError> {
        let animation = self.inner.animation().take();
        if let Some(animation) = animation {
            animation.stop();
            debug!("spinner restarting");
            self.finish(Outcome::Success, None, false);
        }
        self.start_with(message)
    }

    /// Replace the message shown next to the glyph.
    ///
    /// Appending to the current message redraws in place. Anything else
    /// blanks the line first so a longer old message leaves nothing behind.
    pub fn update_message(&self, message: impl Into<String>) {
        let message = message.into();
        let shared = self.shared();
        let mut renderer = shared.renderer();
        let mut state = shared.state();
        if !message.starts_with(state.message.as_str()) {
            report(renderer.blank_line(), "blank line");
        }
        state.message = message;
    }

    /// Use `glyphs` from the next frame on. An empty sequence is rejected and
    /// the current one kept.
    pub fn set_glyphs<I, S>(&self, glyphs: I) -> Result<(), SpinnerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let glyphs = glyphs.into_iter().map(Into::into).collect();
        self.shared().state().set_glyphs(glyphs).inspect_err(|err| {
            warn!(%err, "glyph sequence not changed");
        })
    }

    /// Change the delay between frames; clamped to at least one millisecond.
    pub fn set_interval(&self, interval: Duration) {
        self.shared().state().set_interval(interval);
    }

    pub fn set_interval_ms(&self, ms: u64) {
        self.set_interval(Duration::from_millis(ms));
    }

    pub fn set_success_symbol(&self, symbol: impl Into<String>) {
        self.shared().state().success_symbol = symbol.into();
    }

    pub fn set_error_symbol(&self, symbol: impl Into<String>) {
        self.shared().state().error_symbol = symbol.into();
    }

    /// Set the line printed when Ctrl-C aborts the process.
    pub fn set_abort_message(&self, message: impl Into<String>) {
        self.shared().state().abort_message = message.into();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::render::recording::{Call, Recorder};

    const GLYPHS: [&str; 4] = ["0", "1", "2", "3"];

    fn spinner(message: &str, recorder: &Recorder) -> Spinner {
        SpinnerOptions::for_platform(Platform::Unix)
            .message(message)
            .glyphs(GLYPHS)
            .interval(Duration::from_millis(10))
            .success_symbol("+")
            .error_symbol("x")
            .handle_interrupts(false)
            .build_with(recorder.clone())
            .unwrap()
    }

    fn wait_for_frames(recorder: &Recorder, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while recorder.frames().len() < count {
            assert!(Instant::now() < deadline, "timed out waiting for frames");
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Frames from a single loop step through the glyphs in order.
    fn assert_single_loop(frames: &[String]) {
        let first: usize = frames[0][..1].parse().unwrap();
        for (i, frame) in frames.iter().enumerate() {
            let glyph: usize = frame[..1].parse().unwrap();
            assert_eq!(glyph, (first + i) % GLYPHS.len(), "frames: {frames:?}");
        }
    }

    #[test]
    fn success_after_ticks_writes_final_line() {
        let recorder = Recorder::default();
        let spinner = spinner("Building", &recorder);

        spinner.start().unwrap();
        assert!(spinner.is_running());
        wait_for_frames(&recorder, 2);
        spinner.success_with("Done");

        assert!(!spinner.is_running());
        assert_eq!(recorder.calls()[0], Call::Hide);
        assert_eq!(recorder.frames()[..2], ["0 Building", "1 Building"]);
        insta::assert_snapshot!(recorder.tail(), @r#"
        Blank
        Finish(Success, "+ Done")
        Show
        "#);
    }

    #[test]
    fn error_without_start_returns_immediately() {
        let recorder = Recorder::default();
        let spinner = spinner("Test Error()", &recorder);

        let began = Instant::now();
        spinner.error();

        assert!(began.elapsed() < Duration::from_millis(500));
        assert!(!spinner.is_running());
        insta::assert_snapshot!(recorder.tail(), @r#"
        Blank
        Finish(Error, "x Test Error() (spinner was not running)")
        Show
        "#);
    }

    #[test]
    fn success_without_start_keeps_success_symbol() {
        let recorder = Recorder::default();
        let spinner = spinner("Idle", &recorder);

        spinner.successf(format_args!("{} is {}!", "Spinner", "Awesome"));

        assert_eq!(
            recorder.calls()[1],
            Call::Finish(
                Outcome::Success,
                format!("+ Spinner is Awesome!{NOT_RUNNING_NOTE}")
            )
        );
    }

    #[test]
    fn errorf_formats_final_message() {
        let recorder = Recorder::default();
        let spinner = spinner("Waiting", &recorder);

        spinner.start().unwrap();
        wait_for_frames(&recorder, 1);
        let secs = 2;
        spinner.errorf(format_args!("I waited {secs} seconds to error!"));

        assert!(recorder.calls().contains(&Call::Finish(
            Outcome::Error,
            "x I waited 2 seconds to error!".to_string()
        )));
    }

    #[test]
    fn second_start_never_spawns_second_loop() {
        let recorder = Recorder::default();
        let spinner = spinner("Busy", &recorder);

        spinner.start().unwrap();
        let err = spinner.start().unwrap_err();

        assert!(matches!(err, SpinnerError::AlreadyRunning { ref message } if message == "Busy"));
        assert!(!spinner.is_running());
        assert_single_loop(&recorder.frames());
        insta::assert_snapshot!(recorder.tail(), @r#"
        Blank
        Finish(Error, "x Tried to start a running spinner with message: Busy")
        Show
        "#);
    }

    #[test]
    fn start_waits_for_stop_in_progress() {
        let recorder = Recorder::default();
        let spinner = spinner("First", &recorder);
        spinner.start().unwrap();

        let other = spinner.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(120));
            other.success();
        });

        spinner.start_with("Second").unwrap();
        stopper.join().unwrap();
        wait_for_frames(&recorder, recorder.frames().len() + 2);
        spinner.success();

        let calls = recorder.calls();
        let first_finish = calls
            .iter()
            .position(|c| matches!(c, Call::Finish(..)))
            .unwrap();
        assert_eq!(calls[first_finish], Call::Finish(Outcome::Success, "+ First".into()));
        assert!(
            calls[first_finish..]
                .iter()
                .any(|c| matches!(c, Call::Write(text) if text.ends_with("Second")))
        );
        assert_eq!(calls.last(), Some(&Call::Show));
    }

    #[test]
    fn spinner_can_be_reused() {
        let recorder = Recorder::default();
        let spinner = spinner("One", &recorder);

        spinner.start().unwrap();
        wait_for_frames(&recorder, 1);
        spinner.error();

        spinner.start_with("Spinner reuse FTW!").unwrap();
        wait_for_frames(&recorder, recorder.frames().len() + 1);
        spinner.success();

        let finishes: Vec<Call> = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Finish(..)))
            .collect();
        assert_eq!(
            finishes,
            [
                Call::Finish(Outcome::Error, "x One".into()),
                Call::Finish(Outcome::Success, "+ Spinner reuse FTW!".into()),
            ]
        );
    }

    #[test]
    fn restart_closes_previous_step_first() {
        let recorder = Recorder::default();
        let spinner = spinner("Step 1", &recorder);

        spinner.start().unwrap();
        wait_for_frames(&recorder, 1);
        spinner.restart("Step 2").unwrap();
        assert!(spinner.is_running());
        wait_for_frames(&recorder, recorder.frames().len() + 1);
        spinner.success();

        let finishes: Vec<Call> = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Finish(..)))
            .collect();
        assert_eq!(
            finishes,
            [
                Call::Finish(Outcome::Success, "+ Step 1".into()),
                Call::Finish(Outcome::Success, "+ Step 2".into()),
            ]
        );
        assert!(recorder.frames().last().unwrap().ends_with("Step 2"));
    }

    #[test]
    fn restart_on_idle_spinner_just_starts() {
        let recorder = Recorder::default();
        let spinner = spinner("Idle", &recorder);

        spinner.restart("Now busy").unwrap();
        assert!(spinner.is_running());
        assert_eq!(spinner.message(), "Now busy");
        spinner.success();
    }

    #[test]
    fn appending_message_does_not_blank() {
        let recorder = Recorder::default();
        let spinner = spinner("A", &recorder);

        spinner.update_message("AB");
        assert!(recorder.calls().is_empty());

        spinner.update_message("X");
        assert_eq!(recorder.calls(), [Call::Blank]);
        assert_eq!(spinner.message(), "X");
    }

    #[test]
    fn empty_glyphs_leave_animation_running() {
        let recorder = Recorder::default();
        let spinner = spinner("Glyphs", &recorder);

        spinner.start().unwrap();
        assert!(spinner.set_glyphs(Vec::<String>::new()).is_err());
        spinner.set_glyphs(["+", "x"]).unwrap();
        let seen = recorder.frames().len();
        wait_for_frames(&recorder, seen + 3);
        spinner.success();

        let frames = recorder.frames();
        assert!(frames[seen + 1..].iter().all(|f| f.starts_with('+') || f.starts_with('x')));
    }

    #[test]
    fn symbols_apply_to_next_final_line() {
        let recorder = Recorder::default();
        let spinner = spinner("Custom", &recorder);

        spinner.set_success_symbol("👍");
        spinner.start().unwrap();
        spinner.success();

        assert!(
            recorder
                .calls()
                .contains(&Call::Finish(Outcome::Success, "👍 Custom".into()))
        );
    }

    #[test]
    fn abort_writes_abort_line_last() {
        let recorder = Recorder::default();
        let spinner = spinner("Tick...tick...tick...", &recorder);
        spinner.set_abort_message("Defused!");

        spinner.start().unwrap();
        wait_for_frames(&recorder, 2);
        spinner.inner.abort_with(|| ());
        let calls = recorder.calls().len();
        thread::sleep(Duration::from_millis(50));

        assert_eq!(recorder.calls().len(), calls);
        assert!(!spinner.is_running());
        insta::assert_snapshot!(recorder.tail(), @r#"
        Break
        Finish(Error, "x Defused!")
        Show
        "#);
    }

    #[test]
    fn dropping_running_spinner_stops_loop() {
        let recorder = Recorder::default();
        let spinner = spinner("Dropped", &recorder);

        spinner.start().unwrap();
        wait_for_frames(&recorder, 1);
        drop(spinner);
        let frames = recorder.frames().len();
        thread::sleep(Duration::from_millis(50));

        assert_eq!(recorder.frames().len(), frames);
        assert_eq!(recorder.calls().last(), Some(&Call::Show));
    }

    #[test]
    fn options_reject_empty_glyphs() {
        let result = SpinnerOptions::for_platform(Platform::Unix)
            .glyphs(Vec::<String>::new())
            .build_with(Recorder::default());
        assert!(matches!(result, Err(SpinnerError::EmptyGlyphs)));
    }
}
