use std::time::Duration;

use crate::SpinnerError;

/// How a spinner run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

/// Everything the caller and the animation loop both touch.
///
/// Lives behind a single mutex; the glyph sequence and the index into it are
/// only ever read together, so a concurrent swap can never leave the index
/// pointing past the end.
#[derive(Debug)]
pub(crate) struct SpinnerState {
    pub message: String,
    glyphs: Vec<String>,
    index: usize,
    interval: Duration,
    interval_changed: bool,
    pub success_symbol: String,
    pub error_symbol: String,
    pub abort_message: String,
    pub running: bool,
}

/// One animation step read out of the state.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub text: String,
    /// Set when the tick interval changed since the previous frame.
    pub new_interval: Option<Duration>,
}

impl SpinnerState {
    pub fn new(
        message: String,
        glyphs: Vec<String>,
        interval: Duration,
        success_symbol: String,
        error_symbol: String,
        abort_message: String,
    ) -> Self {
        debug_assert!(!glyphs.is_empty());
        Self {
            message,
            glyphs,
            index: 0,
            interval: clamp_interval(interval),
            interval_changed: false,
            success_symbol,
            error_symbol,
            abort_message,
            running: false,
        }
    }

    pub fn set_glyphs(&mut self, glyphs: Vec<String>) -> Result<(), SpinnerError> {
        if glyphs.is_empty() {
            return Err(SpinnerError::EmptyGlyphs);
        }
        self.glyphs = glyphs;
        Ok(())
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = clamp_interval(interval);
        self.interval_changed = true;
    }

    #[cfg(test)]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Render the glyph at the current index and advance it.
    pub fn next_frame(&mut self) -> Frame {
        let index = self.index % self.glyphs.len();
        let text = format!("{} {}", self.glyphs[index], self.message);
        self.index = (index + 1) % self.glyphs.len();
        let new_interval = std::mem::take(&mut self.interval_changed).then_some(self.interval);
        Frame { text, new_interval }
    }

    pub fn symbol(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Success => &self.success_symbol,
            Outcome::Error => &self.error_symbol,
        }
    }
}

/// Intervals below one millisecond are raised to one.
fn clamp_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(1))
}
