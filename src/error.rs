use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpinnerError {
    #[error("tried to start a running spinner with message: {message}")]
    AlreadyRunning { message: String },

    #[error("glyph sequence must not be empty")]
    EmptyGlyphs,

    #[error("failed to launch animation: {0}")]
    Spawn(#[source] io::Error),
}
