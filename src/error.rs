//! Crate-level error type.

use crate::bracket::RequestError;
use crate::choices::ChoiceSetError;
use crate::config::ConfigError;
use crate::gphoto::DeviceError;

/// Everything that can end a bracketing session.
///
/// `InvalidChoiceSet` and `Device` are fatal for the session;
/// `InvalidStepRequest` carries the valid steps so the caller can re-prompt.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid camera compensation range: {0}")]
    InvalidChoiceSet(#[from] ChoiceSetError),

    #[error("{0}")]
    InvalidStepRequest(#[from] RequestError),

    #[error("camera error: {0}")]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
