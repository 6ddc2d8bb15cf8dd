//! hdr-bracket library crate.
//!
//! Computes HDR exposure brackets from a camera's discrete compensation
//! choices and drives gphoto2 to capture them.

pub mod bracket;
pub mod choices;
pub mod cli;
pub mod config;
pub mod error;
pub mod gphoto;
pub mod logging;
pub mod session;

pub use bracket::{plan, BracketPlan, BracketRequest, PartialPlanWarning, RequestError};
pub use choices::{ChoiceSet, ChoiceSetError, Millistops};
pub use error::{Error, Result};
