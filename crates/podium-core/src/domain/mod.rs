//! Domain models for Podium.
//!
//! Canonical definitions for the core entities:
//! - `Apparatus`: one gymnastics event
//! - `Athlete`: identity plus per-apparatus predicted scores
//! - `AthleteRecord`: roster-file input shape

pub mod apparatus;
pub mod athlete;
pub mod error;

pub use apparatus::Apparatus;
pub use athlete::{Athlete, AthleteId, AthleteRecord};
pub use error::{PodiumError, Result, ValidationError};
