//! Software catalog domain module.
//!
//! Business rules for registered software entries, implemented as pure domain
//! logic (no IO, no HTTP, no storage).

pub mod access_level;
pub mod software;

pub use access_level::{AccessLevel, AccessLevels};
pub use software::{NewSoftware, SoftwareEntry};
