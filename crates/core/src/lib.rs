//! `accessgate-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error taxonomy shared by every layer, and the aggregate
//! contract used by stateful records.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use clock::{Clock, SystemClock};
pub use error::{DomainError, DomainResult, FieldViolation};
pub use id::{RequestId, SoftwareId, UserId};
