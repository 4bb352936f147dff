//! Access request lifecycle.
//!
//! An access request is submitted `Pending` and decided exactly once. The
//! aggregate here is pure; persistence and authorization live in `accessgate-infra`.

pub mod request;

pub use request::{
    AccessRequest, Decision, DecideRequest, MIN_REASON_LEN, RequestCommand, RequestDecided,
    RequestEvent, RequestStatus, RequestSubmitted, SubmitRequest, validate_reason,
};
