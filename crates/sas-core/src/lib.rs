//! # sas-core
//!
//! Types shared by every failure domain of the server facade:
//!
//! - [`Response`] - the single "last result" slot every operation writes
//! - [`Outcome`] - tagged per-call result that knows how to record itself
//! - [`Failure`] / [`FailureDomain`] - normalised driver/transport errors
//! - [`PingReply`] / [`Reachability`] - output of the availability probe

pub mod outcome;
pub mod probe;

pub use outcome::{Failure, FailureDomain, Outcome, Response};
pub use probe::{PingReply, Reachability};
