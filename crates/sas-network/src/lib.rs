//! # sas-network
//!
//! Host reachability for the server facade. One echo request per call,
//! no retries, failures reported as data in a [`PingReply`].

pub mod ping;

pub use ping::{AvailabilityProbe, Pinger, SystemPinger, DEFAULT_PING_TIMEOUT_SECS};
pub use sas_core::PingReply;
