//! # sas-ftp
//!
//! File-transfer half of the server facade: a small plain-TCP FTP client
//! and the [`TransferSession`] built on it.

pub mod ftp;

pub use ftp::*;
