//! CLI command implementations
//!
//! Every command returns the process exit code: 0 success, 1 completed with
//! degraded data, 2 configuration error, 5 fatal error.

pub mod diff;
pub mod harvest;
pub mod init;
pub mod merge;
pub mod probe;
pub mod validate;
