//! Background Jobs Module
//!
//! Jobs registered with the job scheduler service. Each job takes a
//! `JobContext`, does one pass of work and reports a `JobResult`.
//!
//! # Available Jobs
//!
//! - `session_check_job` - Signs the user out once the held token has expired

pub mod session_check_job;
