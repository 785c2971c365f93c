//! AWS account exposure enumeration
//!
//! For one credential profile this crate reports the caller identity, mirrors
//! an S3 bucket to local disk and dumps every Secrets Manager secret the
//! profile can read. The binary wires these together; the modules are public
//! so the phases can be driven against mocked services in tests.

pub mod aws;
pub mod cli;
pub mod console;
pub mod error;
pub mod phases;
pub mod runner;

pub use error::{EnumError, Result};
pub use runner::{run, RunConfig, RunSummary, Services};
