//! Live adapters for real external interactions.

pub mod change_request;
pub mod filesystem;
pub mod git;
pub mod shell;
