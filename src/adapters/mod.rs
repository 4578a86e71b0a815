//! Adapter implementations of the port traits.
//!
//! - `live`: real filesystem, git, subprocess and GitHub access.
//! - `recording`: wrap another adapter and write every call to a cassette.
//! - `replaying`: answer calls from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
