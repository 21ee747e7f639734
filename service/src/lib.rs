//! Infrastructure-level services shared by every other crate: runtime
//! configuration parsed from the environment/CLI and global logging setup.

pub mod config;
pub mod logging;
