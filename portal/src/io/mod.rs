//! I/O for portal commands: backend transport and config files.

pub mod api;
pub mod config;
