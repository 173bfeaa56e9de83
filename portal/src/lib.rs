//! Command-line front-end for an HR employee and contract portal.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure state machines for filters, pagination, the employee
//!   list, and create/edit/delete flows. No I/O, fully testable in isolation.
//! - **[`io`]**: The REST client behind the [`io::api::PortalApi`] seam, and
//!   TOML configuration.
//!
//! [`commands`] and [`browse`] drive core state against a backend to
//! implement the CLI.

pub mod browse;
pub mod commands;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
