//! Deterministic, pure logic for the portal front-end.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! state and return the effects to perform (fetches, mutations, notices) as
//! plain values, so every transition is testable without a backend.

pub mod controller;
pub mod display;
pub mod editor;
pub mod filter;
pub mod pagination;
pub mod types;
pub mod validation;
