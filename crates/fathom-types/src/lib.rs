//! Foundation types for FATHOM_OS.
//!
//! This crate contains the platform-agnostic types shared by all FATHOM_OS
//! crates: input events, configuration, and error types.

pub mod config;
pub mod error;
pub mod input;
