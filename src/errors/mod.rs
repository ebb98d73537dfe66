//! Error types and error handling for the front end.
//!
//! This module defines the error types used throughout the pipeline:
//!
//! - [`errors::Error`]: a recoverable error with its source position
//! - [`errors::ErrorImpl`]: the specific condition, one variant per rule
//! - [`errors::Diagnostic`]: the structured record handed to callers
//! - [`errors::StructuralError`]: fatal misuse of a phase's input
//!
//! Recoverable errors are accumulated and returned alongside each phase's
//! best-effort result; only structural errors abort.

pub mod errors;

#[cfg(test)]
mod tests;
