//! Lexical analysis module.
//!
//! The parser only depends on the [`tokens::TokenSource`] trait; this module
//! provides the reference implementation of it:
//!
//! - Tokenization of source text using anchored regex patterns
//! - Case-insensitive keywords, type and object identifiers, literals
//! - Nested `(* *)` block comments and `--` line comments
//! - Line and column tracking for diagnostics

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
