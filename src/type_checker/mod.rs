//! Static typing of method bodies and attribute initializers.
//!
//! Each class is checked on its own against the shared class table. Scopes
//! are persistent [`environment::Environment`] chains, and every expression
//! node comes out with its inferred type set. Ill-typed nodes get
//! [`crate::ast::types::Type::Error`], which conforms both ways so checking
//! can carry on past the first mistake.

pub mod environment;
pub mod type_checker;
pub mod typed_ast;
